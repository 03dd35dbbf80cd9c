//! 검색 결과 명단 엑셀 생성

use crate::types::Graduate;
use rust_xlsxwriter::*;

pub const ROSTER_SHEET: &str = "검색결과";

/// (헤더, 최소 너비)
const ROSTER_COLUMNS: [(&str, usize); 15] = [
    ("이름", 12),
    ("졸업연도", 10),
    ("성별", 8),
    ("생년월일", 12),
    ("연락처", 16),
    ("이메일", 24),
    ("주소", 30),
    ("학과", 16),
    ("성적(%)", 10),
    ("근태", 8),
    ("자격증", 24),
    ("희망분야", 18),
    ("현재상태", 18),
    ("취업처/기간", 30),
    ("대학명/재학기간", 30),
];

/// 너비 자동 조정 상한
const MAX_AUTO_WIDTH: usize = 60;

fn join_labels<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn format_grade(grade: Option<f64>) -> String {
    match grade {
        Some(g) if g.fract() == 0.0 => format!("{}", g as i64),
        Some(g) => g.to_string(),
        None => String::new(),
    }
}

/// 졸업생 한 명을 명단 한 행으로 변환
pub fn roster_row(g: &Graduate) -> [String; 15] {
    let history = |entries: &[crate::types::HistoryEntry]| {
        entries.iter().map(|e| e.display_label()).collect::<Vec<_>>().join("; ")
    };
    [
        g.name.clone(),
        g.graduation_year.to_string(),
        g.gender.to_string(),
        g.birth_date.clone(),
        g.phone.clone(),
        g.email.clone().unwrap_or_default(),
        g.address.clone(),
        g.department.to_string(),
        format_grade(g.grade),
        g.attendance.map(|a| a.to_string()).unwrap_or_default(),
        g.certificates.join(", "),
        join_labels(&g.desired_field),
        join_labels(&g.current_status),
        history(&g.employment_history),
        history(&g.education_history),
    ]
}

/// 명단 xlsx를 버퍼로 생성
pub fn generate_roster_buffer(graduates: &[Graduate]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let rows: Vec<[String; 15]> = graduates.iter().map(roster_row).collect();

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(ROSTER_SHEET)
        .map_err(|e| format!("시트 이름 설정 오류: {}", e))?;

    for (col, (header, min_width)) in ROSTER_COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| format!("헤더 쓰기 오류: {}", e))?;

        let longest = rows
            .iter()
            .map(|r| r[col].chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0)
            .min(MAX_AUTO_WIDTH);
        sheet
            .set_column_width(col as u16, (longest + 1).max(*min_width) as f64)
            .map_err(|e| format!("열 너비 설정 오류: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string(i as u32 + 1, col as u16, value)
                .map_err(|e| format!("값 쓰기 오류: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("엑셀 저장 오류: {}", e))
}
