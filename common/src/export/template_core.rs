//! 일괄 등록 템플릿 생성
//!
//! `졸업생등록` 시트에 헤더 행을 쓰고, 숨김 `목록` 시트의 허용값을
//! 드롭다운(데이터 유효성 검사)으로 연결한다.

use crate::schema::{template_headers, Field};
use crate::types::{Attendance, Department, DesiredField, Gender, Status};
use rust_xlsxwriter::*;

/// 템플릿 시트명
pub const TEMPLATE_SHEET: &str = "졸업생등록";
/// 허용값 목록 시트명
pub const LISTS_SHEET: &str = "목록";
/// 드롭다운을 적용할 마지막 행 (1부터)
const MAX_ROW: u32 = 1000;

/// 목록 시트의 한 열
struct ListColumn {
    title: &'static str,
    values: Vec<String>,
    /// 드롭다운을 적용할 템플릿 열
    target: Field,
}

fn list_columns(current_year: i32) -> Vec<ListColumn> {
    let labels = |v: Vec<&'static str>| v.into_iter().map(String::from).collect::<Vec<_>>();
    vec![
        ListColumn { title: "졸업학과", values: labels(Department::labels()), target: Field::Department },
        ListColumn { title: "성별", values: labels(Gender::labels()), target: Field::Gender },
        ListColumn { title: "근태", values: labels(Attendance::labels()), target: Field::Attendance },
        ListColumn { title: "희망분야", values: labels(DesiredField::labels()), target: Field::DesiredField },
        ListColumn { title: "현재상태", values: labels(Status::labels()), target: Field::CurrentStatus },
        ListColumn {
            title: "졸업연도",
            values: ((current_year - 10)..=(current_year + 1)).map(|y| y.to_string()).collect(),
            target: Field::GraduationYear,
        },
    ]
}

/// 템플릿 xlsx를 버퍼로 생성
///
/// # Arguments
/// * `current_year` - 졸업연도 목록의 기준 연도 (기준 -10년 ~ +1년)
pub fn generate_template_buffer(current_year: i32) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let headers = template_headers();
    let lists = list_columns(current_year);

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(TEMPLATE_SHEET)
        .map_err(|e| format!("시트 이름 설정 오류: {}", e))?;

    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(|e| format!("헤더 쓰기 오류: {}", e))?;
        let width = (header.chars().count() + 4).max(14) as f64;
        sheet
            .set_column_width(col, width)
            .map_err(|e| format!("열 너비 설정 오류: {}", e))?;
    }

    for (i, list) in lists.iter().enumerate() {
        let letter = crate::schema::column_letter(i);
        let formula = format!("={}!${}$2:${}${}", LISTS_SHEET, letter, letter, list.values.len() + 1);
        let validation = DataValidation::new()
            .allow_list_formula(Formula::new(formula))
            .ignore_blank(true);
        let col = list.target.index() as u16;
        sheet
            .add_data_validation(1, col, MAX_ROW - 1, col, &validation)
            .map_err(|e| format!("드롭다운 설정 오류: {}", e))?;
    }

    let list_sheet = workbook.add_worksheet();
    list_sheet
        .set_name(LISTS_SHEET)
        .map_err(|e| format!("시트 이름 설정 오류: {}", e))?;
    list_sheet.set_hidden(true);

    for (col, list) in lists.iter().enumerate() {
        let col = col as u16;
        list_sheet
            .write_string(0, col, list.title)
            .map_err(|e| format!("목록 쓰기 오류: {}", e))?;
        for (row, value) in list.values.iter().enumerate() {
            list_sheet
                .write_string(row as u32 + 1, col, value)
                .map_err(|e| format!("목록 쓰기 오류: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("엑셀 저장 오류: {}", e))
}
