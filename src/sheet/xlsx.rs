use crate::error::{Result, TrackerError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// 첫 번째 시트의 모든 행을 문자열로 읽는다
pub fn read_spreadsheet_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| TrackerError::SheetRead(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TrackerError::SheetRead("시트가 없습니다".into()))?
        .map_err(|e| TrackerError::SheetRead(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// 셀 값을 텍스트로. 날짜 셀은 ISO 날짜로 바로 쓴다.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        // 일련번호 텍스트 규칙을 거치지 않는다
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format_number(dt.as_f64().floor())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(e) => format!("{:?}", e),
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
