//! 업로드된 엑셀/CSV를 문자열 행으로 변환
//!
//! 첫 행은 헤더이며 첫 셀이 `졸업연도`가 아니면 데이터 행을 하나도 처리하지 않고 실패한다.

mod xlsx;

use crate::error::{Result, TrackerError};
use grad_tracker_common::EXPECTED_FIRST_HEADER;
use std::path::Path;

pub use xlsx::read_spreadsheet_rows;

/// 입력 파일 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// 쉼표 구분 텍스트
    Csv,
    /// xlsx / xls / ods
    Spreadsheet,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(SheetFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SheetFormat::Spreadsheet),
            _ => Err(TrackerError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// 헤더와 데이터 행
#[derive(Debug, Clone, Default)]
pub struct SheetRows {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetRows {
    /// 첫 행을 헤더로 분리하고 헤더 서명을 확인한다
    pub fn from_raw(mut raw: Vec<Vec<String>>) -> Result<Self> {
        if raw.is_empty() {
            return Err(TrackerError::HeaderMismatch { found: String::new() });
        }
        let header = raw.remove(0);
        let first = header.first().map(String::as_str).unwrap_or("");
        if first != EXPECTED_FIRST_HEADER {
            return Err(TrackerError::HeaderMismatch { found: first.to_string() });
        }
        Ok(Self { header, rows: raw })
    }

    /// 데이터 행과 화면 표시 행 번호 (헤더가 1행이므로 인덱스 + 2)
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows.iter().enumerate().map(|(i, r)| (i + 2, r.as_slice()))
    }
}

/// 파일 바이트를 읽어 헤더 확인까지 마친 행 목록을 만든다
pub fn parse_rows(bytes: &[u8], format: SheetFormat) -> Result<SheetRows> {
    let raw = match format {
        SheetFormat::Csv => read_csv_rows(bytes)?,
        SheetFormat::Spreadsheet => read_spreadsheet_rows(bytes)?,
    };
    SheetRows::from_raw(raw)
}

/// 파일 경로에서 형식을 판별해 읽는다
pub fn read_file(path: &Path) -> Result<SheetRows> {
    if !path.exists() {
        return Err(TrackerError::FileNotFound(path.display().to_string()));
    }
    let format = SheetFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    parse_rows(&bytes, format)
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    // 엑셀에서 저장한 CSV의 BOM 제거
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| TrackerError::SheetRead(format!("CSV 해석 오류: {}", e)))?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }
    Ok(rows)
}

/// 모든 셀이 비어 있는 행
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
