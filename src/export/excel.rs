//! Excel 파일 출력 (CLI)
//!
//! 버퍼 생성은 grad-tracker-common에서 하고, 여기서는 파일로 쓴다.

use crate::error::{Result, TrackerError};
use chrono::Datelike;
use grad_tracker_common::export::{roster_core, template_core};
use grad_tracker_common::Graduate;
use std::path::Path;

/// 일괄 등록 템플릿 저장 (졸업연도 목록은 올해 기준)
pub fn write_template(output_path: &Path) -> Result<()> {
    write_template_for_year(output_path, chrono::Local::now().year())
}

pub fn write_template_for_year(output_path: &Path, current_year: i32) -> Result<()> {
    let buffer = template_core::generate_template_buffer(current_year).map_err(TrackerError::ExcelGeneration)?;
    write_buffer(output_path, &buffer)
}

/// 검색 결과 명단 저장
pub fn write_roster(graduates: &[Graduate], output_path: &Path) -> Result<()> {
    let buffer = roster_core::generate_roster_buffer(graduates).map_err(TrackerError::ExcelGeneration)?;
    write_buffer(output_path, &buffer)
}

fn write_buffer(output_path: &Path, buffer: &[u8]) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    tracing::debug!(path = %output_path.display(), bytes = buffer.len(), "엑셀 저장");
    Ok(())
}
