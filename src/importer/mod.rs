//! 엑셀 일괄 등록 (insert / upsert)
//!
//! 헤더 불일치만 전체 실패로 처리하고, 나머지 오류는 모두 해당 행의 결과로 기록한다.
//! 결과는 입력 행 순서를 유지하며 빈 행을 제외한 행마다 정확히 하나씩 생긴다.

use crate::error::{Result, TrackerError};
use crate::matcher::{find_match, key_from_input, MatchKeyKind};
use crate::service::GraduateService;
use crate::sheet::{self, is_blank_row, SheetRows};
use crate::store::ActivityType;
use grad_tracker_common::{validate_row, FieldDefect, Graduate, GraduateInput, GraduatePatch};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 가져오기 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// 모든 행을 신규 등록
    #[default]
    InsertOnly,
    /// 매칭되는 레코드가 있으면 수정, 없으면 등록
    Upsert,
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insert" | "insert-only" => Ok(ImportMode::InsertOnly),
            "upsert" => Ok(ImportMode::Upsert),
            _ => Err(format!("Unknown import mode: {}. Use insert or upsert", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Created,
    Updated,
}

/// 한 행의 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    /// 엑셀 화면의 행 번호 (헤더가 1행)
    pub row: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RowAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defects: Vec<FieldDefect>,
}

impl RowOutcome {
    fn success(row: usize, graduate: &Graduate, action: RowAction) -> Self {
        Self {
            row,
            ok: true,
            id: Some(graduate.id.clone()),
            action: Some(action),
            reason: None,
            defects: Vec::new(),
        }
    }

    fn failure(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            ok: false,
            id: None,
            action: None,
            reason: Some(reason.into()),
            defects: Vec::new(),
        }
    }

    fn invalid(row: usize, defects: Vec<FieldDefect>) -> Self {
        let reason = defects
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            defects,
            ..Self::failure(row, reason)
        }
    }
}

/// 가져오기 설정
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub match_key: MatchKeyKind,
    pub actor: Option<String>,
}

/// 일괄 등록 결과 집계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub created: usize,
    pub updated: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    fn push(&mut self, outcome: RowOutcome) {
        self.total += 1;
        if outcome.ok {
            self.succeeded += 1;
            match outcome.action {
                Some(RowAction::Created) => self.created += 1,
                Some(RowAction::Updated) => self.updated += 1,
                None => {}
            }
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

/// 파일을 읽어 일괄 등록한다. 헤더가 맞지 않으면 한 행도 처리하지 않고 오류를 돌려준다.
pub fn import_file<F>(
    service: &GraduateService<'_>,
    path: &Path,
    options: &ImportOptions,
    on_row: F,
) -> Result<ImportReport>
where
    F: FnMut(&RowOutcome),
{
    let sheet = sheet::read_file(path)?;
    Ok(import_batch(service, &sheet, options, on_row))
}

/// 헤더 확인을 마친 행들을 순서대로 처리한다
pub fn import_batch<F>(
    service: &GraduateService<'_>,
    sheet: &SheetRows,
    options: &ImportOptions,
    mut on_row: F,
) -> ImportReport
where
    F: FnMut(&RowOutcome),
{
    tracing::info!(
        rows = sheet.rows.len(),
        mode = ?options.mode,
        match_key = %options.match_key,
        "일괄 등록 시작"
    );

    let mut report = ImportReport::default();
    for (row_number, row) in sheet.numbered() {
        if is_blank_row(row) {
            continue;
        }

        let outcome = match validate_row(row, &sheet.header) {
            Err(defects) => RowOutcome::invalid(row_number, defects),
            Ok(input) => process_row(service, row_number, input, options),
        };
        tracing::debug!(row = outcome.row, ok = outcome.ok, reason = ?outcome.reason, "행 처리");

        on_row(&outcome);
        report.push(outcome);
    }

    if report.total > 0 {
        service.log(
            ActivityType::Import,
            options.actor.as_deref(),
            None,
            format!(
                "엑셀 일괄 등록: 총 {}건 중 {}건 성공, {}건 실패",
                report.total, report.succeeded, report.failed
            ),
        );
    }
    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "일괄 등록 완료"
    );
    report
}

fn process_row(
    service: &GraduateService<'_>,
    row: usize,
    input: GraduateInput,
    options: &ImportOptions,
) -> RowOutcome {
    let actor = options.actor.as_deref();

    let existing = match options.mode {
        ImportMode::InsertOnly => None,
        ImportMode::Upsert => match key_from_input(options.match_key, &input) {
            None => None,
            Some(key) => match find_match(service.records(), &key) {
                Ok(found) => found,
                Err(e) => return RowOutcome::failure(row, e.to_string()),
            },
        },
    };

    let result = match existing {
        Some(current) => service
            .update(&current.id, GraduatePatch::from(input), actor)
            .map(|g| (g, RowAction::Updated)),
        None => service.create(input, actor).map(|g| (g, RowAction::Created)),
    };

    match result {
        Ok((graduate, action)) => RowOutcome::success(row, &graduate, action),
        Err(e) => RowOutcome::failure(row, row_reason(&e)),
    }
}

/// 행 결과에 남길 사유. 저장소 오류는 접두어 없이 그대로.
fn row_reason(err: &TrackerError) -> String {
    match err {
        TrackerError::Store(e) => e.to_string(),
        other => other.to_string(),
    }
}
