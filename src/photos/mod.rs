//! 사진 일괄 매칭
//!
//! 파일명에서 매칭 키를 뽑아 졸업생을 찾고 사진을 연결한다.
//! 파일 하나의 실패는 다른 파일에 영향을 주지 않으며, 결과는 입력 순서대로 파일마다 하나씩 생긴다.

use crate::error::{Result, TrackerError};
use crate::matcher::{find_match, key_from_filename, MatchError, MatchKeyKind};
use crate::service::GraduateService;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Content {
    Bytes(Vec<u8>),
    /// 처리 직전에 읽는다
    Path(PathBuf),
}

/// 일괄 처리 대상 파일
#[derive(Debug, Clone)]
pub struct PhotoFile {
    filename: String,
    content: Content,
}

impl PhotoFile {
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content: Content::Bytes(bytes),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            filename,
            content: Content::Path(path.to_path_buf()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match &self.content {
            Content::Bytes(b) => Ok(Cow::Borrowed(b)),
            Content::Path(p) => Ok(Cow::Owned(std::fs::read(p)?)),
        }
    }
}

/// 파일별 실패 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoFailure {
    NotFound,
    ExistingPhoto,
    BadFilename,
    Ambiguous,
    Rejected(String),
    Error(String),
}

impl fmt::Display for PhotoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoFailure::NotFound => write!(f, "대상을 찾을 수 없음"),
            PhotoFailure::ExistingPhoto => write!(f, "기존 사진 존재"),
            PhotoFailure::BadFilename => write!(f, "이름+생년월일 형식이 아닙니다"),
            PhotoFailure::Ambiguous => write!(f, "여러 건이 일치함"),
            PhotoFailure::Rejected(m) | PhotoFailure::Error(m) => f.write_str(m),
        }
    }
}

/// 파일 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoBulkOutcome {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PhotoBulkOutcome {
    fn success(filename: &str, id: &str) -> Self {
        Self {
            filename: filename.to_string(),
            matched_id: Some(id.to_string()),
            ok: true,
            reason: None,
        }
    }

    fn failure(filename: &str, matched_id: Option<&str>, failure: PhotoFailure) -> Self {
        Self {
            filename: filename.to_string(),
            matched_id: matched_id.map(str::to_string),
            ok: false,
            reason: Some(failure.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoBatchOptions {
    pub match_key: MatchKeyKind,
    /// false면 이미 사진이 있는 졸업생은 건너뛴다
    pub overwrite: bool,
    pub actor: Option<String>,
}

impl Default for PhotoBatchOptions {
    fn default() -> Self {
        Self {
            match_key: MatchKeyKind::Phone,
            overwrite: true,
            actor: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoBatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<PhotoBulkOutcome>,
}

impl PhotoBatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &PhotoBulkOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

pub fn bulk_match_photos<F>(
    service: &GraduateService<'_>,
    files: &[PhotoFile],
    options: &PhotoBatchOptions,
    mut on_file: F,
) -> PhotoBatchReport
where
    F: FnMut(&PhotoBulkOutcome),
{
    tracing::info!(
        files = files.len(),
        match_key = %options.match_key,
        overwrite = options.overwrite,
        "사진 일괄 매칭 시작"
    );

    let mut report = PhotoBatchReport::default();
    for file in files {
        let outcome = process_file(service, file, options);
        tracing::debug!(file = %outcome.filename, ok = outcome.ok, reason = ?outcome.reason, "사진 처리");

        on_file(&outcome);
        report.total += 1;
        if outcome.ok {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
        report.outcomes.push(outcome);
    }

    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "사진 일괄 매칭 완료"
    );
    report
}

fn process_file(service: &GraduateService<'_>, file: &PhotoFile, options: &PhotoBatchOptions) -> PhotoBulkOutcome {
    let name = file.filename();

    let key = match key_from_filename(options.match_key, name) {
        Ok(Some(key)) => key,
        Ok(None) => return PhotoBulkOutcome::failure(name, None, PhotoFailure::NotFound),
        Err(_) => return PhotoBulkOutcome::failure(name, None, PhotoFailure::BadFilename),
    };

    let graduate = match find_match(service.records(), &key) {
        Ok(Some(g)) => g,
        Ok(None) => return PhotoBulkOutcome::failure(name, None, PhotoFailure::NotFound),
        Err(MatchError::Ambiguous(_)) => return PhotoBulkOutcome::failure(name, None, PhotoFailure::Ambiguous),
        Err(e) => return PhotoBulkOutcome::failure(name, None, PhotoFailure::Error(e.to_string())),
    };

    if !options.overwrite && graduate.photo_url.is_some() {
        return PhotoBulkOutcome::failure(name, Some(&graduate.id), PhotoFailure::ExistingPhoto);
    }

    let bytes = match file.bytes() {
        Ok(b) => b,
        Err(e) => return PhotoBulkOutcome::failure(name, Some(&graduate.id), PhotoFailure::Error(e.to_string())),
    };

    match service.replace_photo(&graduate, &bytes, name, options.actor.as_deref()) {
        Ok(saved) => PhotoBulkOutcome::success(name, &saved.id),
        Err(TrackerError::Photo(m)) => PhotoBulkOutcome::failure(name, Some(&graduate.id), PhotoFailure::Rejected(m)),
        Err(e) => PhotoBulkOutcome::failure(name, Some(&graduate.id), PhotoFailure::Error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_labels() {
        assert_eq!(PhotoFailure::NotFound.to_string(), "대상을 찾을 수 없음");
        assert_eq!(PhotoFailure::ExistingPhoto.to_string(), "기존 사진 존재");
        assert_eq!(PhotoFailure::BadFilename.to_string(), "이름+생년월일 형식이 아닙니다");
    }

    #[test]
    fn test_photo_file_from_path() {
        let file = PhotoFile::from_path(Path::new("/tmp/photos/홍길동-20040305.jpg"));
        assert_eq!(file.filename(), "홍길동-20040305.jpg");
    }

    #[test]
    fn test_missing_file_read_error() {
        let file = PhotoFile::from_path(Path::new("/nonexistent/a.jpg"));
        assert!(file.bytes().is_err());
    }
}
