//! 저장소 계층
//!
//! - `RecordStore`: 졸업생 레코드 조회/생성/수정/삭제
//! - `ActivitySink`: 활동 로그 기록
//! - `BlobStore`: 사진 파일 저장
//!
//! 가져오기와 사진 매칭은 이 트레이트들만 사용한다.

mod photos;
mod sqlite;

pub use photos::PhotoDir;
pub use sqlite::Database;

use crate::error::{Result, StoreResult};
use crate::matcher::MatchKey;
use grad_tracker_common::{Attendance, Department, DesiredField, Gender, Graduate, GraduateInput, GraduatePatch, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait RecordStore {
    /// 매칭 키에 해당하는 레코드를 최대 `limit`건 반환
    fn find_candidates(&self, key: &MatchKey, limit: usize) -> StoreResult<Vec<Graduate>>;

    /// 없으면 `StoreError::NotFound`
    fn find_by_id(&self, id: &str) -> StoreResult<Graduate>;

    /// 유일성 위반은 `StoreError::Conflict`
    fn create(&self, input: GraduateInput) -> StoreResult<Graduate>;

    /// 패치에 있는 필드만 덮어쓴다
    fn update(&self, id: &str, patch: GraduatePatch) -> StoreResult<Graduate>;

    fn set_photo_url(&self, id: &str, url: Option<&str>) -> StoreResult<Graduate>;

    fn delete(&self, id: &str) -> StoreResult<()>;
}

pub trait ActivitySink {
    fn append(&self, entry: &NewActivity) -> StoreResult<()>;
}

pub trait BlobStore {
    /// 저장 가능한 파일인지 확인 (확장자, 크기, 내용)
    fn accepts(&self, bytes: &[u8], suggested_name: &str) -> Result<()>;

    /// 저장 후 공개 URL 반환
    fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<String>;

    /// 없는 파일이면 아무것도 하지 않는다
    fn delete(&self, url: &str) -> Result<()>;
}

/// 활동 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Register,
    Update,
    /// 이 도구는 기록하지 않지만 기존 로그를 읽기 위해 둔다
    Employment,
    /// `Employment`와 같음
    Education,
    Import,
    Delete,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Register => "register",
            ActivityType::Update => "update",
            ActivityType::Employment => "employment",
            ActivityType::Education => "education",
            ActivityType::Import => "import",
            ActivityType::Delete => "delete",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "register" => Ok(ActivityType::Register),
            "update" => Ok(ActivityType::Update),
            "employment" => Ok(ActivityType::Employment),
            "education" => Ok(ActivityType::Education),
            "import" => Ok(ActivityType::Import),
            "delete" => Ok(ActivityType::Delete),
            _ => Err(format!("Unknown activity type: {}", s)),
        }
    }
}

/// 기록할 활동
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityType,
    pub actor_id: Option<String>,
    pub graduate_id: Option<String>,
    pub message: String,
}

/// 저장된 활동 로그
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub actor_user_id: Option<String>,
    /// 졸업생 삭제 후에는 None
    pub graduate_id: Option<String>,
    pub message: String,
    pub at: String,
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub kind: Option<ActivityType>,
    pub graduate_id: Option<String>,
    pub actor_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LogFilter {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 200;

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }
}

/// 목록 조회 (이름/연락처/이메일 부분 일치)
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListQuery {
    pub const DEFAULT_PAGE_SIZE: usize = 20;
    pub const MAX_PAGE_SIZE: usize = 100;

    pub fn effective_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE).clamp(1, Self::MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// 상세 검색 조건. 지정된 조건을 모두 만족해야 한다.
#[derive(Debug, Clone, Default)]
pub struct GraduateFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub graduation_year: Option<i32>,
    pub gender: Option<Gender>,
    pub department: Option<Department>,
    pub attendance: Option<Attendance>,
    pub desired_field: Option<DesiredField>,
    pub status: Option<Status>,
    pub min_grade: Option<f64>,
    pub birth_date: Option<String>,
    pub certificate: Option<String>,
    pub company: Option<String>,
    pub school: Option<String>,
}

/// 대시보드 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub employed: usize,
    pub employed_rate: u32,
    pub further_study: usize,
    pub further_study_rate: u32,
    pub job_seeking: usize,
}

impl Stats {
    pub fn from_counts(total: usize, employed: usize, further_study: usize, job_seeking: usize) -> Self {
        Self {
            total,
            employed,
            employed_rate: percent(employed, total),
            further_study,
            further_study_rate: percent(further_study, total),
            job_seeking,
        }
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 * 100.0 / total as f64).round() as u32
}
