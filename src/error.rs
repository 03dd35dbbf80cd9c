use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("폴더를 찾을 수 없습니다: {0}")]
    FolderNotFound(String),

    #[error("지원하지 않는 파일 형식: {0} (csv, xlsx, xls, ods만 가능)")]
    UnsupportedFormat(String),

    #[error("엑셀 읽기 오류: {0}")]
    SheetRead(String),

    #[error("템플릿 형식이 올바르지 않습니다. 템플릿을 다시 다운로드 해주세요. (첫 열: {found:?})")]
    HeaderMismatch { found: String },

    #[error("저장소 오류: {0}")]
    Store(#[from] StoreError),

    #[error("사진 처리 오류: {0}")]
    Photo(String),

    #[error("엑셀 생성 오류: {0}")]
    ExcelGeneration(String),

    #[error("JSON 해석 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] grad_tracker_common::Error),
}

/// 저장소(데이터베이스) 오류
#[derive(Error, Debug)]
pub enum StoreError {
    /// 유일성 제약 위반. 어느 필드인지 알 수 있으면 `field`에 담는다.
    #[error("{}", conflict_message(.field.as_deref()))]
    Conflict { field: Option<String> },

    #[error("리소스 없음: {0}")]
    NotFound(String),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("저장 데이터 해석 오류: {0}")]
    Decode(String),
}

fn conflict_message(field: Option<&str>) -> String {
    match field {
        Some("email") => "이미 등록된 이메일입니다".to_string(),
        Some(f) => format!("중복 데이터 ({})", f),
        None => "중복 데이터".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
