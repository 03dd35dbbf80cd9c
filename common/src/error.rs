//! 공통 에러 타입

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// JSON으로 들어온 입력/수정 내용을 해석하지 못함
    #[error("JSON 형식 오류: {0}")]
    Json(#[from] serde_json::Error),

    /// 검증 규칙 위반. 메시지는 `; `로 이어 붙인다.
    #[error("입력값 오류: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
