//! grad-tracker: 졸업생 이력 관리・엑셀 일괄 등록
//!
//! 엑셀 행 → 검증 → 기존 레코드 매칭 → 등록/수정 의 흐름과
//! 사진 파일명 기반 일괄 매칭을 제공한다.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod importer;
pub mod matcher;
pub mod photos;
pub mod scanner;
pub mod service;
pub mod sheet;
pub mod store;
