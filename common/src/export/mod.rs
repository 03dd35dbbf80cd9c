//! 엑셀 버퍼 생성 (파일 저장은 호출 측 담당)

#[cfg(feature = "excel")]
pub mod template_core;

#[cfg(feature = "excel")]
pub mod roster_core;
