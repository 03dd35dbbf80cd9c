//! Graduate Tracker Common Library
//!
//! CLI와 다른 화면이 공유하는 타입・검증 규칙・엑셀 레이아웃

pub mod types;
pub mod schema;
pub mod dates;
pub mod validator;
pub mod error;
pub mod export;

pub use types::{
    digits_only, Attendance, Department, DesiredField, Gender, Graduate, GraduateInput, GraduatePatch,
    HistoryEntry, Status,
};
pub use schema::{column_letter, column_ref, ColumnSpec, Field, COLUMNS, COLUMN_COUNT, EXPECTED_FIRST_HEADER};
pub use dates::{is_valid_period, normalize_date};
pub use validator::{validate_input, validate_patch, validate_row, FieldDefect};
pub use error::{Error, Result};
