use serde::{Deserialize, Serialize};
use std::fmt;

/// 기존 레코드를 찾는 기준. 한 번의 가져오기/사진 일괄 처리 전체에 동일하게 적용된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKeyKind {
    /// 이메일 (대소문자 무시)
    #[default]
    Email,
    /// 전화번호 숫자만
    Phone,
    /// 이름 + 생년월일
    NameBirthDate,
}

impl std::str::FromStr for MatchKeyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(MatchKeyKind::Email),
            "phone" => Ok(MatchKeyKind::Phone),
            "name-birth" | "namebirthdate" | "name_birth" => Ok(MatchKeyKind::NameBirthDate),
            _ => Err(format!("Unknown match key: {}. Use email, phone, or name-birth", s)),
        }
    }
}

impl fmt::Display for MatchKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKeyKind::Email => write!(f, "email"),
            MatchKeyKind::Phone => write!(f, "phone"),
            MatchKeyKind::NameBirthDate => write!(f, "name-birth"),
        }
    }
}

/// 추출된 매칭 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKey {
    /// 소문자・공백 제거된 이메일
    Email(String),
    /// 숫자만 남긴 전화번호
    PhoneDigits(String),
    NameBirthDate { name: String, birth_date: String },
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::Email(e) => write!(f, "email={}", e),
            MatchKey::PhoneDigits(d) => write!(f, "phone={}", d),
            MatchKey::NameBirthDate { name, birth_date } => write!(f, "name={}, birth={}", name, birth_date),
        }
    }
}
