//! 기존 졸업생 레코드 매칭
//!
//! 가져오기 행 또는 사진 파일명에서 매칭 키를 추출하고, 저장소에서 단 하나의 레코드를 찾는다.
//! 두 건 이상이 일치하면 임의로 고르지 않고 `MatchError::Ambiguous`를 돌려준다.

mod types;

pub use types::{MatchKey, MatchKeyKind};

use crate::error::StoreError;
use crate::store::RecordStore;
use grad_tracker_common::{digits_only, Graduate, GraduateInput};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref NAME_BIRTH_DASHED: Regex = Regex::new(r"^(.*?)[-_](\d{4}-\d{2}-\d{2})$").unwrap();
    static ref NAME_BIRTH_COMPACT: Regex = Regex::new(r"^(.*?)[-_](\d{4})(\d{2})(\d{2})$").unwrap();
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("여러 건이 일치함 ({0})")]
    Ambiguous(MatchKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 파일명에서 키를 만들 수 없는 경우
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("이름+생년월일 형식이 아닙니다")]
pub struct FilenameFormatError;

/// 키에 해당하는 레코드를 최대 한 건 찾는다 (읽기 전용)
pub fn find_match<S>(store: &S, key: &MatchKey) -> Result<Option<Graduate>, MatchError>
where
    S: RecordStore + ?Sized,
{
    let mut candidates = store.find_candidates(key, 2)?;
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => Err(MatchError::Ambiguous(key.clone())),
    }
}

/// 검증된 행에서 매칭 키 추출. 해당 값이 비어 있으면 None (신규 등록 대상).
pub fn key_from_input(kind: MatchKeyKind, input: &GraduateInput) -> Option<MatchKey> {
    match kind {
        MatchKeyKind::Email => input
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .map(MatchKey::Email),
        MatchKeyKind::Phone => {
            let digits = digits_only(&input.phone);
            (!digits.is_empty()).then_some(MatchKey::PhoneDigits(digits))
        }
        MatchKeyKind::NameBirthDate => {
            let name = input.name.trim();
            let birth = input.birth_date.trim();
            (!name.is_empty() && !birth.is_empty()).then(|| MatchKey::NameBirthDate {
                name: name.to_string(),
                birth_date: birth.to_string(),
            })
        }
    }
}

/// 확장자를 뗀 파일명
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// 사진 파일명에서 매칭 키 추출
///
/// - email: 소문자・공백 제거
/// - phone: 숫자만
/// - name-birth: `이름-YYYY-MM-DD`, `이름_YYYY-MM-DD`, `이름-YYYYMMDD`, `이름_YYYYMMDD`
///
/// 이메일/전화번호가 비면 Ok(None)
pub fn key_from_filename(kind: MatchKeyKind, filename: &str) -> Result<Option<MatchKey>, FilenameFormatError> {
    let stem = file_stem(filename).trim();
    match kind {
        MatchKeyKind::Email => {
            let email = normalize_email(stem);
            Ok((!email.is_empty()).then_some(MatchKey::Email(email)))
        }
        MatchKeyKind::Phone => {
            let digits = digits_only(stem);
            Ok((!digits.is_empty()).then_some(MatchKey::PhoneDigits(digits)))
        }
        MatchKeyKind::NameBirthDate => parse_name_birth(stem).map(Some).ok_or(FilenameFormatError),
    }
}

fn parse_name_birth(stem: &str) -> Option<MatchKey> {
    let (name, birth_date) = if let Some(caps) = NAME_BIRTH_DASHED.captures(stem) {
        (caps[1].trim().to_string(), caps[2].to_string())
    } else if let Some(caps) = NAME_BIRTH_COMPACT.captures(stem) {
        (
            caps[1].trim().to_string(),
            format!("{}-{}-{}", &caps[2], &caps[3], &caps[4]),
        )
    } else {
        return None;
    };

    if name.is_empty() {
        return None;
    }
    Some(MatchKey::NameBirthDate { name, birth_date })
}

fn normalize_email(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use grad_tracker_common::{Department, Gender};

    fn input(name: &str, phone: &str, email: Option<&str>) -> GraduateInput {
        GraduateInput {
            graduation_year: 2023,
            name: name.into(),
            gender: Gender::Female,
            birth_date: "2004-03-05".into(),
            phone: phone.into(),
            address: String::new(),
            department: Department::HealthNursing,
            grade: None,
            attendance: None,
            certificates: vec![],
            email: email.map(String::from),
            employment_history: vec![],
            education_history: vec![],
            desired_field: vec![],
            current_status: vec![],
            memo: None,
        }
    }

    #[test]
    fn test_key_from_filename_name_birth() {
        let expected = Some(MatchKey::NameBirthDate {
            name: "홍길동".into(),
            birth_date: "2004-03-05".into(),
        });
        for name in ["홍길동-2004-03-05.jpg", "홍길동_2004-03-05.png", "홍길동-20040305.JPG", "홍길동_20040305.jpeg"] {
            assert_eq!(key_from_filename(MatchKeyKind::NameBirthDate, name), Ok(expected.clone()), "{}", name);
        }
        assert_eq!(
            key_from_filename(MatchKeyKind::NameBirthDate, "홍길동.jpg"),
            Err(FilenameFormatError)
        );
        assert_eq!(
            key_from_filename(MatchKeyKind::NameBirthDate, "-20040305.jpg"),
            Err(FilenameFormatError)
        );
    }

    #[test]
    fn test_key_from_filename_phone_and_email() {
        assert_eq!(
            key_from_filename(MatchKeyKind::Phone, "010-1234-5678.jpg"),
            Ok(Some(MatchKey::PhoneDigits("01012345678".into())))
        );
        assert_eq!(
            key_from_filename(MatchKeyKind::Email, " Hong@Example.com .png"),
            Ok(Some(MatchKey::Email("hong@example.com".into())))
        );
        assert_eq!(key_from_filename(MatchKeyKind::Phone, "사진.jpg"), Ok(None));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("a.b.jpg"), "a.b");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_key_from_input() {
        let row = input("홍길동", "010-1234-5678", Some(" HONG@example.com"));
        assert_eq!(
            key_from_input(MatchKeyKind::Email, &row),
            Some(MatchKey::Email("hong@example.com".into()))
        );
        assert_eq!(
            key_from_input(MatchKeyKind::Phone, &row),
            Some(MatchKey::PhoneDigits("01012345678".into()))
        );
        let no_email = input("홍길동", "010-1234-5678", None);
        assert_eq!(key_from_input(MatchKeyKind::Email, &no_email), None);
    }

    #[test]
    fn test_find_match_none_one_ambiguous() {
        let db = Database::open_in_memory().unwrap();
        let key = MatchKey::PhoneDigits("01012345678".into());
        assert!(find_match(&db, &key).unwrap().is_none());

        let first = db.create(input("홍길동", "010-1234-5678", None)).unwrap();
        let found = find_match(&db, &key).unwrap().unwrap();
        assert_eq!(found.id, first.id);

        db.create(input("홍길순", "010-1234-5678", None)).unwrap();
        let err = find_match(&db, &key).unwrap_err();
        assert!(matches!(err, MatchError::Ambiguous(_)));
        assert!(err.to_string().starts_with("여러 건이 일치함"));
    }

    #[test]
    fn test_match_key_kind_from_str() {
        assert_eq!("name-birth".parse::<MatchKeyKind>(), Ok(MatchKeyKind::NameBirthDate));
        assert_eq!("PHONE".parse::<MatchKeyKind>(), Ok(MatchKeyKind::Phone));
        assert!("id".parse::<MatchKeyKind>().is_err());
    }
}
