//! 행 검증 모듈
//!
//! 엑셀 한 행을 열 정의에 따라 검사한다.
//! 첫 오류에서 멈추지 않고 모든 열을 검사해 오류를 한 번에 보고한다.
//!
//! ## 처리 순서
//! 1. 필수 열 공란 검사
//! 2. 값이 있는 열의 형식 검사 (RULES 순서)
//! 3. 오류가 없으면 정규화된 GraduateInput 생성

use crate::dates::{is_valid_period, normalize_date};
use crate::error::Error;
use crate::schema::{column_ref, Field, COLUMNS};
use crate::types::{
    Attendance, Department, DesiredField, Gender, GraduateInput, GraduatePatch, HistoryEntry, Status,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static::lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[가-힣]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^010-[0-9]{4}-[0-9]{4}$").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
}

/// 열 하나에 대한 오류
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefect {
    /// 0부터 시작하는 열 번호
    pub column: usize,
    /// `열 B(이름)` 형태의 참조
    pub column_ref: String,
    pub message: String,
}

impl fmt::Display for FieldDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.column_ref, self.message)
    }
}

/// 형식 검사 함수. 문제가 있으면 오류 메시지를 돌려준다.
type Check = fn(&str) -> Option<String>;

/// 값이 있을 때 적용하는 형식 규칙 (평가 순서대로)
const RULES: &[(Field, Check)] = &[
    (Field::GraduationYear, check_graduation_year),
    (Field::Name, check_name),
    (Field::BirthDate, check_birth_date),
    (Field::Phone, check_phone),
    (Field::Grade, check_grade),
    (Field::Email, check_email),
    (Field::Gender, check_gender),
    (Field::Attendance, check_attendance),
    (Field::Department, check_department),
    (Field::DesiredField, check_desired_field),
    (Field::CurrentStatus, check_status),
    (Field::EmploymentHistory, check_employment),
    (Field::EducationHistory, check_education),
];

fn check_graduation_year(v: &str) -> Option<String> {
    let ok = YEAR_RE.is_match(v) && v.parse::<i32>().map(|y| (1900..=2100).contains(&y)).unwrap_or(false);
    (!ok).then(|| "졸업연도는 4자리 연도(YYYY)".to_string())
}

fn check_name(v: &str) -> Option<String> {
    (!NAME_RE.is_match(v)).then(|| "이름은 한글만 허용".to_string())
}

fn check_birth_date(v: &str) -> Option<String> {
    normalize_date(v).is_none().then(|| {
        "생년월일 형식 오류(YYYY-MM-DD, YYYY.M.D, YYYY.MM.DD, YYYYMMDD, 또는 엑셀 숫자 날짜)".to_string()
    })
}

fn check_phone(v: &str) -> Option<String> {
    (!is_valid_phone(v)).then(|| "연락처 형식 오류(010-1234-5678)".to_string())
}

fn check_grade(v: &str) -> Option<String> {
    parse_grade(v).is_none().then(|| "성적은 0~100 사이 숫자".to_string())
}

fn check_email(v: &str) -> Option<String> {
    (!is_valid_email(v)).then(|| "이메일 형식 오류".to_string())
}

fn check_gender(v: &str) -> Option<String> {
    Gender::from_str(v).err().map(|v| format!("성별 허용값 아님({})", v))
}

fn check_attendance(v: &str) -> Option<String> {
    Attendance::from_str(v).err().map(|v| format!("근태 허용값 아님({})", v))
}

fn check_department(v: &str) -> Option<String> {
    Department::from_str(v).err().map(|v| format!("졸업학과 목록에 없음({})", v))
}

fn invalid_tokens<T: FromStr>(v: &str) -> Vec<&str> {
    split_list(v).into_iter().filter(|s| s.parse::<T>().is_err()).collect()
}

fn check_desired_field(v: &str) -> Option<String> {
    let invalid = invalid_tokens::<DesiredField>(v);
    (!invalid.is_empty()).then(|| format!("희망분야 허용값 아님({})", invalid.join(", ")))
}

fn check_status(v: &str) -> Option<String> {
    let invalid = invalid_tokens::<Status>(v);
    (!invalid.is_empty()).then(|| format!("현재상태 허용값 아님({})", invalid.join(", ")))
}

fn check_employment(v: &str) -> Option<String> {
    parse_history(v).is_none().then(|| {
        "취업처/기간 형식 오류(회사 또는 회사:기간; 세미콜론 구분, 기간 예: 2025.01 - 2025.12 또는 2025.01.01 - )"
            .to_string()
    })
}

fn check_education(v: &str) -> Option<String> {
    parse_history(v).is_none().then(|| {
        "대학명/기간 형식 오류(대학 또는 대학:기간; 세미콜론 구분, 기간 예: 2025.03 - 또는 2025.03.01 - 2028.02.28)"
            .to_string()
    })
}

/// `010-1234-5678` 형식만 허용
pub fn is_valid_phone(v: &str) -> bool {
    PHONE_RE.is_match(v)
}

pub fn is_valid_email(v: &str) -> bool {
    EMAIL_RE.is_match(v.trim())
}

/// 0~100 범위의 숫자
pub fn parse_grade(v: &str) -> Option<f64> {
    let g: f64 = v.trim().parse().ok()?;
    (g.is_finite() && (0.0..=100.0).contains(&g)).then_some(g)
}

/// 쉼표 구분 목록 (공백 제거, 빈 항목 제외)
pub fn split_list(v: &str) -> Vec<&str> {
    v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// 세미콜론 구분 `이름[:기간]` 목록. 형식 오류가 하나라도 있으면 `None`
pub fn parse_history(v: &str) -> Option<Vec<HistoryEntry>> {
    let mut entries = Vec::new();
    for pair in v.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, period) = match pair.split_once(|c: char| c == ':' || c == '：') {
            Some((name, period)) => (name.trim(), period.trim()),
            None => (pair, ""),
        };
        if name.is_empty() {
            return None;
        }
        let period = if period.is_empty() {
            None
        } else if is_valid_period(period) {
            Some(period.to_string())
        } else {
            return None;
        };
        entries.push(HistoryEntry::new(name, period));
    }
    Some(entries)
}

/// 순서를 유지하며 중복 제거
fn dedup_keep_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn parse_list<T: FromStr + PartialEq>(v: &str) -> Vec<T> {
    dedup_keep_order(split_list(v).into_iter().filter_map(|s| s.parse().ok()).collect())
}

/// 한 행의 셀 (열이 모자라면 빈 문자열)
struct RowCells<'a> {
    cells: &'a [String],
}

impl<'a> RowCells<'a> {
    fn get(&self, field: Field) -> &'a str {
        self.cells.get(field.index()).map(|c| c.trim()).unwrap_or("")
    }

    fn optional(&self, field: Field) -> Option<String> {
        Some(self.get(field).to_string()).filter(|s| !s.is_empty())
    }
}

/// 한 행을 검증한다
///
/// # Arguments
/// * `row` - 데이터 행의 셀
/// * `header` - 업로드 파일의 헤더 행 (오류 메시지의 열 라벨용)
///
/// # Returns
/// * `Ok(GraduateInput)` - 모든 규칙 통과
/// * `Err(Vec<FieldDefect>)` - 열 순서가 아니라 검사 순서대로 정렬된 오류 목록 (비어 있지 않음)
pub fn validate_row(row: &[String], header: &[String]) -> Result<GraduateInput, Vec<FieldDefect>> {
    let cells = RowCells { cells: row };
    let mut defects = Vec::new();
    let defect = |field: Field, message: String| FieldDefect {
        column: field.index(),
        column_ref: column_ref(field.index(), header),
        message,
    };

    for (index, spec) in COLUMNS.iter().enumerate() {
        if spec.required && row.get(index).map(|c| c.trim().is_empty()).unwrap_or(true) {
            defects.push(FieldDefect {
                column: index,
                column_ref: column_ref(index, header),
                message: format!("{} 비어있음", spec.label),
            });
        }
    }

    for (field, check) in RULES {
        let value = cells.get(*field);
        if value.is_empty() {
            continue;
        }
        if let Some(message) = check(value) {
            defects.push(defect(*field, message));
        }
    }

    if !defects.is_empty() {
        return Err(defects);
    }

    build_input(&cells).map_err(|(field, message)| vec![defect(field, message)])
}

fn fail<E>(field: Field) -> impl Fn(E) -> (Field, String) {
    move |_| (field, format!("{} 값을 해석할 수 없음", field.spec().label))
}

/// 검사를 통과한 셀로 레코드를 만든다
fn build_input(cells: &RowCells<'_>) -> Result<GraduateInput, (Field, String)> {
    let graduation_year = cells.get(Field::GraduationYear).parse().map_err(fail(Field::GraduationYear))?;
    let gender = cells.get(Field::Gender).parse().map_err(fail(Field::Gender))?;
    let department = cells.get(Field::Department).parse().map_err(fail(Field::Department))?;
    let birth_date = normalize_date(cells.get(Field::BirthDate))
        .ok_or_else(|| (Field::BirthDate, "생년월일 값을 해석할 수 없음".to_string()))?;
    let attendance = match cells.optional(Field::Attendance) {
        Some(v) => Some(v.parse().map_err(fail(Field::Attendance))?),
        None => None,
    };
    let employment_history = parse_history(cells.get(Field::EmploymentHistory))
        .ok_or_else(|| (Field::EmploymentHistory, "취업처 값을 해석할 수 없음".to_string()))?;
    let education_history = parse_history(cells.get(Field::EducationHistory))
        .ok_or_else(|| (Field::EducationHistory, "대학 값을 해석할 수 없음".to_string()))?;

    Ok(GraduateInput {
        graduation_year,
        name: cells.get(Field::Name).to_string(),
        gender,
        birth_date,
        phone: cells.get(Field::Phone).to_string(),
        address: cells.get(Field::Address).to_string(),
        department,
        grade: cells.optional(Field::Grade).and_then(|g| parse_grade(&g)),
        attendance,
        certificates: dedup_keep_order(
            split_list(cells.get(Field::Certificates)).into_iter().map(String::from).collect(),
        ),
        email: cells.optional(Field::Email).map(|e| e.to_lowercase()),
        employment_history,
        education_history,
        desired_field: parse_list(cells.get(Field::DesiredField)),
        current_status: parse_list(cells.get(Field::CurrentStatus)),
        memo: cells.optional(Field::Memo),
    })
}

/// JSON 등 엑셀 이외의 경로로 들어온 입력을 같은 규칙으로 다시 검사한다
pub fn validate_input(input: &GraduateInput) -> crate::Result<()> {
    let history = input.employment_history.iter().chain(input.education_history.iter());
    finish(check_values(
        Some(input.graduation_year),
        Some(&input.name),
        Some(&input.birth_date),
        Some(&input.phone),
        input.grade,
        input.email.as_deref(),
        history,
    ))
}

/// 수정 내용 중 값이 있는 필드만 검사
pub fn validate_patch(patch: &GraduatePatch) -> crate::Result<()> {
    let history = patch
        .employment_history
        .iter()
        .flatten()
        .chain(patch.education_history.iter().flatten());
    finish(check_values(
        patch.graduation_year,
        patch.name.as_deref(),
        patch.birth_date.as_deref(),
        patch.phone.as_deref(),
        patch.grade,
        patch.email.as_deref(),
        history,
    ))
}

fn check_values<'a>(
    graduation_year: Option<i32>,
    name: Option<&str>,
    birth_date: Option<&str>,
    phone: Option<&str>,
    grade: Option<f64>,
    email: Option<&str>,
    history: impl Iterator<Item = &'a HistoryEntry>,
) -> Vec<String> {
    let mut messages = Vec::new();
    if let Some(m) = graduation_year.and_then(|y| check_graduation_year(&y.to_string())) {
        messages.push(m);
    }
    if let Some(m) = name.and_then(check_name) {
        messages.push(m);
    }
    if let Some(b) = birth_date {
        if normalize_date(b).as_deref() != Some(b) {
            messages.push("생년월일은 YYYY-MM-DD 형식".to_string());
        }
    }
    if let Some(m) = phone.and_then(check_phone) {
        messages.push(m);
    }
    if let Some(m) = grade.and_then(|g| check_grade(&g.to_string())) {
        messages.push(m);
    }
    if let Some(m) = email.and_then(check_email) {
        messages.push(m);
    }
    for entry in history {
        if entry.name.trim().is_empty() {
            messages.push("취업처/대학 이름 비어있음".to_string());
        }
        if let Some(p) = entry.period.as_deref().filter(|p| !is_valid_period(p)) {
            messages.push(format!("기간 형식 오류({})", p));
        }
    }
    messages
}

fn finish(messages: Vec<String>) -> crate::Result<()> {
    if messages.is_empty() {
        Ok(())
    } else {
        Err(Error::Invalid(messages.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::template_headers;

    fn header() -> Vec<String> {
        template_headers().into_iter().map(String::from).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn valid_row() -> Vec<String> {
        row(&[
            "2023", "홍길동", "남", "2004.3.5", "010-1234-5678", "서울시", "의료IT과", "87", "상",
            "정보처리기능사, 컴활2급, 정보처리기능사", "Hong@Example.com",
            "한빛병원:2024.01 - ; 새솔의원", "", "사무, 기타", "재직중", "",
        ])
    }

    #[test]
    fn test_valid_row_is_normalized() {
        let input = validate_row(&valid_row(), &header()).unwrap();
        assert_eq!(input.graduation_year, 2023);
        assert_eq!(input.birth_date, "2004-03-05");
        assert_eq!(input.email.as_deref(), Some("hong@example.com"));
        assert_eq!(input.certificates, vec!["정보처리기능사", "컴활2급"]);
        assert_eq!(
            input.employment_history,
            vec![
                HistoryEntry::new("한빛병원", Some("2024.01 -".into())),
                HistoryEntry::new("새솔의원", None),
            ]
        );
        assert_eq!(input.desired_field, vec![DesiredField::Office, DesiredField::Other]);
        assert_eq!(input.current_status, vec![Status::Employed]);
        assert_eq!(input.memo, None);
    }

    #[test]
    fn test_blank_required_field_names_column() {
        let mut r = valid_row();
        r[1] = String::new();
        let defects = validate_row(&r, &header()).unwrap_err();
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].column, 1);
        assert_eq!(defects[0].to_string(), "열 B(이름): 이름 비어있음");
    }

    #[test]
    fn test_short_row_reports_every_missing_required_column() {
        let defects = validate_row(&row(&["2023", "홍길동"]), &header()).unwrap_err();
        let columns: Vec<usize> = defects.iter().map(|d| d.column).collect();
        assert_eq!(columns, vec![2, 3, 4, 6]);
    }

    #[test]
    fn test_all_defects_are_collected() {
        let mut r = valid_row();
        r[1] = "Hong".into();
        r[4] = "01012345678".into();
        r[6] = "컴퓨터과".into();
        r[7] = "120".into();
        r[13] = "사무, 요리".into();
        let defects = validate_row(&r, &header()).unwrap_err();
        let messages: Vec<String> = defects.iter().map(|d| d.message.clone()).collect();
        assert_eq!(
            messages,
            vec![
                "이름은 한글만 허용",
                "연락처 형식 오류(010-1234-5678)",
                "성적은 0~100 사이 숫자",
                "졸업학과 목록에 없음(컴퓨터과)",
                "희망분야 허용값 아님(요리)",
            ]
        );
    }

    #[test]
    fn test_phone_rule() {
        assert!(is_valid_phone("010-1234-5678"));
        assert!(!is_valid_phone("010-12-3456"));
        assert!(!is_valid_phone("0101234-5678"));
        assert!(!is_valid_phone("01012345678"));
        assert!(!is_valid_phone("011-1234-5678"));
    }

    #[test]
    fn test_email_rule() {
        assert!(is_valid_email("a.b+c@school.ac.kr"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@school.ac.kr"));
    }

    #[test]
    fn test_grade_rule() {
        assert_eq!(parse_grade("0"), Some(0.0));
        assert_eq!(parse_grade("100"), Some(100.0));
        assert_eq!(parse_grade("85.5"), Some(85.5));
        assert_eq!(parse_grade("-1"), None);
        assert_eq!(parse_grade("백"), None);
    }

    #[test]
    fn test_history_rule() {
        assert!(parse_history("").unwrap().is_empty());
        assert_eq!(parse_history("서울대：2025.03 -").unwrap()[0].period.as_deref(), Some("2025.03 -"));
        assert!(parse_history(":2025.01").is_none());
        assert!(parse_history("한빛병원:작년부터").is_none());
    }

    #[test]
    fn test_bad_history_reports_column() {
        let mut r = valid_row();
        r[12] = "서울대:2025년".into();
        let defects = validate_row(&r, &header()).unwrap_err();
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].column, 12);
        assert!(defects[0].message.starts_with("대학명/기간 형식 오류"));
    }

    #[test]
    fn test_validate_input_rechecks_rules() {
        let mut input = validate_row(&valid_row(), &header()).unwrap();
        assert!(validate_input(&input).is_ok());

        input.phone = "01012345678".into();
        input.birth_date = "2004.3.5".into();
        let err = validate_input(&input).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("연락처 형식 오류"));
        assert!(display.contains("생년월일"));
    }

    #[test]
    fn test_validate_patch_checks_present_fields_only() {
        assert!(validate_patch(&GraduatePatch::default()).is_ok());

        let patch = GraduatePatch {
            memo: Some("메모".into()),
            grade: Some(88.0),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_ok());

        let patch = GraduatePatch {
            phone: Some("02-123-4567".into()),
            employment_history: Some(vec![HistoryEntry::new("한빛병원", Some("언젠가".into()))]),
            ..Default::default()
        };
        let display = validate_patch(&patch).unwrap_err().to_string();
        assert!(display.contains("연락처 형식 오류"));
        assert!(display.contains("기간 형식 오류(언젠가)"));
    }

    #[test]
    fn test_serial_birth_date() {
        let mut r = valid_row();
        r[3] = "36950".into();
        let input = validate_row(&r, &header()).unwrap();
        assert_eq!(input.birth_date, "2001-02-27");
    }
}
