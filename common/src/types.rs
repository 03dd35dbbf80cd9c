//! 졸업생 레코드 타입 정의
//!
//! 엑셀 가져오기, 저장소, 내보내기가 공유하는 타입:
//! - 열거형: 성별, 근태, 학과, 희망분야, 현재상태
//! - GraduateInput: 검증을 통과한 한 행 (ValidatedRecord)
//! - GraduatePatch: 병합 방식 수정 내용
//! - Graduate: 저장된 졸업생

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 한글 라벨로 직렬화되는 고정 선택지 열거형을 만든다
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// 허용값 전체 (정의 순서)
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| s.to_string())
            }
        }
    };
}

labeled_enum!(
    /// 성별
    Gender {
        Male => "남",
        Female => "여",
    }
);

labeled_enum!(
    /// 근태
    Attendance {
        High => "상",
        Middle => "중",
        Low => "하",
    }
);

labeled_enum!(
    /// 졸업학과
    Department {
        UHealthSystem => "유헬스시스템과",
        UHealthDesign => "유헬스디자인과",
        MedicalIt => "의료IT과",
        MedicalBusiness => "의료비즈니스과",
        DigitalMedicalIt => "디지털의료IT과",
        HealthNursing => "보건간호과",
        ContentDesign3d => "3D콘텐츠디자인과",
        HealthScience => "건강과학과",
        MedicalBeauty => "의료미용과",
    }
);

labeled_enum!(
    /// 희망분야
    DesiredField {
        Manufacturing => "제조",
        Office => "사무",
        SkinCare => "피부미용",
        Nursing => "간호",
        Security => "보안",
        Service => "서비스",
        Other => "기타",
    }
);

labeled_enum!(
    /// 현재상태
    Status {
        JobSeeking => "구직중",
        InTraining => "교육중",
        Enrolled => "재학중",
        Employed => "재직중",
        MilitaryService => "군복무",
    }
);

/// 취업처 또는 진학처 한 건 (`이름[:기간]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl HistoryEntry {
    pub fn new(name: impl Into<String>, period: Option<String>) -> Self {
        Self {
            name: name.into(),
            period,
        }
    }

    /// 내보내기용 표기: `이름 (기간)`
    pub fn display_label(&self) -> String {
        match &self.period {
            Some(p) => format!("{} ({})", self.name, p),
            None => self.name.clone(),
        }
    }
}

/// 검증을 통과한 졸업생 입력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduateInput {
    pub graduation_year: i32,
    pub name: String,
    pub gender: Gender,
    /// ISO yyyy-MM-dd
    pub birth_date: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub department: Department,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub attendance: Option<Attendance>,
    #[serde(default)]
    pub certificates: Vec<String>,
    /// 소문자로 정규화된 이메일
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub employment_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub education_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub desired_field: Vec<DesiredField>,
    #[serde(default)]
    pub current_status: Vec<Status>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// 수정 내용. `None`인 필드는 기존 값을 유지한다.
///
/// 병합 전용이라 선택 항목을 비우는 수단은 없다. `"email": ""`도 `None`으로 정규화된다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraduatePatch {
    pub graduation_year: Option<i32>,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<Department>,
    pub grade: Option<f64>,
    pub attendance: Option<Attendance>,
    pub certificates: Option<Vec<String>>,
    pub email: Option<String>,
    pub employment_history: Option<Vec<HistoryEntry>>,
    pub education_history: Option<Vec<HistoryEntry>>,
    pub desired_field: Option<Vec<DesiredField>>,
    pub current_status: Option<Vec<Status>>,
    pub memo: Option<String>,
}

impl GraduateInput {
    /// JSON 문자열에서 읽는다 (camelCase 키)
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let input: Self = serde_json::from_str(json)?;
        Ok(input)
    }
}

impl GraduatePatch {
    /// JSON 문자열에서 읽는다. 없는 키는 수정하지 않는다.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let patch: Self = serde_json::from_str(json)?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

impl From<GraduateInput> for GraduatePatch {
    /// 엑셀 행을 기존 레코드에 덮어쓸 때 사용. 빈 선택 항목은 제공되지 않은 것으로 본다.
    fn from(input: GraduateInput) -> Self {
        Self {
            graduation_year: Some(input.graduation_year),
            name: Some(input.name),
            gender: Some(input.gender),
            birth_date: Some(input.birth_date),
            phone: Some(input.phone),
            address: Some(input.address).filter(|a| !a.is_empty()),
            department: Some(input.department),
            grade: input.grade,
            attendance: input.attendance,
            certificates: non_empty(input.certificates),
            email: input.email,
            employment_history: non_empty(input.employment_history),
            education_history: non_empty(input.education_history),
            desired_field: non_empty(input.desired_field),
            current_status: non_empty(input.current_status),
            memo: input.memo,
        }
    }
}

/// 저장된 졸업생
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graduate {
    pub id: String,
    pub photo_url: Option<String>,
    pub graduation_year: i32,
    pub name: String,
    pub gender: Gender,
    pub birth_date: String,
    pub phone: String,
    pub address: String,
    pub department: Department,
    pub grade: Option<f64>,
    pub attendance: Option<Attendance>,
    pub certificates: Vec<String>,
    pub email: Option<String>,
    pub employment_history: Vec<HistoryEntry>,
    pub education_history: Vec<HistoryEntry>,
    pub desired_field: Vec<DesiredField>,
    pub current_status: Vec<Status>,
    pub memo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Graduate {
    /// 새 레코드 생성 (id・시각은 호출 측이 부여)
    pub fn from_input(id: String, input: GraduateInput, now: &str) -> Self {
        Self {
            id,
            photo_url: None,
            graduation_year: input.graduation_year,
            name: input.name,
            gender: input.gender,
            birth_date: input.birth_date,
            phone: input.phone,
            address: input.address,
            department: input.department,
            grade: input.grade,
            attendance: input.attendance,
            certificates: input.certificates,
            email: input.email,
            employment_history: input.employment_history,
            education_history: input.education_history,
            desired_field: input.desired_field,
            current_status: input.current_status,
            memo: input.memo,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// 제공된 필드만 덮어쓴다 (병합)
    pub fn apply(&mut self, patch: GraduatePatch) {
        if let Some(v) = patch.graduation_year {
            self.graduation_year = v;
        }
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.birth_date {
            self.birth_date = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.address {
            self.address = v;
        }
        if let Some(v) = patch.department {
            self.department = v;
        }
        if patch.grade.is_some() {
            self.grade = patch.grade;
        }
        if patch.attendance.is_some() {
            self.attendance = patch.attendance;
        }
        if let Some(v) = patch.certificates {
            self.certificates = v;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if let Some(v) = patch.employment_history {
            self.employment_history = v;
        }
        if let Some(v) = patch.education_history {
            self.education_history = v;
        }
        if let Some(v) = patch.desired_field {
            self.desired_field = v;
        }
        if let Some(v) = patch.current_status {
            self.current_status = v;
        }
        if patch.memo.is_some() {
            self.memo = patch.memo;
        }
    }
}

/// 숫자 이외의 문자를 모두 제거
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> GraduateInput {
        GraduateInput {
            graduation_year: 2023,
            name: "홍길동".into(),
            gender: Gender::Male,
            birth_date: "2004-03-05".into(),
            phone: "010-1234-5678".into(),
            address: "서울시 강남구".into(),
            department: Department::MedicalIt,
            grade: Some(87.0),
            attendance: Some(Attendance::High),
            certificates: vec!["정보처리기능사".into()],
            email: Some("hong@example.com".into()),
            employment_history: vec![HistoryEntry::new("한빛병원", Some("2024.01 -".into()))],
            education_history: vec![],
            desired_field: vec![DesiredField::Office],
            current_status: vec![Status::Employed],
            memo: None,
        }
    }

    #[test]
    fn test_enum_labels_round_trip() {
        assert_eq!("3D콘텐츠디자인과".parse::<Department>(), Ok(Department::ContentDesign3d));
        assert_eq!(Status::Employed.to_string(), "재직중");
        assert!("컴퓨터과".parse::<Department>().is_err());
        assert_eq!(Gender::labels(), vec!["남", "여"]);
    }

    #[test]
    fn test_enum_serializes_as_label() {
        let json = serde_json::to_string(&vec![DesiredField::SkinCare, DesiredField::Other]).unwrap();
        assert_eq!(json, r#"["피부미용","기타"]"#);
    }

    #[test]
    fn test_patch_from_input_skips_blank_optionals() {
        let mut input = sample_input();
        input.address = String::new();
        input.certificates.clear();
        let patch = GraduatePatch::from(input);
        assert!(patch.address.is_none());
        assert!(patch.certificates.is_none());
        assert_eq!(patch.name.as_deref(), Some("홍길동"));
    }

    #[test]
    fn test_apply_merges_only_provided_fields() {
        let mut g = Graduate::from_input("id-1".into(), sample_input(), "2025-01-01T00:00:00Z");
        let patch = GraduatePatch {
            phone: Some("010-9999-8888".into()),
            ..Default::default()
        };
        g.apply(patch);
        assert_eq!(g.phone, "010-9999-8888");
        assert_eq!(g.address, "서울시 강남구");
        assert_eq!(g.email.as_deref(), Some("hong@example.com"));
        assert_eq!(g.certificates, vec!["정보처리기능사".to_string()]);
    }

    #[test]
    fn test_patch_from_json_keeps_missing_keys_unset() {
        let patch = GraduatePatch::from_json(r#"{"memo": "재연락 필요", "currentStatus": ["구직중"]}"#).unwrap();
        assert_eq!(patch.memo.as_deref(), Some("재연락 필요"));
        assert_eq!(patch.current_status, Some(vec![Status::JobSeeking]));
        assert!(patch.phone.is_none());
        assert!(GraduatePatch::from_json("{").is_err());
    }

    #[test]
    fn test_history_display_label() {
        assert_eq!(HistoryEntry::new("한빛병원", Some("2024.01 -".into())).display_label(), "한빛병원 (2024.01 -)");
        assert_eq!(HistoryEntry::new("서울대", None).display_label(), "서울대");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("010-1234-5678"), "01012345678");
        assert_eq!(digits_only("(010) 1234 5678"), "01012345678");
    }
}
