//! 일괄 등록 엑셀의 열 정의
//!
//! 템플릿 1행의 라벨과 데이터 행의 위치가 1:1로 대응한다.
//! 첫 열 라벨(`졸업연도`)로 템플릿 여부를 판별한다.

/// 열 하나의 정의
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// 필드 키
    pub key: &'static str,
    /// 오류 메시지에 쓰는 필드명
    pub label: &'static str,
    /// 템플릿 헤더 라벨
    pub header: &'static str,
    pub required: bool,
}

/// 필드 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    GraduationYear = 0,
    Name,
    Gender,
    BirthDate,
    Phone,
    Address,
    Department,
    Grade,
    Attendance,
    Certificates,
    Email,
    EmploymentHistory,
    EducationHistory,
    DesiredField,
    CurrentStatus,
    Memo,
}

impl Field {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ColumnSpec {
        &COLUMNS[self.index()]
    }
}

/// 템플릿 첫 열 라벨
pub const EXPECTED_FIRST_HEADER: &str = "졸업연도";

/// 열 개수
pub const COLUMN_COUNT: usize = 16;

pub const COLUMNS: [ColumnSpec; COLUMN_COUNT] = [
    ColumnSpec { key: "graduationYear", label: "졸업연도", header: "졸업연도", required: true },
    ColumnSpec { key: "name", label: "이름", header: "이름", required: true },
    ColumnSpec { key: "gender", label: "성별", header: "성별", required: true },
    ColumnSpec { key: "birthDate", label: "생년월일", header: "생년월일(YYYY-MM-DD)", required: true },
    ColumnSpec { key: "phone", label: "연락처", header: "연락처(010-1234-5678)", required: true },
    ColumnSpec { key: "address", label: "주소", header: "주소(선택)", required: false },
    ColumnSpec { key: "department", label: "졸업학과", header: "졸업학과", required: true },
    ColumnSpec { key: "grade", label: "성적", header: "성적(%)(선택)", required: false },
    ColumnSpec { key: "attendance", label: "근태", header: "근태(상/중/하)(선택)", required: false },
    ColumnSpec { key: "certificates", label: "자격증", header: "자격증(쉼표구분)(선택)", required: false },
    ColumnSpec { key: "email", label: "이메일", header: "이메일(선택)", required: false },
    ColumnSpec {
        key: "employmentHistory",
        label: "취업처",
        header: "취업처(회사 또는 회사:기간; 세미콜론 구분, 기간 예: 2025.01 또는 2025.01 - 또는 2025.01-2025.12)(선택)",
        required: false,
    },
    ColumnSpec {
        key: "educationHistory",
        label: "대학",
        header: "대학(대학 또는 대학:기간; 세미콜론 구분, 기간 예: 2025.03 또는 2025.03 - 또는 2025.03.01 - 2028.02.28)(선택)",
        required: false,
    },
    ColumnSpec { key: "desiredField", label: "희망분야", header: "희망분야(복수,쉼표)(선택)", required: false },
    ColumnSpec { key: "currentStatus", label: "현재상태", header: "현재상태(복수,쉼표)(선택)", required: false },
    ColumnSpec { key: "memo", label: "메모", header: "메모(선택)", required: false },
];

/// 템플릿 헤더 라벨 목록
pub fn template_headers() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.header).collect()
}

/// 필드 키로 열 위치를 찾는다
pub fn index_of_key(key: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.key == key)
}

/// 0부터 시작하는 열 번호를 엑셀 열 문자로 변환 (0 → A, 26 → AA)
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut x = index as i64;
    loop {
        letters.push((b'A' + (x % 26) as u8) as char);
        x = x / 26 - 1;
        if x < 0 {
            break;
        }
    }
    letters.iter().rev().collect()
}

/// 오류 메시지용 열 참조: `열 B(이름)`
///
/// 업로드된 파일의 헤더가 있으면 그 라벨을 사용한다.
pub fn column_ref(index: usize, header: &[String]) -> String {
    match header.get(index).map(|h| h.trim()).filter(|h| !h.is_empty()) {
        Some(h) => format!("열 {}({})", column_letter(index), h),
        None => format!("열 {}", column_letter(index)),
    }
}
