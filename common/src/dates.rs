//! 날짜・기간 문자열 처리
//!
//! 생년월일 입력은 여러 표기를 허용하고 ISO(yyyy-MM-dd)로 정규화한다.
//! - `2001-03-05` (뒤에 시각이 붙어도 앞부분만 사용)
//! - `2001.3.5`, `2001/03/05`, `2001-3-5`
//! - `20010305`
//! - 엑셀 날짜 일련번호 (1899-12-30 기준, 59 초과 시 1900-02-29 버그 보정)

use chrono::{Days, NaiveDate};
use regex::Regex;

lazy_static::lazy_static! {
    static ref ISO_PREFIX_RE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap();
    static ref DELIMITED_RE: Regex =
        Regex::new(r"^(\d{4})\s*[./-]\s*(\d{1,2})\s*[./-]\s*(\d{1,2})\.?$").unwrap();
    static ref COMPACT_RE: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
    static ref SERIAL_RE: Regex = Regex::new(r"^\d{5,6}$").unwrap();
    static ref PERIOD_RE: Regex = {
        let date = r"\d{4}(?:[./-]\d{1,2}(?:[./-]\d{1,2})?)?";
        Regex::new(&format!(r"^{date}(?:\s*-\s*(?:{date})?)?$")).unwrap()
    };
}

/// 엑셀 날짜 일련번호의 기준일
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

fn ymd(y: &str, m: &str, d: &str) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// 엑셀 날짜 일련번호를 ISO 날짜로 변환
pub fn serial_to_iso(serial: u32) -> Option<String> {
    if serial == 0 {
        return None;
    }
    let days = if serial > 59 { serial - 1 } else { serial };
    let date = serial_epoch()?.checked_add_days(Days::new(days as u64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// 날짜 입력을 ISO(yyyy-MM-dd)로 정규화. 해석할 수 없으면 `None`
pub fn normalize_date(input: &str) -> Option<String> {
    let t = input.trim();
    if t.is_empty() {
        return None;
    }

    if let Some(c) = ISO_PREFIX_RE.captures(t) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = DELIMITED_RE.captures(t) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = COMPACT_RE.captures(t) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if SERIAL_RE.is_match(t) {
        return serial_to_iso(t.parse().ok()?);
    }

    None
}

/// 취업・진학 기간 문법 검사
///
/// `2025`, `2025.01`, `2025.01.01` 형태의 날짜 하나, 또는
/// `시작 - 끝` 범위. 끝은 생략할 수 있다 (`2025.01 -`).
/// 구분자로 `~`와 각종 대시도 허용한다.
pub fn is_valid_period(input: &str) -> bool {
    let t = input.trim();
    if t.is_empty() {
        return false;
    }
    let unified: String = t
        .chars()
        .map(|c| match c {
            '–' | '—' | '−' | '~' => '-',
            other => other,
        })
        .collect();
    PERIOD_RE.is_match(&unified)
}
