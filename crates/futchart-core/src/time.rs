//! KIS 날짜 형식 유틸리티.
//!
//! KIS 조회 API는 날짜를 `YYYYMMDD` 문자열로 주고받습니다.

use chrono::{Duration, NaiveDate, Utc};

/// KIS 날짜 형식 (`YYYYMMDD`).
pub const KIS_DATE_FORMAT: &str = "%Y%m%d";

/// 날짜를 KIS 형식 문자열로 변환.
pub fn format_kis_date(date: NaiveDate) -> String {
    date.format(KIS_DATE_FORMAT).to_string()
}

/// 현재 한국 시각(KST, UTC+9) 기준 날짜를 KIS 형식으로 반환.
pub fn kis_today() -> String {
    let now = Utc::now() + Duration::hours(9);
    format_kis_date(now.date_naive())
}

/// 사용자 입력 조회 종료일을 KIS 형식으로 맞춤.
///
/// `YYYY-MM-DD`만 `YYYYMMDD`로 바꾸고 나머지 입력은 그대로 통과시킵니다.
/// 형식 검증은 원격 서비스에 맡깁니다.
pub fn normalize_close_date(input: &str) -> String {
    let trimmed = input.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => format_kis_date(date),
        Err(_) => trimmed.to_string(),
    }
}
