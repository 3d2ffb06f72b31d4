//! 时间工具函数
//!
//! 日期字符串 (YYYY-MM-DD) 的解析在 API handler 层完成，
//! repository 层只接收 `NaiveDate` 和 `i64` Unix millis。

use chrono::{NaiveDate, Utc};

use super::{AppError, AppResult};

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Current instant as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Date as the canonical wire string (YYYY-MM-DD)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Compact date key (YYYYMMDD) used in deterministic record ids
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Shift an instant by whole days
pub fn millis_plus_days(millis: i64, days: i64) -> i64 {
    millis + days * DAY_MILLIS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let d = parse_date("2025-12-01").unwrap();
        assert_eq!(format_date(d), "2025-12-01");
        assert_eq!(date_key(d), "20251201");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("01-12-2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn day_arithmetic() {
        assert_eq!(millis_plus_days(0, 2), 2 * DAY_MILLIS);
    }
}
