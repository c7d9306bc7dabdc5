/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::consts::*;
use super::repositories::PageRequest;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid {field}: `{value}` is not a valid id")]
    InvalidId { field: String, value: String },
    #[error("Invalid {field}: `{value}` is not a valid date")]
    InvalidDate { field: String, value: String },
    #[error("Invalid {field}: `{value}` is not a valid number")]
    InvalidNumber { field: String, value: String },
    #[error("Invalid {field}: {message}")]
    InvalidValue { field: String, message: String },
}

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

pub fn load_secret(f: &str) -> String {
    let s = std::fs::read_to_string(f).unwrap_or_default();
    s.trim().replace(char::from(25), "")
}

/// Trims the value and drops it when nothing is left.
pub fn sanitize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clamps raw paging parameters. Missing or zero values fall back to the
/// defaults, `1 <= page <= MAX_PAGE` and `1 <= limit <= MAX_PAGE_SIZE`.
pub fn validate_pagination(page: Option<i64>, limit: Option<i64>) -> PageRequest {
    let page = match page {
        Some(p) if p != 0 => (p.max(1) as u64).min(MAX_PAGE),
        _ => DEFAULT_PAGE,
    };

    let limit = match limit {
        Some(l) if l != 0 => l.clamp(1, MAX_PAGE_SIZE as i64) as u64,
        _ => DEFAULT_PAGE_SIZE,
    };

    PageRequest { page, limit }
}

/// Lenient integer parsing for query parameters; garbage reads as absent.
pub fn parse_page_param(s: Option<&str>) -> Option<i64> {
    s.and_then(|v| v.trim().parse::<i64>().ok())
}

/// Whole minutes between two instants, with halves rounded toward +∞.
/// Spans that do not fit the duration column are rejected.
pub fn duration_minutes(start: NaiveDateTime, end: NaiveDateTime) -> Result<i32, InputError> {
    let millis = (end - start).num_milliseconds();
    let minutes = (millis + 30_000).div_euclid(60_000);

    i32::try_from(minutes).map_err(|_| InputError::InvalidValue {
        field: "duration".to_string(),
        message: format!("a span of {} minutes is too long", minutes),
    })
}

pub fn parse_id(field: &str, s: &str) -> Result<Uuid, InputError> {
    Uuid::parse_str(s.trim()).map_err(|_| InputError::InvalidId {
        field: field.to_string(),
        value: s.to_string(),
    })
}

pub fn parse_id_list(field: &str, s: &str) -> Result<Vec<Uuid>, InputError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_id(field, part))
        .collect()
}

/// Accepts RFC 3339 timestamps as well as zone-less date-times and plain
/// dates, which are read as UTC.
pub fn parse_datetime(field: &str, s: &str) -> Result<NaiveDateTime, InputError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt);
    }

    Err(InputError::InvalidDate {
        field: field.to_string(),
        value: s.to_string(),
    })
}

pub fn parse_optional_datetime(
    field: &str,
    s: Option<&str>,
) -> Result<Option<NaiveDateTime>, InputError> {
    match s.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_datetime(field, v).map(Some),
        None => Ok(None),
    }
}

pub fn parse_enum<T: std::str::FromStr<Err = String>>(
    field: &str,
    s: &str,
) -> Result<T, InputError> {
    s.trim().parse::<T>().map_err(|message| InputError::InvalidValue {
        field: field.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::task::TaskStatus;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_port_in_range() {
        assert_eq!(port_in_range("3000"), Ok(3000));
        assert!(port_in_range("0").is_err());
        assert!(port_in_range("70000").is_err());
        assert!(port_in_range("http").is_err());
    }

    #[test]
    fn test_greater_than_zero() {
        assert_eq!(greater_than_zero::<u64>("30"), Ok(30));
        assert!(greater_than_zero::<u64>("0").is_err());
        assert!(greater_than_zero::<i64>("-4").is_err());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(Some("  Write spec ".into())), Some("Write spec".into()));
        assert_eq!(sanitize(Some("   ".into())), None);
        assert_eq!(sanitize(None), None);
    }

    #[test]
    fn test_validate_pagination() {
        assert_eq!(validate_pagination(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(validate_pagination(Some(0), Some(0)), PageRequest { page: 1, limit: 10 });
        assert_eq!(validate_pagination(Some(-3), Some(-5)), PageRequest { page: 1, limit: 1 });
        assert_eq!(validate_pagination(Some(4), Some(500)), PageRequest { page: 4, limit: 100 });
    }

    #[test]
    fn test_validate_pagination_caps_page() {
        let request = validate_pagination(Some(i64::MAX), Some(100));
        assert_eq!(request, PageRequest { page: MAX_PAGE, limit: 100 });
        assert!(request.offset() <= i64::MAX as u64);
    }

    #[test]
    fn test_parse_page_param() {
        assert_eq!(parse_page_param(Some("2")), Some(2));
        assert_eq!(parse_page_param(Some("two")), None);
        assert_eq!(parse_page_param(None), None);
    }

    #[test]
    fn test_duration_minutes_rounds_half_up() {
        let start = at("2024-01-01 09:00:00");
        assert_eq!(duration_minutes(start, at("2024-01-01 10:30:00")), Ok(90));
        assert_eq!(duration_minutes(start, at("2024-01-01 09:00:29")), Ok(0));
        assert_eq!(duration_minutes(start, at("2024-01-01 09:00:30")), Ok(1));
        assert_eq!(duration_minutes(start, at("2024-01-01 09:01:29")), Ok(1));
    }

    #[test]
    fn test_duration_minutes_negative_span() {
        let start = at("2024-01-01 09:00:00");
        assert_eq!(duration_minutes(start, at("2024-01-01 08:59:30")), Ok(0));
        assert_eq!(duration_minutes(start, at("2024-01-01 08:58:00")), Ok(-2));
    }

    #[test]
    fn test_duration_minutes_rejects_overlong_span() {
        let err = duration_minutes(at("0001-01-01 00:00:00"), at("9999-12-31 00:00:00"))
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidValue { ref field, .. } if field == "duration"));
        assert!(err.to_string().contains("5258963520 minutes"));
    }

    #[test]
    fn test_parse_id_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = parse_id_list("tagIds", &format!("{a},,{b},")).unwrap();
        assert_eq!(ids, vec![a, b]);
        assert!(parse_id_list("tagIds", "nope").is_err());
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = at("2024-03-01 12:00:00");
        assert_eq!(parse_datetime("startTime", "2024-03-01T12:00:00Z"), Ok(expected));
        assert_eq!(parse_datetime("startTime", "2024-03-01T13:00:00+01:00"), Ok(expected));
        assert_eq!(parse_datetime("startTime", "2024-03-01T12:00:00.000"), Ok(expected));
        assert_eq!(
            parse_datetime("startDate", "2024-03-01"),
            Ok(at("2024-03-01 00:00:00"))
        );
        assert!(parse_datetime("startDate", "yesterday").is_err());
        assert_eq!(parse_optional_datetime("endDate", Some("")), Ok(None));
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(
            parse_enum::<TaskStatus>("status", "IN_PROGRESS"),
            Ok(TaskStatus::InProgress)
        );
        assert!(parse_enum::<TaskStatus>("status", "DONE").is_err());
    }
}
