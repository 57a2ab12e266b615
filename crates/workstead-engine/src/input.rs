//! Input normalization and validation, applied before any write.

use chrono::{NaiveDate, NaiveTime};

use workstead_core::error::{HrError, HrResult};

/// Lowercase, trimmed, and shaped like an address.
pub fn normalize_email(raw: &str) -> HrResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid {
        return Err(HrError::bad_request(format!("invalid email: {raw}")));
    }
    Ok(email)
}

/// Split a full name into a first name and the remainder. At least a
/// first name is required.
pub fn split_full_name(raw: &str) -> HrResult<(String, Option<String>)> {
    let mut parts = raw.split_whitespace();
    let first = parts
        .next()
        .ok_or_else(|| HrError::bad_request("a name is required"))?
        .to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };
    Ok((first, last))
}

/// `%Y-%m-%d`, rejected otherwise.
pub fn parse_start_date(raw: &str) -> HrResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| HrError::bad_request(format!("invalid date: {raw}")))
}

/// `%H:%M` or `%H:%M:%S`.
pub fn parse_clock_time(raw: &str) -> HrResult<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| HrError::bad_request(format!("invalid time: {raw}")))
}
