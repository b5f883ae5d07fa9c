//! Month detection and month/status filtering.
//!
//! The reporting month is read from a free-text identifier, usually the
//! upload's file name. Month names are tested in calendar order and the
//! first one found anywhere in the identifier wins, so an identifier that
//! mentions two months (`May_January_report.csv`) resolves to the earlier
//! month in the calendar rather than the earlier one in the text.

use std::sync::OnceLock;

use chrono::{Datelike, Month};
use regex::{Regex, RegexBuilder};

use crate::{error::LeaveError, request::LeaveRequest};

pub const APPROVED_STATUS: &str = "approved";

static MONTH_PATTERNS: OnceLock<Vec<(Month, Regex)>> = OnceLock::new();

fn month_patterns() -> &'static [(Month, Regex)] {
    MONTH_PATTERNS.get_or_init(|| {
        all_months()
            .map(|month| {
                let pattern = RegexBuilder::new(&regex::escape(month.name()))
                    .case_insensitive(true)
                    .build()
                    .expect("month names are valid patterns");
                (month, pattern)
            })
            .collect()
    })
}

fn all_months() -> impl Iterator<Item = Month> {
    (1u8..=12).filter_map(|n| Month::try_from(n).ok())
}

pub fn select_month(identifier: &str) -> Result<Month, LeaveError> {
    month_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(identifier))
        .map(|(month, _)| *month)
        .ok_or_else(|| LeaveError::MonthNotFound(identifier.to_string()))
}

/// Parses an explicit month given as a number (`6`, `06`) or an English
/// name or three-letter abbreviation (`June`, `jun`).
pub fn parse_month(value: &str) -> Result<Month, LeaveError> {
    let trimmed = value.trim();
    if let Ok(number) = trimmed.parse::<u8>() {
        return Month::try_from(number).map_err(|_| LeaveError::UnknownMonth(trimmed.to_string()));
    }
    trimmed
        .parse::<Month>()
        .map_err(|_| LeaveError::UnknownMonth(trimmed.to_string()))
}

pub fn is_approved(status: &str, approved: &str) -> bool {
    status.trim().to_lowercase() == approved.trim().to_lowercase()
}

pub fn filter_by_month(requests: &[LeaveRequest], month: Month) -> Vec<LeaveRequest> {
    filter_by_month_and_status(requests, month, APPROVED_STATUS)
}

pub fn filter_by_month_and_status(
    requests: &[LeaveRequest],
    month: Month,
    approved: &str,
) -> Vec<LeaveRequest> {
    requests
        .iter()
        .filter(|request| request.applied_from.month() == month.number_from_month())
        .filter(|request| is_approved(&request.status, approved))
        .cloned()
        .collect()
}
