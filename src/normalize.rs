//! Session-split normalization.
//!
//! Every approved request becomes at most three payroll-safe rows:
//!
//! 1. `First → Second` requests are already whole days and pass through as a
//!    single row spanning the full request.
//! 2. A request starting in the second session yields a half-day row on its
//!    first date.
//! 3. A request ending in the first session yields a half-day row on its last
//!    date.
//! 4. Whatever lies between the trimmed ends becomes one aggregated full-day
//!    row.
//!
//! Rows of one request never overlap, and no row carries a non-positive day
//! count.

use std::fmt;

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::LeaveField,
    request::{EmployeeCode, LeaveRequest},
    session::{Session, SessionPair},
};

pub const NORMALIZED_HEADERS: [LeaveField; 10] = LeaveField::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCount {
    Half,
    Whole(u32),
}

impl DayCount {
    /// Whole-day count for an inclusive span, or `None` when the span is empty.
    pub fn for_span(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        let days = (end - start).num_days() + 1;
        u32::try_from(days)
            .ok()
            .filter(|days| *days > 0)
            .map(DayCount::Whole)
    }

    pub fn weight(self) -> Decimal {
        match self {
            DayCount::Half => Decimal::new(5, 1),
            DayCount::Whole(days) => Decimal::from(days),
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayCount::Half => f.write_str("0.5"),
            DayCount::Whole(days) => write!(f, "{days}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLeaveRow {
    pub employee_code: EmployeeCode,
    pub leave_type: Option<String>,
    pub span_start: NaiveDate,
    pub span_end: NaiveDate,
    pub session_from: Session,
    pub session_end: Session,
    pub day_count: DayCount,
    pub applied_on: Option<String>,
    pub applier_remarks: Option<String>,
    pub status: String,
}

impl NormalizedLeaveRow {
    fn from_request(
        request: &LeaveRequest,
        start: NaiveDate,
        end: NaiveDate,
        pair: SessionPair,
        day_count: DayCount,
    ) -> Self {
        let (session_from, session_end) = pair.sessions();
        Self {
            employee_code: request.employee_code.clone(),
            leave_type: request.leave_type.clone(),
            span_start: start,
            span_end: end,
            session_from,
            session_end,
            day_count,
            applied_on: request.applied_on.clone(),
            applier_remarks: request.applier_remarks.clone(),
            status: request.status.clone(),
        }
    }

    pub fn session_pair(&self) -> SessionPair {
        SessionPair::of(self.session_from, self.session_end)
    }

    /// Cells in [`NORMALIZED_HEADERS`] order.
    pub fn to_record(&self, date_format: &str) -> Vec<String> {
        vec![
            self.employee_code.to_string(),
            self.leave_type.clone().unwrap_or_default(),
            self.span_start.format(date_format).to_string(),
            self.span_end.format(date_format).to_string(),
            self.session_from.to_string(),
            self.session_end.to_string(),
            self.day_count.to_string(),
            self.applied_on.clone().unwrap_or_default(),
            self.applier_remarks.clone().unwrap_or_default(),
            self.status.clone(),
        ]
    }
}

pub fn normalized_headers() -> Vec<String> {
    NORMALIZED_HEADERS
        .iter()
        .map(|field| field.header().to_string())
        .collect()
}

pub fn normalize(request: &LeaveRequest) -> Vec<NormalizedLeaveRow> {
    let from = request.applied_from;
    let till = request.applied_till;

    if SessionPair::of(request.from_session, request.to_session) == SessionPair::FullDay {
        return DayCount::for_span(from, till)
            .map(|count| NormalizedLeaveRow::from_request(request, from, till, SessionPair::FullDay, count))
            .into_iter()
            .collect();
    }

    let mut rows = Vec::with_capacity(3);
    let mut working_start = Some(from);
    let mut working_end = Some(till);

    if request.from_session == Session::SecondSession {
        rows.push(NormalizedLeaveRow::from_request(
            request,
            from,
            from,
            SessionPair::SecondOnly,
            DayCount::Half,
        ));
        working_start = from.checked_add_days(Days::new(1));
    }

    if request.to_session == Session::FirstSession {
        rows.push(NormalizedLeaveRow::from_request(
            request,
            till,
            till,
            SessionPair::FirstOnly,
            DayCount::Half,
        ));
        working_end = till.checked_sub_days(Days::new(1));
    }

    if let (Some(start), Some(end)) = (working_start, working_end) {
        if let Some(count) = DayCount::for_span(start, end) {
            rows.push(NormalizedLeaveRow::from_request(
                request,
                start,
                end,
                SessionPair::FullDay,
                count,
            ));
        }
    }

    rows
}

/// Normalizes every request and orders the result by employee, then start
/// date. Ties keep input order.
pub fn normalize_all(requests: &[LeaveRequest]) -> Vec<NormalizedLeaveRow> {
    requests
        .iter()
        .flat_map(normalize)
        .sorted_by(|a, b| {
            a.employee_code
                .cmp(&b.employee_code)
                .then(a.span_start.cmp(&b.span_start))
        })
        .collect()
}

pub fn total_weight<'a>(rows: impl IntoIterator<Item = &'a NormalizedLeaveRow>) -> Decimal {
    rows.into_iter().map(|row| row.day_count.weight()).sum()
}

/// A request whose supplied day count disagrees with the normalized weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCountMismatch {
    pub line: usize,
    pub employee_code: String,
    pub supplied: Decimal,
    pub computed: Decimal,
}

/// Compares each request's raw `NumberOfDays` with the weight of its
/// normalized rows. Requests without a supplied count are skipped.
pub fn find_day_count_mismatches(requests: &[LeaveRequest]) -> Vec<DayCountMismatch> {
    requests
        .iter()
        .filter_map(|request| {
            let supplied = request.number_of_days?;
            let computed = total_weight(&normalize(request));
            if supplied.normalize() == computed.normalize() {
                return None;
            }
            warn!(
                "Line {} (employee '{}'): NumberOfDays {} differs from computed {}",
                request.line,
                request.employee_code,
                supplied.normalize(),
                computed.normalize()
            );
            Some(DayCountMismatch {
                line: request.line,
                employee_code: request.employee_code.to_string(),
                supplied: supplied.normalize(),
                computed: computed.normalize(),
            })
        })
        .collect()
}
