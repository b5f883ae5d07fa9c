//! Projection of normalized rows onto the payroll import schema.

use crate::{normalize::NormalizedLeaveRow, session::SessionPair};

pub const PAYROLL_HEADERS: [&str; 9] = [
    "EmployeeID",
    "LeaveType",
    "Unit",
    "From",
    "To",
    "Session",
    "StartTime",
    "DaysOrHoursTaken",
    "ReasonForLeave",
];

const UNIT_DAY: &str = "Day";

/// Payroll session code: `0` full day, `1` first half, `2` second half.
/// An afternoon-to-morning pair has no payroll code.
pub fn session_code(pair: SessionPair) -> Option<u8> {
    match pair {
        SessionPair::FullDay => Some(0),
        SessionPair::FirstOnly => Some(1),
        SessionPair::SecondOnly => Some(2),
        SessionPair::Overnight => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollRow {
    pub employee_id: String,
    pub leave_type: String,
    pub from: String,
    pub to: String,
    pub session: Option<u8>,
    pub days_taken: String,
    pub reason: String,
}

impl PayrollRow {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.employee_id.clone(),
            self.leave_type.clone(),
            UNIT_DAY.to_string(),
            self.from.clone(),
            self.to.clone(),
            self.session.map(|code| code.to_string()).unwrap_or_default(),
            String::new(),
            self.days_taken.clone(),
            self.reason.clone(),
        ]
    }
}

pub fn project_row(row: &NormalizedLeaveRow, date_format: &str) -> PayrollRow {
    PayrollRow {
        employee_id: row.employee_code.to_string(),
        leave_type: row.leave_type.clone().unwrap_or_default(),
        from: row.span_start.format(date_format).to_string(),
        to: row.span_end.format(date_format).to_string(),
        session: session_code(row.session_pair()),
        days_taken: row.day_count.to_string(),
        reason: row.applier_remarks.clone().unwrap_or_default(),
    }
}

pub fn project(rows: &[NormalizedLeaveRow], date_format: &str) -> Vec<PayrollRow> {
    rows.iter().map(|row| project_row(row, date_format)).collect()
}

pub fn payroll_headers() -> Vec<String> {
    PAYROLL_HEADERS.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        normalize::DayCount,
        request::EmployeeCode,
        session::Session,
    };

    fn row(from: Session, to: Session, day_count: DayCount) -> NormalizedLeaveRow {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        NormalizedLeaveRow {
            employee_code: EmployeeCode::new("E9"),
            leave_type: None,
            span_start: day,
            span_end: day,
            session_from: from,
            session_end: to,
            day_count,
            applied_on: Some("2025-05-30".into()),
            applier_remarks: Some("doctor".into()),
            status: "Approved".into(),
        }
    }

    #[test]
    fn session_codes_follow_payroll_mapping() {
        assert_eq!(session_code(SessionPair::FirstOnly), Some(1));
        assert_eq!(session_code(SessionPair::SecondOnly), Some(2));
        assert_eq!(session_code(SessionPair::FullDay), Some(0));
        assert_eq!(session_code(SessionPair::Overnight), None);
    }

    #[test]
    fn projected_record_fills_fixed_columns() {
        let projected = project_row(
            &row(Session::SecondSession, Session::SecondSession, DayCount::Half),
            "%Y-%m-%d",
        );
        assert_eq!(
            projected.to_record(),
            vec!["E9", "", "Day", "2025-06-02", "2025-06-02", "2", "", "0.5", "doctor"]
        );
    }

    #[test]
    fn unmapped_pair_yields_blank_session_cell() {
        let projected = project(
            &[row(Session::SecondSession, Session::FirstSession, DayCount::Half)],
            "%Y-%m-%d",
        );
        assert_eq!(projected[0].session, None);
        assert_eq!(projected[0].to_record()[5], "");
    }
}
