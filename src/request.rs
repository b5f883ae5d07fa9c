//! Leave request model and row ingestion.
//!
//! A [`LeaveSheet`] is the decoded table handed over by the I/O layer.
//! [`ColumnLayout::resolve`] matches its headers against the configured
//! aliases (missing required columns abort the batch) and
//! [`parse_requests`] turns every row into either a [`LeaveRequest`] or an
//! [`ExcludedRow`] explaining why it was dropped.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::{LeaveConfig, LeaveField},
    dates::DateParser,
    error::{LeaveError, RowIssue},
    session::Session,
};

/// Opaque employee identifier.
///
/// Ordering is numeric when both codes are integers, so `999` sorts before
/// `1001`; numeric codes sort ahead of alphanumeric ones, which compare as
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployeeCode(String);

impl EmployeeCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl Ord for EmployeeCode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for EmployeeCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EmployeeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRequest {
    /// 1-based line in the source table (the header is line 1).
    pub line: usize,
    pub employee_code: EmployeeCode,
    pub leave_type: Option<String>,
    pub applied_from: NaiveDate,
    pub applied_till: NaiveDate,
    pub from_session: Session,
    pub to_session: Session,
    pub number_of_days: Option<Decimal>,
    pub applied_on: Option<String>,
    pub applier_remarks: Option<String>,
    pub status: String,
    /// Decoded source cells, kept for the filtered export.
    pub raw: Vec<String>,
}

impl LeaveRequest {
    /// Inclusive number of calendar days covered by the request.
    pub fn span_days(&self) -> i64 {
        (self.applied_till - self.applied_from).num_days() + 1
    }
}

/// Decoded tabular input. `rows[i]` sits on source line `i + 2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Indexes into `rows` whose bytes did not decode cleanly. Those rows
    /// hold lossy text and are excluded at ingestion.
    pub undecodable: BTreeSet<usize>,
}

impl LeaveSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            undecodable: BTreeSet::new(),
        }
    }

    pub fn with_undecodable(mut self, undecodable: BTreeSet<usize>) -> Self {
        self.undecodable = undecodable;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedRow {
    pub line: usize,
    pub employee_code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    pub requests: Vec<LeaveRequest>,
    pub excluded: Vec<ExcludedRow>,
}

/// Position of every configured field within a sheet's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    positions: BTreeMap<LeaveField, usize>,
}

impl ColumnLayout {
    pub fn resolve(headers: &[String], config: &LeaveConfig) -> Result<Self, LeaveError> {
        let mut positions = BTreeMap::new();
        let mut missing = Vec::new();
        for field in LeaveField::ALL {
            match find_header(headers, &config.aliases(field)) {
                Some(idx) => {
                    debug!("Column {field} resolved to '{}' (#{})", headers[idx], idx + 1);
                    positions.insert(field, idx);
                }
                None if config.is_required(field) => missing.push(field.header().to_string()),
                None => debug!("Optional column {field} not present"),
            }
        }
        if missing.is_empty() {
            Ok(Self { positions })
        } else {
            Err(LeaveError::MissingColumns(missing))
        }
    }

    pub fn position(&self, field: LeaveField) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    fn cell<'a>(&self, row: &'a [String], field: LeaveField) -> &'a str {
        self.position(field)
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Exact header match first, then a trimmed case-insensitive one.
fn find_header(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(alias.trim()))
            })
        })
}

fn non_blank(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn parse_requests(sheet: &LeaveSheet, layout: &ColumnLayout, config: &LeaveConfig) -> Ingested {
    let parser = config.date_parser();
    debug!("Date strategies in order: {:?}", parser.strategies());
    let mut ingested = Ingested::default();
    for (idx, row) in sheet.rows.iter().enumerate() {
        let line = idx + 2;
        let parsed = if sheet.undecodable.contains(&idx) {
            Err(RowIssue::Undecodable)
        } else {
            parse_request(row, line, layout, config, &parser)
        };
        match parsed {
            Ok(request) => ingested.requests.push(request),
            Err(issue) => {
                let employee_code = layout.cell(row, LeaveField::EmployeeCode).to_string();
                warn!("Skipping line {line} (employee '{employee_code}'): {issue}");
                ingested.excluded.push(ExcludedRow {
                    line,
                    employee_code,
                    reason: issue.to_string(),
                });
            }
        }
    }
    ingested
}

fn parse_request(
    row: &[String],
    line: usize,
    layout: &ColumnLayout,
    config: &LeaveConfig,
    parser: &DateParser,
) -> Result<LeaveRequest, RowIssue> {
    let cell = |field| layout.cell(row, field);

    let employee_code = cell(LeaveField::EmployeeCode);
    if employee_code.is_empty() {
        return Err(RowIssue::MissingEmployee);
    }

    let applied_from = parser
        .parse(cell(LeaveField::AppliedFrom))
        .map_err(|source| RowIssue::InvalidDate {
            field: LeaveField::AppliedFrom.header(),
            source,
        })?;
    let applied_till = parser
        .parse_optional(cell(LeaveField::AppliedTill))
        .map_err(|source| RowIssue::InvalidDate {
            field: LeaveField::AppliedTill.header(),
            source,
        })?
        .unwrap_or(applied_from);
    if applied_till < applied_from {
        return Err(RowIssue::ReversedSpan {
            from: applied_from.to_string(),
            till: applied_till.to_string(),
        });
    }

    let from_session = parse_session(cell(LeaveField::FromSession), LeaveField::FromSession)?;
    let to_session = parse_session(cell(LeaveField::ToSession), LeaveField::ToSession)?;

    // The raw day count is advisory only; unreadable values are ignored.
    let number_of_days = Decimal::from_str(cell(LeaveField::NumberOfDays)).ok();

    let status = non_blank(cell(LeaveField::Status))
        .or_else(|| config.default_status.clone())
        .unwrap_or_default();

    Ok(LeaveRequest {
        line,
        employee_code: EmployeeCode::new(employee_code),
        leave_type: non_blank(cell(LeaveField::LeaveType)),
        applied_from,
        applied_till,
        from_session,
        to_session,
        number_of_days,
        applied_on: non_blank(cell(LeaveField::AppliedOn)),
        applier_remarks: non_blank(cell(LeaveField::ApplierRemarks)),
        status,
        raw: row.to_vec(),
    })
}

fn parse_session(value: &str, field: LeaveField) -> Result<Session, RowIssue> {
    value.parse().map_err(|source| RowIssue::InvalidSession {
        field: field.header(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        LeaveField::ALL.iter().map(|f| f.header().to_string()).collect()
    }

    fn row(cells: [&str; 10]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn employee_codes_order_numerically_then_lexically() {
        let mut codes = vec![
            EmployeeCode::new("E7"),
            EmployeeCode::new("1001"),
            EmployeeCode::new("999"),
            EmployeeCode::new("A1"),
        ];
        codes.sort();
        let ordered: Vec<&str> = codes.iter().map(EmployeeCode::as_str).collect();
        assert_eq!(ordered, vec!["999", "1001", "A1", "E7"]);
    }

    #[test]
    fn layout_reports_every_missing_column() {
        let headers = vec!["EmployeeCode".to_string(), "AppliedFrom".to_string()];
        let err = ColumnLayout::resolve(&headers, &LeaveConfig::default()).unwrap_err();
        match err {
            LeaveError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 8);
                assert!(missing.contains(&"NumberOfDays".to_string()));
                assert!(!missing.contains(&"AppliedFrom".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn layout_accepts_aliases_and_case_differences() {
        let mut headers = headers();
        headers[6] = "NrOfDays".into();
        headers[0] = " employeecode ".into();
        let layout = ColumnLayout::resolve(&headers, &LeaveConfig::default()).unwrap();
        assert_eq!(layout.position(LeaveField::NumberOfDays), Some(6));
        assert_eq!(layout.position(LeaveField::EmployeeCode), Some(0));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let headers: Vec<String> = headers()
            .into_iter()
            .filter(|h| h != "LeaveType")
            .collect();
        let mut config = LeaveConfig::default();
        config.optional_columns.push(LeaveField::LeaveType);
        let layout = ColumnLayout::resolve(&headers, &config).unwrap();
        assert_eq!(layout.position(LeaveField::LeaveType), None);
    }

    #[test]
    fn parses_rows_and_defaults_blank_till() {
        let sheet = LeaveSheet::new(
            headers(),
            vec![row([
                "E1",
                "Casual",
                "04-Jun-2025",
                "",
                "second session",
                "Second Session",
                "0.5",
                "01-Jun-2025",
                "family",
                "Approved",
            ])],
        );
        let config = LeaveConfig::default();
        let layout = ColumnLayout::resolve(&sheet.headers, &config).unwrap();
        let ingested = parse_requests(&sheet, &layout, &config);
        assert!(ingested.excluded.is_empty());
        let request = &ingested.requests[0];
        assert_eq!(request.line, 2);
        assert_eq!(request.applied_from, NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert_eq!(request.applied_till, request.applied_from);
        assert_eq!(request.from_session, Session::SecondSession);
        assert_eq!(request.number_of_days, Some(Decimal::new(5, 1)));
        assert_eq!(request.applier_remarks.as_deref(), Some("family"));
        assert_eq!(request.span_days(), 1);
    }

    #[test]
    fn bad_rows_are_excluded_with_reasons() {
        let sheet = LeaveSheet::new(
            headers(),
            vec![
                row(["", "", "2025-06-01", "", "First Session", "Second Session", "1", "", "", "Approved"]),
                row(["E2", "", "not a date", "", "First Session", "Second Session", "1", "", "", "Approved"]),
                row(["E3", "", "2025-06-05", "2025-06-01", "First Session", "Second Session", "1", "", "", "Approved"]),
                row(["E4", "", "2025-06-05", "", "Evening", "Second Session", "1", "", "", "Approved"]),
                row(["E5", "", "2025-06-05", "", "First Session", "Second Session", "n/a", "", "", "Approved"]),
            ],
        );
        let config = LeaveConfig::default();
        let layout = ColumnLayout::resolve(&sheet.headers, &config).unwrap();
        let ingested = parse_requests(&sheet, &layout, &config);
        assert_eq!(ingested.requests.len(), 1);
        assert_eq!(ingested.requests[0].employee_code.as_str(), "E5");
        assert_eq!(ingested.requests[0].number_of_days, None);
        let lines: Vec<usize> = ingested.excluded.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert_eq!(ingested.excluded[0].reason, "employee code is blank");
        assert!(ingested.excluded[1].reason.starts_with("AppliedFrom:"));
        assert!(ingested.excluded[2].reason.contains("after"));
        assert_eq!(ingested.excluded[3].reason, "FromSession: Unknown session 'Evening'");
    }

    #[test]
    fn undecodable_rows_are_excluded_not_fatal() {
        let sheet = LeaveSheet::new(
            headers(),
            vec![
                row(["E1", "", "2025-06-02", "", "First Session", "Second Session", "1", "", "Caf\u{fffd}", "Approved"]),
                row(["E2", "", "2025-06-03", "", "First Session", "Second Session", "1", "", "", "Approved"]),
            ],
        )
        .with_undecodable(BTreeSet::from([0]));
        let config = LeaveConfig::default();
        let layout = ColumnLayout::resolve(&sheet.headers, &config).unwrap();
        let ingested = parse_requests(&sheet, &layout, &config);
        assert_eq!(ingested.requests.len(), 1);
        assert_eq!(ingested.requests[0].employee_code.as_str(), "E2");
        assert_eq!(
            ingested.excluded,
            vec![ExcludedRow {
                line: 2,
                employee_code: "E1".into(),
                reason: "row contains bytes invalid for the input encoding".into(),
            }]
        );
    }

    #[test]
    fn default_status_fills_blank_cells() {
        let sheet = LeaveSheet::new(
            headers(),
            vec![row(["E1", "", "2025-06-02", "", "First Session", "Second Session", "", "", "", ""])],
        );
        let mut config = LeaveConfig::default();
        config.default_status = Some("Approved".into());
        let layout = ColumnLayout::resolve(&sheet.headers, &config).unwrap();
        let ingested = parse_requests(&sheet, &layout, &config);
        assert_eq!(ingested.requests[0].status, "Approved");
    }
}
