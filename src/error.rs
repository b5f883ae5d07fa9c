//! Typed errors for the leave pipeline.
//!
//! [`LeaveError`] covers the batch-fatal conditions (schema and month
//! detection). [`RowIssue`] describes why a single source row was left out of
//! normalization; those never abort a batch and are collected for the run
//! report instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaveError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("No month name found in '{0}'")]
    MonthNotFound(String),
    #[error("Unrecognized month '{0}' (expected a month name or a number 1-12)")]
    UnknownMonth(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Date value is empty")]
    Empty,
    #[error("Unrecognized date '{0}'")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionParseError {
    #[error("Session value is empty")]
    Empty,
    #[error("Unknown session '{0}'")]
    Unknown(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowIssue {
    #[error("employee code is blank")]
    MissingEmployee,
    #[error("{field}: {source}")]
    InvalidDate {
        field: &'static str,
        source: DateParseError,
    },
    #[error("{field}: {source}")]
    InvalidSession {
        field: &'static str,
        source: SessionParseError,
    },
    #[error("AppliedFrom {from} is after AppliedTill {till}")]
    ReversedSpan { from: String, till: String },
    #[error("row contains bytes invalid for the input encoding")]
    Undecodable,
}
