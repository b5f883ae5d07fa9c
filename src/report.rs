//! Audit summary of a normalization run, written as JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    normalize::{DayCountMismatch, NormalizedLeaveRow, total_weight},
    pipeline::PipelineOutcome,
    request::ExcludedRow,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTotal {
    pub employee_code: String,
    pub rows: usize,
    pub days: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub identifier: String,
    pub month: String,
    pub input_sha256: Option<String>,
    pub rows_read: usize,
    pub rows_parsed: usize,
    pub rows_excluded: usize,
    pub rows_in_month: usize,
    pub rows_emitted: usize,
    pub excluded: Vec<ExcludedRow>,
    pub day_count_mismatches: Vec<DayCountMismatch>,
    pub employees: Vec<EmployeeTotal>,
}

impl RunReport {
    pub fn from_outcome(outcome: &PipelineOutcome, input_sha256: Option<String>) -> Self {
        Self {
            identifier: outcome.identifier.clone(),
            month: outcome.month.name().to_string(),
            input_sha256,
            rows_read: outcome.rows_read,
            rows_parsed: outcome.parsed,
            rows_excluded: outcome.excluded.len(),
            rows_in_month: outcome.filtered.len(),
            rows_emitted: outcome.normalized.len(),
            excluded: outcome.excluded.clone(),
            day_count_mismatches: outcome.mismatches.clone(),
            employees: employee_totals(&outcome.normalized),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating report directory {parent:?}"))?;
        }
        let json = serde_json::to_string_pretty(self).context("Serializing run report")?;
        fs::write(path, json).with_context(|| format!("Writing run report to {path:?}"))
    }
}

/// Per-employee row counts and day totals. `rows` must already be sorted by
/// employee, as [`crate::normalize::normalize_all`] returns them.
pub fn employee_totals(rows: &[NormalizedLeaveRow]) -> Vec<EmployeeTotal> {
    rows.iter()
        .chunk_by(|row| row.employee_code.clone())
        .into_iter()
        .map(|(code, group)| {
            let group = group.collect::<Vec<_>>();
            EmployeeTotal {
                employee_code: code.to_string(),
                rows: group.len(),
                days: total_weight(group.iter().copied()).normalize(),
            }
        })
        .collect()
}
