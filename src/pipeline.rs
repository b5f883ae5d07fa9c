//! End-to-end leave normalization.
//!
//! [`run`] is the pure core: header validation, month selection, row
//! parsing, month/status filtering and normalization over an in-memory
//! [`LeaveSheet`]. [`execute`] wraps it with file I/O for the `normalize`
//! subcommand.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Month;
use log::{debug, info, warn};

use crate::{
    cli::{NormalizeArgs, OutputFormat},
    config::LeaveConfig,
    error::LeaveError,
    io_utils,
    month::{filter_by_month_and_status, parse_month, select_month},
    normalize::{DayCountMismatch, NormalizedLeaveRow, find_day_count_mismatches, normalize_all, normalized_headers},
    payroll::{payroll_headers, project},
    report::RunReport,
    request::{ColumnLayout, ExcludedRow, LeaveRequest, LeaveSheet, parse_requests},
    table,
};

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub identifier: String,
    pub month: Month,
    pub rows_read: usize,
    pub parsed: usize,
    pub excluded: Vec<ExcludedRow>,
    pub filtered: Vec<LeaveRequest>,
    pub normalized: Vec<NormalizedLeaveRow>,
    pub mismatches: Vec<DayCountMismatch>,
}

impl PipelineOutcome {
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Runs the pipeline over `sheet`. `month` skips detection from
/// `identifier` when given.
pub fn run(
    sheet: &LeaveSheet,
    identifier: &str,
    month: Option<Month>,
    config: &LeaveConfig,
) -> Result<PipelineOutcome, LeaveError> {
    let layout = ColumnLayout::resolve(&sheet.headers, config)?;
    let month = match month {
        Some(month) => month,
        None => select_month(identifier)?,
    };
    debug!("Reporting month {} for '{identifier}'", month.name());

    let ingested = parse_requests(sheet, &layout, config);
    let parsed = ingested.requests.len();
    let filtered = filter_by_month_and_status(&ingested.requests, month, &config.approved_status);
    let normalized = normalize_all(&filtered);
    let mismatches = find_day_count_mismatches(&filtered);

    Ok(PipelineOutcome {
        identifier: identifier.to_string(),
        month,
        rows_read: sheet.rows.len(),
        parsed,
        excluded: ingested.excluded,
        filtered,
        normalized,
        mismatches,
    })
}

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let config = LeaveConfig::load_or_default(args.config.as_deref())?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let output_path = args.output.as_deref();
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, delimiter);

    let month = args.month.as_deref().map(parse_month).transpose()?;
    let identifier = resolve_identifier(args, month)?;

    info!(
        "Normalizing '{}' -> {} (delimiter '{}', output '{}')",
        args.input.display(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into()),
        crate::printable_delimiter(delimiter),
        crate::printable_delimiter(output_delimiter)
    );

    let bytes = io_utils::read_input_bytes(&args.input)?;
    let digest = io_utils::sha256_hex(&bytes);
    let sheet = io_utils::parse_sheet(&bytes, delimiter, input_encoding)
        .with_context(|| format!("Parsing leave data from {:?}", args.input))?;
    debug!("Read {} row(s) with headers {:?}", sheet.rows.len(), sheet.headers);

    let outcome = run(&sheet, &identifier, month, &config)?;
    info!(
        "{} of {} row(s) parsed, {} excluded, {} approved in {}, {} output row(s)",
        outcome.parsed,
        outcome.rows_read,
        outcome.excluded.len(),
        outcome.filtered.len(),
        outcome.month.name(),
        outcome.normalized.len()
    );
    if outcome.is_empty() {
        warn!(
            "No approved leave found for {} in {:?}",
            outcome.month.name(),
            args.input
        );
    }

    let date_format = config.output_date_format.as_str();
    let (headers, rows) = match args.format {
        OutputFormat::Normalized => normalized_table(&outcome, date_format),
        OutputFormat::Payroll => payroll_table(&outcome, date_format),
    };
    let writing_to_stdout = output_path.is_none_or(io_utils::is_dash);
    if args.table && writing_to_stdout {
        table::print_table(&headers, &rows);
    } else {
        if args.table {
            debug!("--table requested but output will remain delimited because a file path was provided");
        }
        io_utils::write_table(output_path, output_delimiter, output_encoding, &headers, &rows)?;
    }

    if let Some(path) = args.payroll_output.as_deref() {
        let (headers, rows) = payroll_table(&outcome, date_format);
        write_side_output(path, args, delimiter, output_encoding, &headers, &rows)?;
        info!("Payroll projection with {} row(s) written to {path:?}", rows.len());
    }

    if let Some(path) = args.filtered_output.as_deref() {
        let rows = outcome
            .filtered
            .iter()
            .map(|request| request.raw.clone())
            .collect::<Vec<_>>();
        write_side_output(path, args, delimiter, output_encoding, &sheet.headers, &rows)?;
        info!("{} filtered source row(s) written to {path:?}", rows.len());
    }

    if let Some(path) = args.report.as_deref() {
        RunReport::from_outcome(&outcome, Some(digest)).save(path)?;
        info!("Run report written to {path:?}");
    }

    Ok(())
}

fn resolve_identifier(args: &NormalizeArgs, month: Option<Month>) -> Result<String> {
    if let Some(identifier) = args.identifier.as_ref() {
        return Ok(identifier.clone());
    }
    if !io_utils::is_dash(&args.input) {
        if let Some(name) = args.input.file_name().and_then(|n| n.to_str()) {
            return Ok(name.to_string());
        }
    }
    match month {
        Some(month) => Ok(month.name().to_string()),
        None => Err(anyhow!(
            "--identifier or --month is required when the input has no file name"
        )),
    }
}

fn write_side_output(
    path: &Path,
    args: &NormalizeArgs,
    input_delimiter: u8,
    encoding: &'static encoding_rs::Encoding,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<()> {
    let delimiter =
        io_utils::resolve_output_delimiter(Some(path), args.output_delimiter, input_delimiter);
    io_utils::write_table(Some(path), delimiter, encoding, headers, rows)
}

pub fn normalized_table(outcome: &PipelineOutcome, date_format: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let rows = outcome
        .normalized
        .iter()
        .map(|row| row.to_record(date_format))
        .collect();
    (normalized_headers(), rows)
}

pub fn payroll_table(outcome: &PipelineOutcome, date_format: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let rows = project(&outcome.normalized, date_format)
        .iter()
        .map(|row| row.to_record())
        .collect();
    (payroll_headers(), rows)
}
