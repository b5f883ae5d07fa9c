use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize mixed-session leave exports into payroll-safe rows",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Filter a leave export to its reporting month and split half-day sessions
    Normalize(NormalizeArgs),
    /// Print the month detected from a file name or other identifier
    DetectMonth(DetectMonthArgs),
    /// Write the default column mapping configuration as YAML
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// EmployeeCode, LeaveType, AppliedFrom, ... as exported by the HR system
    #[default]
    Normalized,
    /// EmployeeID, LeaveType, Unit, From, To, Session, ... for payroll import
    Payroll,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Leave export to normalize ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Layout of the primary output
    #[arg(long = "format", value_enum, default_value = "normalized")]
    pub format: OutputFormat,
    /// Also write the payroll projection to this file
    #[arg(long = "payroll-output")]
    pub payroll_output: Option<PathBuf>,
    /// Also write the month-filtered source rows to this file
    #[arg(long = "filtered-output")]
    pub filtered_output: Option<PathBuf>,
    /// Write a JSON run report (counts, excluded rows, day-count mismatches)
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// Text scanned for the reporting month (defaults to the input file name)
    #[arg(long = "identifier")]
    pub identifier: Option<String>,
    /// Reporting month as a name or number, skipping detection
    #[arg(long = "month")]
    pub month: Option<String>,
    /// Column mapping configuration (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for output files/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Render the primary output as a table on stdout
    #[arg(long = "table")]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct DetectMonthArgs {
    /// Identifier to scan, e.g. an uploaded file name
    pub identifier: String,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
