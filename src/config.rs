//! Column mapping and parsing configuration.
//!
//! A [`LeaveConfig`] is threaded explicitly through the pipeline. It names the
//! header aliases accepted for every [`LeaveField`], the fields allowed to be
//! absent from an export, the status token treated as approved, and the date
//! strategy order. Configs are stored as YAML through [`crate::yaml_provider`].

use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    dates::{DateParser, DateStrategy, default_strategies},
    month::APPROVED_STATUS,
    yaml_provider,
};

pub const DEFAULT_OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveField {
    EmployeeCode,
    LeaveType,
    AppliedFrom,
    AppliedTill,
    FromSession,
    ToSession,
    NumberOfDays,
    AppliedOn,
    ApplierRemarks,
    Status,
}

impl LeaveField {
    pub const ALL: [LeaveField; 10] = [
        LeaveField::EmployeeCode,
        LeaveField::LeaveType,
        LeaveField::AppliedFrom,
        LeaveField::AppliedTill,
        LeaveField::FromSession,
        LeaveField::ToSession,
        LeaveField::NumberOfDays,
        LeaveField::AppliedOn,
        LeaveField::ApplierRemarks,
        LeaveField::Status,
    ];

    /// Canonical header name, also used for the normalized output.
    pub fn header(self) -> &'static str {
        match self {
            LeaveField::EmployeeCode => "EmployeeCode",
            LeaveField::LeaveType => "LeaveType",
            LeaveField::AppliedFrom => "AppliedFrom",
            LeaveField::AppliedTill => "AppliedTill",
            LeaveField::FromSession => "FromSession",
            LeaveField::ToSession => "ToSession",
            LeaveField::NumberOfDays => "NumberOfDays",
            LeaveField::AppliedOn => "AppliedOn",
            LeaveField::ApplierRemarks => "ApplierRemarks",
            LeaveField::Status => "Status",
        }
    }
}

impl fmt::Display for LeaveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaveConfig {
    /// Accepted header spellings per field, tried in order.
    pub columns: BTreeMap<LeaveField, Vec<String>>,
    /// Fields that may be missing from an export without aborting the batch.
    pub optional_columns: Vec<LeaveField>,
    pub approved_status: String,
    /// Status used when the status cell (or column) is blank.
    pub default_status: Option<String>,
    pub date_strategies: Vec<DateStrategy>,
    pub output_date_format: String,
}

impl Default for LeaveConfig {
    fn default() -> Self {
        let columns = LeaveField::ALL
            .iter()
            .map(|field| {
                let mut aliases = vec![field.header().to_string()];
                if *field == LeaveField::NumberOfDays {
                    aliases.push("NrOfDays".to_string());
                }
                (*field, aliases)
            })
            .collect();
        Self {
            columns,
            optional_columns: Vec::new(),
            approved_status: APPROVED_STATUS.to_string(),
            default_status: None,
            date_strategies: default_strategies(),
            output_date_format: DEFAULT_OUTPUT_DATE_FORMAT.to_string(),
        }
    }
}

impl LeaveConfig {
    pub fn load(path: &Path) -> Result<Self> {
        yaml_provider::load_from_path(path)
            .with_context(|| format!("Loading leave config from {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        yaml_provider::save_to_path(path, self)
            .with_context(|| format!("Writing leave config to {path:?}"))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Aliases for `field`, falling back to the canonical header when the
    /// config leaves the field out.
    pub fn aliases(&self, field: LeaveField) -> Vec<&str> {
        match self.columns.get(&field) {
            Some(aliases) if !aliases.is_empty() => aliases.iter().map(String::as_str).collect(),
            _ => vec![field.header()],
        }
    }

    pub fn is_required(&self, field: LeaveField) -> bool {
        !self.optional_columns.contains(&field)
    }

    pub fn date_parser(&self) -> DateParser {
        if self.date_strategies.is_empty() {
            DateParser::default()
        } else {
            DateParser::new(self.date_strategies.clone())
        }
    }
}
