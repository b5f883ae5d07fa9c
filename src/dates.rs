//! Date parsing for leave exports.
//!
//! HR systems hand us dates either as spreadsheet-native values (serialised
//! as ISO, RFC 3339 or Excel-style `6/4/2025 0:00` date-times) or as
//! `DD-Mon-YYYY` text such as `04-Jun-2025`. Time-of-day parts are dropped.
//! A [`DateParser`] holds an ordered list of [`DateStrategy`] values and returns
//! the first one that accepts the input.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DateParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStrategy {
    /// `2025-06-04`, `2025/06/04`
    Iso,
    /// `2025-06-04 00:00:00`, `2025-06-04T09:30`, ...
    IsoDateTime,
    /// `2025-06-04T00:00:00Z`, `2025-06-04T09:30:00+05:30`
    Rfc3339,
    /// `06/04/2025`, `6/4/2025 0:00`, `06/04/2025 00:00:00`
    MonthFirstSlashed,
    /// `04/06/2025`, `4/6/2025 0:00`, `04/06/2025 00:00:00`
    DayFirstSlashed,
    /// `04-06-2025`
    DayFirstDashed,
    /// `04-Jun-2025`, `04-June-2025`, `4 Jun 2025`
    DayMonthName,
}

impl DateStrategy {
    pub fn parse(self, value: &str) -> Option<NaiveDate> {
        match self {
            DateStrategy::Iso => try_formats(value, &["%Y-%m-%d", "%Y/%m/%d"]),
            DateStrategy::IsoDateTime => {
                const FORMATS: &[&str] = &[
                    "%Y-%m-%d %H:%M:%S",
                    "%Y-%m-%dT%H:%M:%S",
                    "%Y-%m-%d %H:%M:%S%.f",
                    "%Y-%m-%dT%H:%M:%S%.f",
                    "%Y-%m-%d %H:%M",
                    "%Y-%m-%dT%H:%M",
                ];
                try_datetime_formats(value, FORMATS)
            }
            DateStrategy::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive()),
            DateStrategy::MonthFirstSlashed => try_formats(value, &["%m/%d/%Y"]).or_else(|| {
                try_datetime_formats(value, &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"])
            }),
            DateStrategy::DayFirstSlashed => try_formats(value, &["%d/%m/%Y"]).or_else(|| {
                try_datetime_formats(value, &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"])
            }),
            DateStrategy::DayFirstDashed => try_formats(value, &["%d-%m-%Y"]),
            DateStrategy::DayMonthName => {
                try_formats(value, &["%d-%b-%Y", "%d-%B-%Y", "%d %b %Y", "%d %B %Y"])
            }
        }
    }
}

fn try_formats(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn try_datetime_formats(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

pub fn default_strategies() -> Vec<DateStrategy> {
    vec![
        DateStrategy::Iso,
        DateStrategy::IsoDateTime,
        DateStrategy::Rfc3339,
        DateStrategy::MonthFirstSlashed,
        DateStrategy::DayFirstDashed,
        DateStrategy::DayMonthName,
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    strategies: Vec<DateStrategy>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(default_strategies())
    }
}

impl DateParser {
    pub fn new(strategies: Vec<DateStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[DateStrategy] {
        &self.strategies
    }

    pub fn parse(&self, value: &str) -> Result<NaiveDate, DateParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DateParseError::Empty);
        }
        self.strategies
            .iter()
            .find_map(|strategy| strategy.parse(trimmed))
            .ok_or_else(|| DateParseError::Unrecognized(trimmed.to_string()))
    }

    /// Like [`DateParser::parse`] but maps a blank cell to `Ok(None)`.
    pub fn parse_optional(&self, value: &str) -> Result<Option<NaiveDate>, DateParseError> {
        match self.parse(value) {
            Ok(date) => Ok(Some(date)),
            Err(DateParseError::Empty) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn default_parser_accepts_generic_and_month_name_forms() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("2025-06-04").unwrap(), june(4));
        assert_eq!(parser.parse("2025-06-04 00:00:00").unwrap(), june(4));
        assert_eq!(parser.parse("06/04/2025").unwrap(), june(4));
        assert_eq!(parser.parse("04-Jun-2025").unwrap(), june(4));
        assert_eq!(parser.parse(" 04-June-2025 ").unwrap(), june(4));
    }

    #[test]
    fn strategy_order_decides_ambiguous_slashed_dates() {
        let day_first = DateParser::new(vec![
            DateStrategy::DayFirstSlashed,
            DateStrategy::MonthFirstSlashed,
        ]);
        assert_eq!(day_first.parse("06/04/2025").unwrap(), NaiveDate::from_ymd_opt(2025, 4, 6).unwrap());
        assert_eq!(DateParser::default().parse("06/04/2025").unwrap(), june(4));
    }

    #[test]
    fn unparseable_and_blank_values_are_reported() {
        let parser = DateParser::default();
        assert_eq!(parser.parse(""), Err(DateParseError::Empty));
        assert_eq!(
            parser.parse("31-Foo-2025"),
            Err(DateParseError::Unrecognized("31-Foo-2025".into()))
        );
        assert_eq!(parser.parse_optional("  ").unwrap(), None);
        assert!(parser.parse_optional("tomorrow").is_err());
    }

    #[test]
    fn spreadsheet_date_times_keep_only_the_date() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("6/4/2025 0:00").unwrap(), june(4));
        assert_eq!(parser.parse("06/04/2025 00:00:00").unwrap(), june(4));
        assert_eq!(parser.parse("6/4/2025 17:45").unwrap(), june(4));
    }

    #[test]
    fn rfc3339_values_use_their_local_date() {
        let parser = DateParser::default();
        assert_eq!(parser.parse("2025-06-04T00:00:00Z").unwrap(), june(4));
        assert_eq!(parser.parse("2025-06-04T23:30:00+05:30").unwrap(), june(4));
    }

    #[test]
    fn dashed_numeric_dates_are_day_first() {
        assert_eq!(DateParser::default().parse("04-06-2025").unwrap(), june(4));
        assert_eq!(DateStrategy::Iso.parse("04-06-2025"), None);
    }

    #[test]
    fn day_first_slashed_accepts_time_suffixes() {
        let parser = DateParser::new(vec![DateStrategy::DayFirstSlashed]);
        assert_eq!(parser.parse("4/6/2025 0:00").unwrap(), june(4));
        assert_eq!(parser.parse("04/06/2025 00:00:00").unwrap(), june(4));
    }

    #[test]
    fn each_strategy_is_isolated() {
        assert_eq!(DateStrategy::DayMonthName.parse("2025-06-04"), None);
        assert_eq!(DateStrategy::Iso.parse("04-Jun-2025"), None);
        assert_eq!(DateStrategy::DayMonthName.parse("04-Jun-2025"), Some(june(4)));
    }
}
