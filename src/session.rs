//! Half-day session model.
//!
//! Leave exports spell sessions inconsistently (`First Session`,
//! `first  session`, `FIRST_SESSION`). Input is title-cased with `heck` before
//! matching so every spelling resolves to the same [`Session`] variant.

use std::{fmt, str::FromStr};

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};

use crate::error::SessionParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Session {
    FirstSession,
    SecondSession,
}

impl Session {
    pub fn label(self) -> &'static str {
        match self {
            Session::FirstSession => "First Session",
            Session::SecondSession => "Second Session",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Session {
    type Err = SessionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SessionParseError::Empty);
        }
        match trimmed.to_title_case().as_str() {
            "First Session" | "First" | "First Half" => Ok(Session::FirstSession),
            "Second Session" | "Second" | "Second Half" => Ok(Session::SecondSession),
            _ => Err(SessionParseError::Unknown(trimmed.to_string())),
        }
    }
}

/// The `(from, to)` sessions of a single leave row.
///
/// Rows produced by the normalizer only ever carry `FirstOnly`, `SecondOnly`
/// or `FullDay`. `Overnight` exists because raw requests may start in the
/// afternoon and end in the morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPair {
    FirstOnly,
    SecondOnly,
    FullDay,
    Overnight,
}

impl SessionPair {
    pub fn of(from: Session, to: Session) -> Self {
        match (from, to) {
            (Session::FirstSession, Session::FirstSession) => SessionPair::FirstOnly,
            (Session::SecondSession, Session::SecondSession) => SessionPair::SecondOnly,
            (Session::FirstSession, Session::SecondSession) => SessionPair::FullDay,
            (Session::SecondSession, Session::FirstSession) => SessionPair::Overnight,
        }
    }

    pub fn sessions(self) -> (Session, Session) {
        match self {
            SessionPair::FirstOnly => (Session::FirstSession, Session::FirstSession),
            SessionPair::SecondOnly => (Session::SecondSession, Session::SecondSession),
            SessionPair::FullDay => (Session::FirstSession, Session::SecondSession),
            SessionPair::Overnight => (Session::SecondSession, Session::FirstSession),
        }
    }
}
