use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::Deserialize;

use crate::error::StoreError;
use crate::models::Session;

/// Symbolic look-back window offered by the filter sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    All,
}

impl DateRange {
    pub const TOKENS: [&'static str; 5] = ["1 month", "3 months", "6 months", "1 year", "All"];

    pub fn token(self) -> &'static str {
        match self {
            DateRange::OneMonth => "1 month",
            DateRange::ThreeMonths => "3 months",
            DateRange::SixMonths => "6 months",
            DateRange::OneYear => "1 year",
            DateRange::All => "All",
        }
    }

    fn months(self) -> Option<u32> {
        match self {
            DateRange::OneMonth => Some(1),
            DateRange::ThreeMonths => Some(3),
            DateRange::SixMonths => Some(6),
            DateRange::OneYear => Some(12),
            DateRange::All => None,
        }
    }

    /// Lower bound for this range as seen from `today`.
    /// Day-of-month clamps to the end of the target month.
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        let months = self.months()?;
        Some(today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN))
    }

    fn closest_token(input: &str) -> Option<&'static str> {
        Self::TOKENS
            .iter()
            .map(|t| (*t, strsim::jaro_winkler(&input.to_lowercase(), &t.to_lowercase())))
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| t)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DateRange {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1 month" => Ok(DateRange::OneMonth),
            "3 months" => Ok(DateRange::ThreeMonths),
            "6 months" => Ok(DateRange::SixMonths),
            "1 year" => Ok(DateRange::OneYear),
            "All" | "" => Ok(DateRange::All),
            other => Err(StoreError::UnknownDateRange {
                token: other.to_string(),
                suggestion: Self::closest_token(other),
            }),
        }
    }
}

/// Session list query
/// Empty strings and a missing bound are inactive predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub location: String,
    pub game_type: String,
    pub since: Option<NaiveDate>,
}

impl SessionFilter {
    /// Build a filter, resolving the range token against `today`.
    pub fn resolve(
        location: impl Into<String>,
        game_type: impl Into<String>,
        range: DateRange,
        today: NaiveDate,
    ) -> Self {
        Self {
            location: location.into(),
            game_type: game_type.into(),
            since: range.resolve(today),
        }
    }

    pub fn matches(&self, session: &Session) -> bool {
        (self.location.is_empty() || session.location.contains(&self.location))
            && (self.game_type.is_empty() || session.game_type.contains(&self.game_type))
            && self.since.map_or(true, |since| session.date >= since)
    }

    /// Matching sessions, in input order.
    pub fn apply(&self, sessions: &[Session]) -> Vec<Session> {
        sessions.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

/// Query-string form of a filter, as sent by the client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub range: Option<String>,
}

impl FilterParams {
    pub fn into_filter(self, today: NaiveDate) -> Result<SessionFilter, StoreError> {
        let range = match self.range.as_deref() {
            Some(token) => token.parse()?,
            None => DateRange::All,
        };
        Ok(SessionFilter::resolve(self.location, self.game_type, range, today))
    }
}
