//! Inclusive calendar date range
//!
//! The single place where rental days are counted. Both bounds are part of
//! the rental: a range that starts and ends on the same day lasts one day.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// ISO 8601 calendar date format used across the engine (`YYYY-MM-DD`)
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// One-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Parse two ISO dates and build the range.
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of rental days, both bounds included.
    pub fn number_of_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Every date of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.number_of_days()).map(move |i| start + Duration::days(i))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_iso_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
        .map_err(|e| DomainError::Validation(format!("invalid date '{}': {}", value, e)))
}
