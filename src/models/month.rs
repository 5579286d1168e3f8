//! Calendar month and month interval types.
//!
//! All coverage arithmetic in the engine happens at calendar-month
//! granularity. A [`CanonicalMonth`] is a (year, month) pair ordered
//! chronologically, and a [`MonthInterval`] is an inclusive range of them
//! whose start never follows its end.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month.
///
/// Displays as `MM/YYYY` and serializes as `YYYY-MM`.
///
/// # Example
///
/// ```
/// use eligibility_engine::models::CanonicalMonth;
///
/// let month = CanonicalMonth::new(2024, 12).unwrap();
/// assert_eq!(month.to_string(), "12/2024");
/// assert_eq!(month.succ(), CanonicalMonth::new(2025, 1).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalMonth {
    year: i32,
    month: u32,
}

impl CanonicalMonth {
    /// Creates a month, returning `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current calendar month (UTC).
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1..=12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Months elapsed from `self` to `later` (negative if `later` precedes `self`).
    pub fn months_until(&self, later: &CanonicalMonth) -> i64 {
        later.ordinal() - self.ordinal()
    }

    /// Returns true when `next` is the month right after `self`.
    pub fn is_followed_by(&self, next: &CanonicalMonth) -> bool {
        self.months_until(next) == 1
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for CanonicalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for CanonicalMonth {
    type Err = EngineError;

    /// Parses the ISO `YYYY-MM` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::DateParse {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for CanonicalMonth {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalMonth> for String {
    fn from(month: CanonicalMonth) -> Self {
        format!("{:04}-{:02}", month.year, month.month)
    }
}

/// An inclusive range of calendar months.
///
/// The constructor rejects intervals whose end precedes their start, so every
/// value of this type satisfies `start <= end`. A single-month interval
/// (`start == end`) covers exactly one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthInterval {
    start: CanonicalMonth,
    end: CanonicalMonth,
}

impl MonthInterval {
    /// Creates an interval, failing with [`EngineError::InvalidInterval`]
    /// when `end < start`.
    pub fn new(start: CanonicalMonth, end: CanonicalMonth) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A one-month interval.
    pub fn single(month: CanonicalMonth) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    /// First month covered.
    pub fn start(&self) -> CanonicalMonth {
        self.start
    }

    /// Last month covered.
    pub fn end(&self) -> CanonicalMonth {
        self.end
    }

    /// Number of months covered (always at least 1).
    pub fn len_months(&self) -> u32 {
        (self.start.months_until(&self.end) + 1) as u32
    }

    /// Returns true if `month` falls within the interval.
    pub fn contains(&self, month: CanonicalMonth) -> bool {
        self.start <= month && month <= self.end
    }
}

impl fmt::Display for MonthInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}
