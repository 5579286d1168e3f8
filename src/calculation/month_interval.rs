//! Date parsing and month interval arithmetic.
//!
//! This module parses the date formats found in scraped employment records
//! into [`CanonicalMonth`] values and provides the interval operations the
//! coverage builder relies on: normalization of open-ended links, sort-and-merge,
//! intersection and month enumeration.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{CanonicalMonth, MonthInterval};

const PORTUGUESE_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Parses a date string into the calendar month it falls in.
///
/// Accepted forms:
/// - `MM/YYYY` (`03/2024`)
/// - abbreviated Portuguese month and two- or four-digit year (`mar/24`, `dez/2023`)
/// - `DD/MM/YYYY`
/// - compact `YYYYMM` (`202403`)
/// - ISO `YYYY-MM` and `YYYY-MM-DD`
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::parse_month;
/// use eligibility_engine::models::CanonicalMonth;
///
/// let march = CanonicalMonth::new(2024, 3).unwrap();
/// assert_eq!(parse_month("03/2024").unwrap(), march);
/// assert_eq!(parse_month("mar/24").unwrap(), march);
/// assert_eq!(parse_month("202403").unwrap(), march);
/// assert_eq!(parse_month("2024-03-15").unwrap(), march);
/// assert!(parse_month("2024/13").is_err());
/// ```
pub fn parse_month(value: &str) -> EngineResult<CanonicalMonth> {
    let trimmed = value.trim();
    let invalid = || EngineError::DateParse {
        value: value.to_string(),
    };

    if trimmed.contains('/') {
        let parts: Vec<&str> = trimmed.split('/').collect();
        return match parts.as_slice() {
            [month, year] => parse_slash_month(month, year).ok_or_else(invalid),
            [_, _, _] => NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
                .map(CanonicalMonth::from_date)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        };
    }

    if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = trimmed[..4].parse().map_err(|_| invalid())?;
        let month: u32 = trimmed[4..].parse().map_err(|_| invalid())?;
        return CanonicalMonth::new(year, month).ok_or_else(invalid);
    }

    if trimmed.len() == 10 {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(CanonicalMonth::from_date)
            .map_err(|_| invalid());
    }

    trimmed.parse::<CanonicalMonth>().map_err(|_| invalid())
}

fn parse_slash_month(month: &str, year: &str) -> Option<CanonicalMonth> {
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let month_number = if month.chars().all(|c| c.is_ascii_digit()) && !month.is_empty() {
        if year.len() != 4 || month.len() > 2 {
            return None;
        }
        month.parse::<u32>().ok()?
    } else {
        let lower = month.to_lowercase();
        PORTUGUESE_MONTHS.iter().position(|abbr| *abbr == lower)? as u32 + 1
    };

    let year_number: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    CanonicalMonth::new(year_number, month_number)
}

/// Resolves a raw start/end pair into a month interval.
///
/// A missing or blank `end` denotes an ongoing link and resolves to
/// `reference_month`, the month the computation is processing. A closed end
/// after `reference_month` is clipped to it: months not yet worked are never
/// part of the interval. Fails with [`EngineError::DateParse`] for
/// unparseable dates and [`EngineError::InvalidInterval`] when the end
/// precedes the start (including a link starting after the reference month).
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::normalize_interval;
/// use eligibility_engine::models::CanonicalMonth;
///
/// let now = CanonicalMonth::new(2024, 6).unwrap();
/// let interval = normalize_interval("01/2024", None, now).unwrap();
/// assert_eq!(interval.end(), now);
/// assert_eq!(interval.len_months(), 6);
/// ```
pub fn normalize_interval(
    start: &str,
    end: Option<&str>,
    reference_month: CanonicalMonth,
) -> EngineResult<MonthInterval> {
    let start_month = parse_month(start)?;
    let end_month = match end.map(str::trim).filter(|e| !e.is_empty()) {
        Some(end) => parse_month(end)?.min(reference_month),
        None => reference_month,
    };
    MonthInterval::new(start_month, end_month)
}

/// Merges intervals into the minimal sorted set of disjoint intervals
/// covering the same months.
///
/// Overlapping and directly adjacent intervals (one ending the month before
/// the other starts) are combined. Merging an already-merged set returns it
/// unchanged.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::merge_intervals;
/// use eligibility_engine::models::{CanonicalMonth, MonthInterval};
///
/// let m = |y, mo| CanonicalMonth::new(y, mo).unwrap();
/// let merged = merge_intervals(&[
///     MonthInterval::new(m(2024, 4), m(2024, 6)).unwrap(),
///     MonthInterval::new(m(2024, 1), m(2024, 3)).unwrap(),
///     MonthInterval::new(m(2024, 9), m(2024, 9)).unwrap(),
/// ]);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0], MonthInterval::new(m(2024, 1), m(2024, 6)).unwrap());
/// ```
pub fn merge_intervals(intervals: &[MonthInterval]) -> Vec<MonthInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort();

    let mut merged: Vec<MonthInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last)
                if interval.start() <= last.end() || last.end().is_followed_by(&interval.start()) =>
            {
                if interval.end() > last.end() {
                    // Bounds are ordered, so this cannot fail.
                    *last = MonthInterval::new(last.start(), interval.end()).unwrap_or(*last);
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// The months shared by two intervals, if any.
pub fn intersect(a: &MonthInterval, b: &MonthInterval) -> Option<MonthInterval> {
    let start = a.start().max(b.start());
    let end = a.end().min(b.end());
    MonthInterval::new(start, end).ok()
}

/// Enumerates the months of an interval in chronological order.
///
/// The iterator is finite and cheap to clone; calling `months_in` again on
/// the same interval restarts the enumeration.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::months_in;
/// use eligibility_engine::models::{CanonicalMonth, MonthInterval};
///
/// let m = |y, mo| CanonicalMonth::new(y, mo).unwrap();
/// let interval = MonthInterval::new(m(2023, 11), m(2024, 2)).unwrap();
/// let months: Vec<String> = months_in(&interval).map(|m| m.to_string()).collect();
/// assert_eq!(months, ["11/2023", "12/2023", "01/2024", "02/2024"]);
/// ```
pub fn months_in(interval: &MonthInterval) -> MonthIter {
    MonthIter {
        next: Some(interval.start()),
        end: interval.end(),
    }
}

/// Iterator over the months of a [`MonthInterval`].
#[derive(Debug, Clone)]
pub struct MonthIter {
    next: Option<CanonicalMonth>,
    end: CanonicalMonth,
}

impl Iterator for MonthIter {
    type Item = CanonicalMonth;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = (current < self.end).then(|| current.succ());
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|next| (next.months_until(&self.end) + 1).max(0) as usize)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthIter {}
