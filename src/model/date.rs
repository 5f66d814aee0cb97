//! Calendar date type for expenses.
//!
//! This module provides the `ExpenseDate` type which wraps `NaiveDate` and only accepts the exact
//! `YYYY-MM-DD` form. Lenient inputs such as `2024-1-5` or impossible dates such as `2024-02-30`
//! are rejected rather than normalized.

use anyhow::{bail, Context};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const FORMAT: &str = "%Y-%m-%d";

/// A real calendar date written as `YYYY-MM-DD`.
///
/// ```
/// # use expense_tracker::model::ExpenseDate;
/// # use std::str::FromStr;
/// let date = ExpenseDate::from_str("2024-02-29").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
/// assert!(ExpenseDate::from_str("2023-02-29").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseDate(NaiveDate);

impl ExpenseDate {
    /// Returns the first and last day of the given month, or `None` if `year`/`month` do not form
    /// a valid month.
    pub fn month_bounds(year: i32, month: u32) -> Option<(ExpenseDate, ExpenseDate)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some((Self(first), Self(last)))
    }
}

/// Checks the `DDDD-DD-DD` shape with literal hyphens.
fn has_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(ix, b)| match ix {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl FromStr for ExpenseDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !has_date_shape(s) {
            bail!("'{s}' is not in YYYY-MM-DD format");
        }
        let date = NaiveDate::parse_from_str(s, FORMAT)
            .with_context(|| format!("'{s}' is not a real calendar date"))?;
        // The parser is more forgiving than the shape check, so insist on an exact round trip.
        if date.format(FORMAT).to_string() != s {
            bail!("'{s}' is not a real calendar date");
        }
        Ok(Self(date))
    }
}

impl Display for ExpenseDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl Serialize for ExpenseDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExpenseDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ExpenseDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}
