//! Field-level validation for expense data.
//!
//! The `*_is_valid` predicates answer yes or no. The other functions validate and normalize a
//! single named field, returning an error that names the field and the expected constraint.

use crate::model::{Category, ExpenseDate};
use anyhow::{bail, Result};
use std::str::FromStr;

/// True if `amount` is a finite number strictly greater than zero.
pub fn amount_is_valid(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// True if `date` is exactly `YYYY-MM-DD` and denotes a real calendar date.
pub fn date_is_valid(date: &str) -> bool {
    ExpenseDate::from_str(date).is_ok()
}

/// True if the lowercased `category` is one of the known categories.
pub fn category_is_valid(category: &str) -> bool {
    Category::from_str(category).is_ok()
}

pub(crate) fn amount(field: &str, amount: f64) -> Result<f64> {
    if !amount_is_valid(amount) {
        bail!("Invalid {field}: must be a positive number, got {amount}");
    }
    Ok(amount)
}

pub(crate) fn date(field: &str, date: &str) -> Result<ExpenseDate> {
    match ExpenseDate::from_str(date) {
        Ok(date) => Ok(date),
        Err(e) => bail!("Invalid {field}: expected a real date in YYYY-MM-DD format, {e}"),
    }
}

pub(crate) fn category(field: &str, category: &str) -> Result<Category> {
    match Category::from_str(category) {
        Ok(category) => Ok(category),
        Err(e) => bail!("Invalid {field}: {e}"),
    }
}

/// Trims the description and rejects it if nothing is left.
pub(crate) fn description(field: &str, description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        bail!("Invalid {field}: must not be empty");
    }
    Ok(trimmed.to_string())
}

/// Checks that `value` lies in `min..=max`.
pub(crate) fn in_range(field: &str, value: i64, min: i64, max: i64) -> Result<i64> {
    if value < min || value > max {
        bail!("Invalid {field}: must be between {min} and {max}, got {value}");
    }
    Ok(value)
}
