//! Builds the `WHERE`, `ORDER BY` and `LIMIT` clauses for reading expenses.

use crate::model::{validate, Category, Expense, ExpenseDate};
use anyhow::Result;
use sqlx::{QueryBuilder, Sqlite};

/// The number of rows returned by a listing when the caller does not ask for a limit.
pub(crate) const DEFAULT_LIMIT: u32 = 100;

/// The limit used by exports, large enough to mean "everything" in practice.
pub(crate) const EXPORT_LIMIT: u32 = 10_000;

/// A conjunction of optional filter terms over the `expenses` table.
///
/// An expense matches when every supplied term matches:
/// - `date >= start_date`
/// - `date <= end_date`
/// - `category == category`
///
/// Results are ordered most recent first (`date DESC, id DESC`) and then truncated to `limit`.
/// A filter with no limit returns every matching row.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExpenseFilter {
    start_date: Option<ExpenseDate>,
    end_date: Option<ExpenseDate>,
    category: Option<Category>,
    limit: Option<u32>,
}

impl ExpenseFilter {
    /// Validates each supplied term. An invalid term is an error naming the field, it is never
    /// silently dropped.
    pub(crate) fn new(
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            start_date: start_date
                .map(|d| validate::date("startDate", d))
                .transpose()?,
            end_date: end_date.map(|d| validate::date("endDate", d)).transpose()?,
            category: category
                .map(|c| validate::category("category", c))
                .transpose()?,
            limit: None,
        })
    }

    /// A filter covering the inclusive date range `start..=end`.
    pub(crate) fn between(start: ExpenseDate, end: ExpenseDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    pub(crate) fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluates the filter terms against an in-memory expense. The limit does not apply.
    pub(crate) fn matches(&self, expense: &Expense) -> bool {
        self.start_date.map_or(true, |start| expense.date >= start)
            && self.end_date.map_or(true, |end| expense.date <= end)
            && self.category.map_or(true, |c| expense.category == c)
    }

    /// Appends the filter, ordering and limit to a `SELECT` over `expenses`. All values are bound
    /// as parameters.
    pub(super) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut conjunction = " WHERE ";
        if let Some(start) = self.start_date {
            qb.push(conjunction)
                .push("date >= ")
                .push_bind(start.to_string());
            conjunction = " AND ";
        }
        if let Some(end) = self.end_date {
            qb.push(conjunction).push("date <= ").push_bind(end.to_string());
            conjunction = " AND ";
        }
        if let Some(category) = self.category {
            qb.push(conjunction)
                .push("category = ")
                .push_bind(category.as_str());
        }
        qb.push(" ORDER BY date DESC, id DESC");
        if let Some(limit) = self.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
    }
}
