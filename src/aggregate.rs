//! Grouped statistics over a set of expenses.
//!
//! These functions are pure: they take the expenses that a filter selected and compute the
//! breakdowns used by the reporting operations.

use crate::model::{Category, Expense, ExpenseDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spending statistics for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryStats {
    pub category: Category,
    pub transaction_count: u64,
    pub total_amount: f64,
    pub average_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Share of the total spending, in percent, rounded to two decimal places.
    pub percentage: f64,
}

/// Per-category statistics ordered by total amount, largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryBreakdown {
    /// The sum of every matched expense.
    pub total_spending: f64,
    pub categories: Vec<CategoryStats>,
}

/// Overall statistics for a set of expenses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Totals {
    pub total_transactions: u64,
    pub total_spending: f64,
    pub average_transaction: f64,
}

/// Spending on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailySpending {
    #[schemars(with = "String")]
    pub date: ExpenseDate,
    pub transaction_count: u64,
    pub total_amount: f64,
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: u64,
    total: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(amount: f64) -> Self {
        Self {
            count: 1,
            total: amount,
            min: amount,
            max: amount,
        }
    }

    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.total += amount;
        self.min = self.min.min(amount);
        self.max = self.max.max(amount);
    }

    fn average(&self) -> f64 {
        self.total / self.count as f64
    }
}

/// Groups `expenses` by category.
///
/// Groups are ordered by total amount, descending. Groups with the same total keep the order in
/// which categories are declared. Percentages are rounded individually and are not adjusted to
/// add up to exactly 100. When the total is zero every percentage is 0.
pub fn category_breakdown(expenses: &[Expense]) -> CategoryBreakdown {
    let mut groups: BTreeMap<Category, Accumulator> = BTreeMap::new();
    for expense in expenses {
        groups
            .entry(expense.category)
            .and_modify(|acc| acc.add(expense.amount))
            .or_insert_with(|| Accumulator::new(expense.amount));
    }

    let total_spending: f64 = expenses.iter().map(|e| e.amount).sum();
    let mut categories: Vec<CategoryStats> = groups
        .into_iter()
        .map(|(category, acc)| CategoryStats {
            category,
            transaction_count: acc.count,
            total_amount: acc.total,
            average_amount: acc.average(),
            min_amount: acc.min,
            max_amount: acc.max,
            percentage: if total_spending > 0.0 {
                round2(acc.total / total_spending * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    categories.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));

    CategoryBreakdown {
        total_spending,
        categories,
    }
}

/// Computes count, sum and mean. The mean of no expenses is 0.
pub fn totals(expenses: &[Expense]) -> Totals {
    let total_transactions = expenses.len() as u64;
    let total_spending: f64 = expenses.iter().map(|e| e.amount).sum();
    let average_transaction = if total_transactions == 0 {
        0.0
    } else {
        total_spending / total_transactions as f64
    };
    Totals {
        total_transactions,
        total_spending,
        average_transaction,
    }
}

/// Groups `expenses` by date, earliest first.
pub fn daily_breakdown(expenses: &[Expense]) -> Vec<DailySpending> {
    let mut days: BTreeMap<ExpenseDate, (u64, f64)> = BTreeMap::new();
    for expense in expenses {
        let day = days.entry(expense.date).or_insert((0, 0.0));
        day.0 += 1;
        day.1 += expense.amount;
    }
    days.into_iter()
        .map(|(date, (transaction_count, total_amount))| DailySpending {
            date,
            transaction_count,
            total_amount,
        })
        .collect()
}
