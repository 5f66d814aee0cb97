use crate::model::{validate, Category, ExpenseDate};
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single expense as stored in the `expenses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Expense {
    /// Unique identifier assigned by the database when the expense is added. Never reused.
    pub id: i64,
    /// The amount spent. Always positive.
    pub amount: f64,
    /// The spending category, lowercase.
    pub category: Category,
    /// What the money was spent on.
    pub description: String,
    /// The day the money was spent, `YYYY-MM-DD`.
    #[schemars(with = "String")]
    pub date: ExpenseDate,
    /// When the record was created, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created_at: String,
}

/// A validated, normalized expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub(crate) amount: f64,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) date: ExpenseDate,
}

impl NewExpense {
    /// Validates each field, lowercases the category and trims the description.
    pub fn new(amount: f64, category: &str, description: &str, date: &str) -> Result<Self> {
        Ok(Self {
            amount: validate::amount("amount", amount)?,
            category: validate::category("category", category)?,
            description: validate::description("description", description)?,
            date: validate::date("date", date)?,
        })
    }
}

/// Represents the fields of an expense that can be changed by an update. Only fields that are
/// present are changed; absent fields keep their current value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseUpdates {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl ExpenseUpdates {
    /// Validates and normalizes every supplied field.
    pub fn validate(&self) -> Result<ExpenseChanges> {
        Ok(ExpenseChanges {
            amount: self
                .amount
                .map(|a| validate::amount("amount", a))
                .transpose()?,
            category: self
                .category
                .as_deref()
                .map(|c| validate::category("category", c))
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(|d| validate::description("description", d))
                .transpose()?,
            date: self
                .date
                .as_deref()
                .map(|d| validate::date("date", d))
                .transpose()?,
        })
    }
}

/// Validated field changes ready to be written to the database.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseChanges {
    pub(crate) amount: Option<f64>,
    pub(crate) category: Option<Category>,
    pub(crate) description: Option<String>,
    pub(crate) date: Option<ExpenseDate>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_expense_normalizes() {
        let expense = NewExpense::new(12.5, "FOOD", "  Lunch with Sam ", "2024-11-03").unwrap();
        assert_eq!(expense.category, Category::Food);
        assert_eq!(expense.description, "Lunch with Sam");
        assert_eq!(expense.date.to_string(), "2024-11-03");
    }

    #[test]
    fn new_expense_names_bad_field() {
        let err = NewExpense::new(0.0, "food", "x", "2024-11-03").unwrap_err();
        assert!(err.to_string().contains("Invalid amount"));
        let err = NewExpense::new(1.0, "snacks", "x", "2024-11-03").unwrap_err();
        assert!(err.to_string().contains("Invalid category"));
        let err = NewExpense::new(1.0, "food", " ", "2024-11-03").unwrap_err();
        assert!(err.to_string().contains("Invalid description"));
        let err = NewExpense::new(1.0, "food", "x", "2024-02-30").unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn updates_validate_only_present_fields() {
        let updates = ExpenseUpdates {
            amount: Some(30.0),
            ..Default::default()
        };
        let changes = updates.validate().unwrap();
        assert_eq!(changes.amount, Some(30.0));
        assert!(changes.category.is_none());
        assert!(!changes.is_empty());

        assert!(ExpenseUpdates::default().validate().unwrap().is_empty());

        let updates = ExpenseUpdates {
            category: Some("Travel".into()),
            date: Some("2024-13-01".into()),
            ..Default::default()
        };
        let err = updates.validate().unwrap_err().to_string();
        assert!(err.contains("Invalid date"), "{err}");
    }
}
