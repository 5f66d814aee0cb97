use crate::args::AddExpenseArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::format::currency;
use crate::model::{Expense, NewExpense};
use crate::{Config, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single expense, as returned by `add_expense` and `update_expense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseOut {
    pub expense: Expense,
}

/// Validates and stores a new expense.
///
/// The category is stored lowercase and the description is trimmed.
///
/// # Errors
/// - `Validation` if any field is invalid. Nothing is written in that case.
/// - `Database` if the insert fails.
pub async fn add_expense(config: Config, args: AddExpenseArgs) -> Result<Out<ExpenseOut>> {
    let new_expense = NewExpense::new(args.amount, &args.category, &args.description, &args.date)
        .pub_result(ErrorType::Validation)?;
    let expense = config
        .db()
        .insert_expense(&new_expense)
        .await
        .pub_result(ErrorType::Database)?;
    info!(
        "Added expense {}: {} for {} on {}",
        expense.id,
        currency(expense.amount),
        expense.category,
        expense.date
    );
    Ok(Out::new("Expense added successfully", ExpenseOut { expense }))
}
