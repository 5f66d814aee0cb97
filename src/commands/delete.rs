use crate::args::DeleteExpenseArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::format::currency;
use crate::model::Expense;
use crate::{Config, Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The last state of an expense that has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeletedExpense {
    pub deleted_expense: Expense,
}

/// Permanently deletes the expense with `id` and returns what it was. Ids are never reused.
///
/// # Errors
/// - `NotFound` if there is no expense with `id`.
/// - `Database` if the delete fails.
pub async fn delete_expense(config: Config, args: DeleteExpenseArgs) -> Result<Out<DeletedExpense>> {
    let id = args.id;
    let deleted_expense = config
        .db()
        .delete_expense(id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| Error::msg(ErrorType::NotFound, format!("Expense with ID {id} not found")))?;
    info!(
        "Deleted expense {id}: {} for {}",
        currency(deleted_expense.amount),
        deleted_expense.description
    );
    Ok(Out::new(
        "Expense deleted successfully",
        DeletedExpense { deleted_expense },
    ))
}
