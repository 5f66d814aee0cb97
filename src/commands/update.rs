//! Update command handler.

use crate::args::UpdateExpenseArgs;
use crate::commands::{ExpenseOut, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Error, Result};
use tracing::info;

/// Changes the supplied fields of the expense with `id`. Fields that are not supplied keep their
/// current value. The category and description are normalized the same way as in `add_expense`.
///
/// The checks are made in this order, and nothing is written unless all of them pass:
/// 1. at least one field is supplied
/// 2. every supplied field is valid
/// 3. the expense exists
///
/// # Errors
/// - `EmptyUpdate` if no field other than `id` is supplied.
/// - `Validation` if a supplied field is invalid.
/// - `NotFound` if there is no expense with `id`.
/// - `Database` if the update fails.
pub async fn update_expense(config: Config, args: UpdateExpenseArgs) -> Result<Out<ExpenseOut>> {
    let id = args.id;
    let changes = args.updates().validate().pub_result(ErrorType::Validation)?;
    if changes.is_empty() {
        return Err(Error::msg(ErrorType::EmptyUpdate, "No fields to update"));
    }

    let expense = config
        .db()
        .update_expense(id, &changes)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| Error::msg(ErrorType::NotFound, format!("Expense with ID {id} not found")))?;
    info!("Updated expense {id}");
    Ok(Out::new("Expense updated successfully", ExpenseOut { expense }))
}
