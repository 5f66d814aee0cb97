//! Types that represent the core data model, such as `Expense` and `Category`.
mod category;
mod date;
mod expense;
pub mod validate;

pub use category::{Category, UnknownCategory};
pub use date::ExpenseDate;
pub use expense::{Expense, ExpenseChanges, ExpenseUpdates, NewExpense};
pub use validate::{amount_is_valid, category_is_valid, date_is_valid};
