//! Command handlers for the expenses CLI and MCP server.
//!
//! Each operation validates its arguments, talks to the database through `Config` and returns an
//! `Out` that both interfaces can render.

mod add;
mod delete;
mod init;
mod list;
mod mcp;
mod report;
mod update;

use crate::error::{ErrorType, IntoResult};
use crate::{Config, Error, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::str::FromStr;
use tracing::{debug, info};

pub use add::{add_expense, ExpenseOut};
pub use delete::{delete_expense, DeletedExpense};
pub use init::init;
pub use list::{export, export_to_csv, get_expenses, CsvExport, ExpenseList};
pub use mcp::mcp;
pub use report::{get_monthly_summary, get_spending_by_category, MonthlySummary};
pub use update::update_expense;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message with `info!` and prints the structured data, if any, as pretty JSON on
    /// stdout so that it can be piped to other programs.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => debug!("Unable to render command output as JSON: {e}"),
            }
        }
    }

    /// Renders the success shape of the wire protocol. The fields of `structure` are placed next
    /// to `success` and `message`:
    ///
    /// ```json
    /// { "success": true, "message": "Expense added successfully", "expense": { "id": 1 } }
    /// ```
    pub fn to_response(&self) -> Result<Value> {
        let mut response = Map::new();
        response.insert("success".into(), Value::Bool(true));
        response.insert("message".into(), Value::String(self.message.clone()));
        if let Some(structure) = self.structure() {
            let value = serde_json::to_value(structure)
                .context("Unable to serialize the response")
                .pub_result(ErrorType::Service)?;
            match value {
                Value::Object(fields) => response.extend(fields),
                Value::Null => {}
                other => {
                    response.insert("data".into(), other);
                }
            }
        }
        Ok(Value::Object(response))
    }
}

/// The operations that can be invoked by name, using the same names as the MCP tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddExpense,
    GetExpenses,
    GetSpendingByCategory,
    GetMonthlySummary,
    UpdateExpense,
    DeleteExpense,
    ExportToCsv,
}

serde_plain::derive_display_from_serialize!(Operation);
serde_plain::derive_fromstr_from_deserialize!(Operation);

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::AddExpense,
        Operation::GetExpenses,
        Operation::GetSpendingByCategory,
        Operation::GetMonthlySummary,
        Operation::UpdateExpense,
        Operation::DeleteExpense,
        Operation::ExportToCsv,
    ];
}

/// Invokes the operation named `operation` with JSON `arguments` and returns the wire response,
/// `{"success": true, ...}`. A `null` argument value is treated as an empty object.
///
/// # Errors
/// - `UnknownOperation` if `operation` does not name one of the operations.
/// - `Validation` if `arguments` does not have the shape the operation expects.
/// - Whatever the operation itself returns.
pub async fn call(config: Config, operation: &str, arguments: Value) -> Result<Value> {
    let op = Operation::from_str(operation).map_err(|_| {
        let known = Operation::ALL.map(|op| op.to_string()).join(", ");
        Error::msg(
            ErrorType::UnknownOperation,
            format!("Unknown operation '{operation}', expected one of: {known}"),
        )
    })?;
    debug!("Calling {op}");
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    match op {
        Operation::AddExpense => add_expense(config, parse(arguments)?).await?.to_response(),
        Operation::GetExpenses => get_expenses(config, parse(arguments)?).await?.to_response(),
        Operation::GetSpendingByCategory => get_spending_by_category(config, parse(arguments)?)
            .await?
            .to_response(),
        Operation::GetMonthlySummary => get_monthly_summary(config, parse(arguments)?)
            .await?
            .to_response(),
        Operation::UpdateExpense => update_expense(config, parse(arguments)?)
            .await?
            .to_response(),
        Operation::DeleteExpense => delete_expense(config, parse(arguments)?)
            .await?
            .to_response(),
        Operation::ExportToCsv => export_to_csv(config, parse(arguments)?)
            .await?
            .to_response(),
    }
}

/// Decodes the arguments of an operation. A type error names the field it occurred in, e.g.
/// `Invalid amount: invalid type: string "abc", expected f64`.
fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_path_to_error::deserialize(arguments).map_err(|e| {
        let path = e.path().to_string();
        let message = if path == "." {
            format!("Invalid arguments: {}", e.inner())
        } else {
            format!("Invalid {path}: {}", e.inner())
        };
        Error::msg(ErrorType::Validation, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use serde_json::json;

    #[test]
    fn test_out_to_response_merges_structure() {
        let out = Out::new("done", json!({"count": 2}));
        let response = out.to_response().unwrap();
        assert_eq!(response, json!({"success": true, "message": "done", "count": 2}));
    }

    #[test]
    fn test_out_message_only() {
        let out: Out<()> = "just a message".into();
        assert!(out.structure().is_none());
        assert_eq!(
            out.to_response().unwrap(),
            json!({"success": true, "message": "just a message"})
        );
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::ExportToCsv.to_string(), "export_to_csv");
        assert_eq!(
            Operation::from_str("get_spending_by_category").unwrap(),
            Operation::GetSpendingByCategory
        );
        assert!(Operation::from_str("drop_table").is_err());
    }

    #[tokio::test]
    async fn test_call_unknown_operation() {
        let env = TestEnv::new().await;
        let err = call(env.config(), "drop_table", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnknownOperation);
        assert!(err.to_string().contains("drop_table"));
        assert_eq!(err.to_response()["success"], false);
    }

    #[tokio::test]
    async fn test_call_add_then_list() {
        let env = TestEnv::new().await;
        let added = call(
            env.config(),
            "add_expense",
            json!({"amount": 12.5, "category": "Food", "description": "Lunch", "date": "2024-11-03"}),
        )
        .await
        .unwrap();
        assert_eq!(added["success"], true);
        assert_eq!(added["message"], "Expense added successfully");
        assert_eq!(added["expense"]["category"], "food");

        let listed = call(env.config(), "get_expenses", Value::Null).await.unwrap();
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["expenses"][0]["description"], "Lunch");
    }

    #[tokio::test]
    async fn test_call_wrong_type_names_the_field() {
        let env = TestEnv::new().await;
        let cases = [
            (
                "add_expense",
                json!({"amount": "abc", "category": "food", "description": "Lunch", "date": "2024-11-03"}),
                "Invalid amount",
            ),
            ("get_expenses", json!({"limit": "ten"}), "Invalid limit"),
            ("update_expense", json!({"id": 1, "amount": "x"}), "Invalid amount"),
            ("get_monthly_summary", json!({"year": "2024", "month": 1}), "Invalid year"),
        ];
        for (operation, arguments, expected) in cases {
            let err = call(env.config(), operation, arguments).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
            assert!(err.to_string().starts_with(expected), "{operation}: {err}");
        }
        assert_eq!(env.config().db().count_expenses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_call_missing_argument_is_validation_error() {
        let env = TestEnv::new().await;
        let err = call(env.config(), "get_monthly_summary", json!({"year": 2024}))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("month"), "{err}");
    }
}
