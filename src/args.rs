//! These structs provide the CLI interface for the expenses CLI. The per-operation argument
//! structs double as the parameter types of the MCP tools, so their doc comments end up in both
//! `--help` and the tools' JSON schemas.

use crate::model::{Category, ExpenseUpdates};
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A personal expense tracker.
///
/// Expenses are stored in a local SQLite database. You can add, list, update, delete, summarize
/// and export them from the command line, or let an AI agent, like Claude, do so through the mcp
/// subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, its config file and an empty expenses database.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses. Pass --expenses-home (or set EXPENSES_HOME) to put it somewhere else.
    Init(InitArgs),
    /// Run an MCP server over stdio so that an AI agent can manage your expenses.
    Mcp(McpArgs),
    /// Add a new expense.
    Add(AddExpenseArgs),
    /// List expenses, most recent first.
    List(GetExpensesArgs),
    /// Show spending grouped by category.
    ByCategory(SpendingByCategoryArgs),
    /// Show a summary of one month: totals, categories and daily spending.
    Monthly(MonthlySummaryArgs),
    /// Change some fields of an existing expense.
    Update(UpdateExpenseArgs),
    /// Permanently delete an expense.
    Delete(DeleteExpenseArgs),
    /// Export expenses as CSV.
    Export(ExportArgs),
    /// Invoke an operation by its MCP tool name with JSON arguments, e.g.
    /// `expenses call get_expenses '{"limit": 5}'`.
    Call(CallArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the config file and database are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// (Not shown): Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to create the SQLite database. Relative paths are relative to the home directory.
    /// Defaults to expenses.sqlite.
    #[arg(long)]
    sqlite_path: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(sqlite_path: Option<PathBuf>) -> Self {
        Self { sqlite_path }
    }

    pub fn sqlite_path(&self) -> Option<&Path> {
        self.sqlite_path.as_deref()
    }
}

/// (Not shown): Args for the `expenses mcp` command.
#[derive(Debug, Parser, Clone)]
pub struct McpArgs {}

/// Arguments for adding an expense.
#[derive(Debug, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AddExpenseArgs {
    /// The amount spent. Must be a positive number.
    #[arg(long, allow_negative_numbers = true)]
    pub amount: f64,

    /// The spending category. One of: food, transport, entertainment, bills, shopping, health,
    /// education, travel, savings, other (case-insensitive).
    #[arg(long)]
    #[schemars(with = "Category")]
    pub category: String,

    /// What the money was spent on. Must not be empty.
    #[arg(long)]
    pub description: String,

    /// The day the money was spent, in YYYY-MM-DD format.
    #[arg(long)]
    pub date: String,
}

/// Arguments for listing expenses. All filters are optional and combined with AND.
#[derive(Debug, Default, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetExpensesArgs {
    /// Only include expenses on or after this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Only include expenses on or before this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Only include expenses in this category.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Category>")]
    pub category: Option<String>,

    /// The maximum number of expenses to return, between 1 and 1000. Defaults to 100.
    #[arg(long, allow_negative_numbers = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Arguments for the spending-by-category report. Both dates are optional.
#[derive(Debug, Default, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendingByCategoryArgs {
    /// Only include expenses on or after this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Only include expenses on or before this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Arguments for the monthly summary.
#[derive(Debug, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySummaryArgs {
    /// The year, between 2000 and 2100.
    #[arg(long)]
    pub year: i32,

    /// The month, between 1 (January) and 12 (December).
    #[arg(long, allow_negative_numbers = true)]
    pub month: i32,
}

/// Arguments for updating an expense. Only the supplied fields are changed.
#[derive(Debug, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateExpenseArgs {
    /// The ID of the expense to update.
    #[arg(long)]
    pub id: i64,

    /// New amount. Must be a positive number.
    #[arg(long, allow_negative_numbers = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    /// New category. One of: food, transport, entertainment, bills, shopping, health, education,
    /// travel, savings, other (case-insensitive).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Category>")]
    pub category: Option<String>,

    /// New description. Must not be empty.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New date in YYYY-MM-DD format.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl UpdateExpenseArgs {
    pub fn new(id: i64, updates: ExpenseUpdates) -> Self {
        let ExpenseUpdates {
            amount,
            category,
            description,
            date,
        } = updates;
        Self {
            id,
            amount,
            category,
            description,
            date,
        }
    }

    /// The requested field changes, without the id.
    pub fn updates(&self) -> ExpenseUpdates {
        ExpenseUpdates {
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
        }
    }
}

/// Arguments for deleting an expense.
#[derive(Debug, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DeleteExpenseArgs {
    /// The ID of the expense to delete.
    #[arg(long)]
    pub id: i64,
}

/// Arguments for exporting expenses to CSV. All filters are optional and combined with AND.
#[derive(Debug, Default, Clone, PartialEq, Parser, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportToCsvArgs {
    /// Only include expenses on or after this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Only include expenses on or before this date (YYYY-MM-DD).
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Only include expenses in this category.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Category>")]
    pub category: Option<String>,
}

/// (Not shown): Args for the `expenses export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    filter: ExportToCsvArgs,

    /// Write the CSV to this file instead of printing it.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(filter: ExportToCsvArgs, output: Option<PathBuf>) -> Self {
        Self { filter, output }
    }

    pub fn filter(&self) -> &ExportToCsvArgs {
        &self.filter
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// (Not shown): Args for the `expenses call` command.
#[derive(Debug, Parser, Clone)]
pub struct CallArgs {
    /// The operation name, e.g. add_expense or get_monthly_summary.
    operation: String,

    /// The operation's arguments as a JSON object.
    #[arg(default_value = "{}")]
    arguments: String,
}

impl CallArgs {
    pub fn new(operation: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            arguments: arguments.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let args = Args::try_parse_from([
            "expenses",
            "--expenses-home",
            "/tmp/x",
            "add",
            "--amount",
            "12.5",
            "--category",
            "Food",
            "--description",
            "Lunch",
            "--date",
            "2024-11-03",
        ])
        .unwrap();
        assert_eq!(args.common().expenses_home().path(), Path::new("/tmp/x"));
        let Command::Add(add) = args.command() else {
            panic!("expected the add command, got {:?}", args.command());
        };
        assert_eq!(add.amount, 12.5);
        assert_eq!(add.category, "Food");
    }

    #[test]
    fn parse_update_command_with_partial_fields() {
        let args =
            Args::try_parse_from(["expenses", "update", "--id", "4", "--amount", "30"]).unwrap();
        let Command::Update(update) = args.command() else {
            panic!("expected the update command, got {:?}", args.command());
        };
        assert_eq!(update.id, 4);
        assert_eq!(update.amount, Some(30.0));
        assert!(update.description.is_none());
    }

    #[test]
    fn list_args_use_camel_case_on_the_wire() {
        let args: GetExpensesArgs =
            serde_json::from_str(r#"{"startDate": "2024-11-01", "limit": 5}"#).unwrap();
        assert_eq!(args.start_date.as_deref(), Some("2024-11-01"));
        assert_eq!(args.limit, Some(5));
        assert!(args.end_date.is_none());
    }

    #[test]
    fn update_args_are_sparse_on_the_wire() {
        let args: UpdateExpenseArgs =
            serde_json::from_str(r#"{"id": 3, "category": "Travel"}"#).unwrap();
        assert_eq!(args.id, 3);
        assert_eq!(args.category.as_deref(), Some("Travel"));
        assert!(args.updates().amount.is_none());
    }

    #[test]
    fn category_schema_lists_allowed_values() {
        let schema = serde_json::to_string(&schemars::schema_for!(AddExpenseArgs)).unwrap();
        assert!(schema.contains("entertainment"), "{schema}");
    }
}
