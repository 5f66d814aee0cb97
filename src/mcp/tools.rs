//! The expense operations exposed as MCP tools.

use crate::args::{
    AddExpenseArgs, DeleteExpenseArgs, ExportToCsvArgs, GetExpensesArgs, MonthlySummaryArgs,
    SpendingByCategoryArgs, UpdateExpenseArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::ExpenseServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl ExpenseServer {
    /// Add a new expense.
    ///
    /// # Parameters
    ///
    /// - `amount`: A positive number.
    /// - `category`: One of food, transport, entertainment, bills, shopping, health, education,
    ///   travel, savings, other. Case-insensitive, stored lowercase.
    /// - `description`: A non-empty description. Surrounding whitespace is removed.
    /// - `date`: The day of the expense as `YYYY-MM-DD`.
    ///
    /// Returns the stored expense, including its new `id` and `created_at`.
    #[tool]
    async fn add_expense(
        &self,
        Parameters(args): Parameters<AddExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: add_expense called");
        let config = (*self.config).clone();
        tool_result(commands::add_expense(config, args).await)
    }

    /// List expenses, most recent first (by date, then by id). All filters are optional and are
    /// combined: `startDate` and `endDate` are inclusive `YYYY-MM-DD` bounds, `category` selects a
    /// single category and `limit` (1 to 1000, default 100) caps the number of results.
    #[tool]
    async fn get_expenses(
        &self,
        Parameters(args): Parameters<GetExpensesArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: get_expenses called");
        let config = (*self.config).clone();
        tool_result(commands::get_expenses(config, args).await)
    }

    /// Break spending down by category between the optional inclusive `startDate` and `endDate`.
    ///
    /// Each category reports its transaction count, total, average, minimum, maximum and its
    /// percentage of `total_spending`. Categories are ordered by total, largest first.
    #[tool]
    async fn get_spending_by_category(
        &self,
        Parameters(args): Parameters<SpendingByCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: get_spending_by_category called");
        let config = (*self.config).clone();
        tool_result(commands::get_spending_by_category(config, args).await)
    }

    /// Summarize one month (`year` 2000 to 2100, `month` 1 to 12): overall totals, a category
    /// breakdown ordered by total, and spending per day in chronological order. A month with no
    /// expenses returns zeros and empty lists.
    #[tool]
    async fn get_monthly_summary(
        &self,
        Parameters(args): Parameters<MonthlySummaryArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: get_monthly_summary called");
        let config = (*self.config).clone();
        tool_result(commands::get_monthly_summary(config, args).await)
    }

    /// Update an existing expense by `id`. Only the fields you supply are changed; at least one of
    /// `amount`, `category`, `description` or `date` is required. The same rules as `add_expense`
    /// apply to each field.
    #[tool]
    async fn update_expense(
        &self,
        Parameters(args): Parameters<UpdateExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: update_expense called");
        let config = (*self.config).clone();
        tool_result(commands::update_expense(config, args).await)
    }

    /// Permanently delete the expense with `id`. Returns the deleted expense. This cannot be
    /// undone, so confirm with the user first.
    #[tool]
    async fn delete_expense(
        &self,
        Parameters(args): Parameters<DeleteExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: delete_expense called");
        let config = (*self.config).clone();
        tool_result(commands::delete_expense(config, args).await)
    }

    /// Export expenses as CSV text with the header `id,amount,category,description,date,created_at`.
    /// Takes the same optional filters as `get_expenses` but is not limited to 100 rows.
    #[tool]
    async fn export_to_csv(
        &self,
        Parameters(args): Parameters<ExportToCsvArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: export_to_csv called");
        let config = (*self.config).clone();
        tool_result(commands::export_to_csv(config, args).await)
    }
}
