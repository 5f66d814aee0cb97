//! Listing and exporting expenses.

use crate::args::{ExportArgs, ExportToCsvArgs, GetExpensesArgs};
use crate::commands::Out;
use crate::db::{ExpenseFilter, DEFAULT_LIMIT, EXPORT_LIMIT};
use crate::error::{ErrorType, IntoResult};
use crate::model::{validate, Expense};
use crate::{format, utils, Config, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The largest `limit` a caller may ask for when listing expenses.
const MAX_LIMIT: i64 = 1000;

/// The expenses that matched a listing, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseList {
    pub count: usize,
    pub expenses: Vec<Expense>,
}

/// The CSV rendering of the expenses that matched an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CsvExport {
    pub count: usize,
    pub csv: String,
}

/// Lists the expenses that match every supplied filter, most recent first (by date, then by id).
///
/// # Errors
/// - `Validation` if a filter term is invalid or `limit` is outside `1..=1000`.
/// - `Database` if the query fails.
pub async fn get_expenses(config: Config, args: GetExpensesArgs) -> Result<Out<ExpenseList>> {
    let filter = ExpenseFilter::new(
        args.start_date.as_deref(),
        args.end_date.as_deref(),
        args.category.as_deref(),
    )
    .pub_result(ErrorType::Validation)?;
    let limit = match args.limit {
        Some(limit) => validate::in_range("limit", limit, 1, MAX_LIMIT)
            .pub_result(ErrorType::Validation)? as u32,
        None => DEFAULT_LIMIT,
    };

    let expenses = config
        .db()
        .select_expenses(&filter.with_limit(limit))
        .await
        .pub_result(ErrorType::Database)?;
    let count = expenses.len();
    let message = format!(
        "Found {} expense{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, ExpenseList { count, expenses }))
}

/// Renders the expenses that match every supplied filter as CSV, most recent first.
///
/// The header row is `id,amount,category,description,date,created_at`. The description is always
/// wrapped in double quotes with inner double quotes doubled. At most 10,000 expenses are
/// exported.
///
/// # Errors
/// - `Validation` if a filter term is invalid.
/// - `Database` if the query fails.
pub async fn export_to_csv(config: Config, args: ExportToCsvArgs) -> Result<Out<CsvExport>> {
    let filter = ExpenseFilter::new(
        args.start_date.as_deref(),
        args.end_date.as_deref(),
        args.category.as_deref(),
    )
    .pub_result(ErrorType::Validation)?
    .with_limit(EXPORT_LIMIT);

    let expenses = config
        .db()
        .select_expenses(&filter)
        .await
        .pub_result(ErrorType::Database)?;
    let csv = format::to_csv(&expenses).pub_result(ErrorType::Service)?;
    let count = expenses.len();
    Ok(Out::new(
        format!("Exported {count} expenses to CSV"),
        CsvExport { count, csv },
    ))
}

/// Runs `export_to_csv` and, when an output path is given, writes the CSV there instead of
/// returning it.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<CsvExport>> {
    let out = export_to_csv(config, args.filter().clone()).await?;
    let Some(path) = args.output() else {
        return Ok(out);
    };
    let Some(export) = out.structure() else {
        return Ok(out);
    };
    utils::write(path, &export.csv)
        .await
        .pub_result(ErrorType::Service)?;
    info!("Wrote {} bytes of CSV", export.csv.len());
    Ok(Out::new_message(format!(
        "Exported {} expenses to {}",
        export.count,
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::path::PathBuf;

    async fn seeded() -> TestEnv {
        let env = TestEnv::new().await;
        env.add_expense(10.0, "food", "Breakfast", "2024-11-01").await;
        env.add_expense(20.0, "transport", "Taxi", "2024-11-02").await;
        env.add_expense(30.0, "food", "Dinner", "2024-11-02").await;
        env.add_expense(40.0, "bills", "Phone", "2024-10-15").await;
        env
    }

    #[tokio::test]
    async fn test_get_expenses_most_recent_first() {
        let env = seeded().await;
        let out = get_expenses(env.config(), GetExpensesArgs::default())
            .await
            .unwrap();
        let list = out.structure().unwrap();
        assert_eq!(list.count, 4);
        let descriptions: Vec<&str> = list
            .expenses
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Dinner", "Taxi", "Breakfast", "Phone"]);
        assert_eq!(out.message(), "Found 4 expenses");
    }

    #[tokio::test]
    async fn test_get_expenses_filters_and_limit() {
        let env = seeded().await;
        let args = GetExpensesArgs {
            start_date: Some("2024-11-01".into()),
            end_date: Some("2024-11-30".into()),
            category: Some("FOOD".into()),
            limit: Some(1),
        };
        let out = get_expenses(env.config(), args).await.unwrap();
        let list = out.structure().unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.expenses[0].description, "Dinner");
    }

    #[tokio::test]
    async fn test_get_expenses_bad_start_date() {
        let env = seeded().await;
        let args = GetExpensesArgs {
            start_date: Some("2024-13-01".into()),
            ..Default::default()
        };
        let err = get_expenses(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("startDate"), "{err}");
    }

    #[tokio::test]
    async fn test_get_expenses_limit_out_of_range() {
        let env = TestEnv::new().await;
        for limit in [0, 1001, -5] {
            let args = GetExpensesArgs {
                limit: Some(limit),
                ..Default::default()
            };
            let err = get_expenses(env.config(), args).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
            assert!(err.to_string().contains("limit"), "{err}");
        }
    }

    #[tokio::test]
    async fn test_export_to_csv() {
        let env = TestEnv::new().await;
        env.add_expense(12.5, "food", "He said \"hi\"", "2024-11-03")
            .await;
        let out = export_to_csv(env.config(), ExportToCsvArgs::default())
            .await
            .unwrap();
        assert_eq!(out.message(), "Exported 1 expenses to CSV");
        let export = out.structure().unwrap();
        assert_eq!(export.count, 1);
        let mut lines = export.csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,amount,category,description,date,created_at")
        );
        let row = lines.next().unwrap();
        assert!(
            row.starts_with("1,12.5,food,\"He said \"\"hi\"\"\",2024-11-03,"),
            "{row}"
        );
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_export_to_csv_empty() {
        let env = TestEnv::new().await;
        let out = export_to_csv(env.config(), ExportToCsvArgs::default())
            .await
            .unwrap();
        let export = out.structure().unwrap();
        assert_eq!(export.count, 0);
        assert_eq!(export.csv, "id,amount,category,description,date,created_at\n");
    }

    #[tokio::test]
    async fn test_export_to_csv_bad_category() {
        let env = TestEnv::new().await;
        let args = ExportToCsvArgs {
            category: Some("rent".into()),
            ..Default::default()
        };
        let err = export_to_csv(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let env = seeded().await;
        let path: PathBuf = env.config().root().join("out.csv");
        let args = ExportArgs::new(ExportToCsvArgs::default(), Some(path.clone()));
        let out = export(env.config(), args).await.unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().contains("Exported 4 expenses"));

        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv.lines().count(), 5);
    }
}
