//! Spending reports: the category breakdown and the monthly summary.

use crate::aggregate::{self, CategoryBreakdown, CategoryStats, DailySpending, Totals};
use crate::args::{MonthlySummaryArgs, SpendingByCategoryArgs};
use crate::commands::Out;
use crate::db::ExpenseFilter;
use crate::error::{ErrorType, IntoResult};
use crate::format::{currency, month_name};
use crate::model::{validate, ExpenseDate};
use crate::{Config, Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The spending of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySummary {
    /// The English name of the month, e.g. `November`.
    pub month: String,
    pub year: i32,
    /// The inclusive date range covered, e.g. `2024-11-01 to 2024-11-30`.
    pub period: String,
    pub summary: Totals,
    /// Per-category statistics, largest total first.
    pub category_breakdown: Vec<CategoryStats>,
    /// Per-day totals, earliest day first.
    pub daily_spending: Vec<DailySpending>,
}

/// Groups the expenses between the optional dates by category.
///
/// Every matching expense is included. Categories are ordered by their total, largest first, and
/// each carries its share of the overall total in percent.
///
/// # Errors
/// - `Validation` if a date is invalid.
/// - `Database` if the query fails.
pub async fn get_spending_by_category(
    config: Config,
    args: SpendingByCategoryArgs,
) -> Result<Out<CategoryBreakdown>> {
    let filter = ExpenseFilter::new(args.start_date.as_deref(), args.end_date.as_deref(), None)
        .pub_result(ErrorType::Validation)?;
    let expenses = config
        .db()
        .select_expenses(&filter)
        .await
        .pub_result(ErrorType::Database)?;

    let breakdown = aggregate::category_breakdown(&expenses);
    let message = format!(
        "Total spending of {} across {} categor{}",
        currency(breakdown.total_spending),
        breakdown.categories.len(),
        if breakdown.categories.len() == 1 {
            "y"
        } else {
            "ies"
        }
    );
    Ok(Out::new(message, breakdown))
}

/// Summarizes one calendar month: overall totals, a category breakdown and spending per day.
///
/// A month without expenses yields zero totals and empty breakdowns.
///
/// # Errors
/// - `Validation` if `year` is outside `2000..=2100` or `month` is outside `1..=12`.
/// - `Database` if the query fails.
pub async fn get_monthly_summary(
    config: Config,
    args: MonthlySummaryArgs,
) -> Result<Out<MonthlySummary>> {
    let year = validate::in_range("year", args.year.into(), 2000, 2100)
        .pub_result(ErrorType::Validation)? as i32;
    let month = validate::in_range("month", args.month.into(), 1, 12)
        .pub_result(ErrorType::Validation)? as u32;
    let (first, last) = ExpenseDate::month_bounds(year, month).ok_or_else(|| {
        Error::msg(
            ErrorType::Validation,
            format!("Invalid month: {year}-{month:02} is not a calendar month"),
        )
    })?;
    let name = month_name(month).unwrap_or_default().to_string();

    let expenses = config
        .db()
        .select_expenses(&ExpenseFilter::between(first, last))
        .await
        .pub_result(ErrorType::Database)?;

    let summary = aggregate::totals(&expenses);
    let message = format!(
        "{name} {year}: {} spent across {} expense{}",
        currency(summary.total_spending),
        summary.total_transactions,
        if summary.total_transactions == 1 {
            ""
        } else {
            "s"
        }
    );
    Ok(Out::new(
        message,
        MonthlySummary {
            month: name,
            year,
            period: format!("{first} to {last}"),
            summary,
            category_breakdown: aggregate::category_breakdown(&expenses).categories,
            daily_spending: aggregate::daily_breakdown(&expenses),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_spending_by_category_split() {
        let env = TestEnv::new().await;
        env.add_expense(10.0, "food", "Breakfast", "2024-11-01").await;
        env.add_expense(20.0, "food", "Lunch", "2024-11-01").await;
        env.add_expense(30.0, "transport", "Train", "2024-11-02").await;

        let out = get_spending_by_category(env.config(), SpendingByCategoryArgs::default())
            .await
            .unwrap();
        let breakdown = out.structure().unwrap();
        assert_eq!(breakdown.total_spending, 60.0);
        assert_eq!(breakdown.categories.len(), 2);

        let food = breakdown
            .categories
            .iter()
            .find(|c| c.category == Category::Food)
            .unwrap();
        assert_eq!(food.transaction_count, 2);
        assert_eq!(food.total_amount, 30.0);
        assert_eq!(food.average_amount, 15.0);
        assert_eq!(food.min_amount, 10.0);
        assert_eq!(food.max_amount, 20.0);
        let percentages: f64 = breakdown.categories.iter().map(|c| c.percentage).sum();
        assert_eq!(percentages, 100.0);
        assert_eq!(out.message(), "Total spending of $60.00 across 2 categories");
    }

    #[tokio::test]
    async fn test_spending_by_category_date_range() {
        let env = TestEnv::new().await;
        env.add_expense(10.0, "food", "Old", "2024-10-31").await;
        env.add_expense(25.0, "health", "Pharmacy", "2024-11-05").await;

        let args = SpendingByCategoryArgs {
            start_date: Some("2024-11-01".into()),
            end_date: None,
        };
        let out = get_spending_by_category(env.config(), args).await.unwrap();
        let breakdown = out.structure().unwrap();
        assert_eq!(breakdown.total_spending, 25.0);
        assert_eq!(breakdown.categories[0].category, Category::Health);
        assert_eq!(breakdown.categories[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn test_spending_by_category_bad_end_date() {
        let env = TestEnv::new().await;
        let args = SpendingByCategoryArgs {
            start_date: None,
            end_date: Some("11/05/2024".into()),
        };
        let err = get_spending_by_category(env.config(), args)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("endDate"), "{err}");
    }

    #[tokio::test]
    async fn test_monthly_summary() {
        let env = TestEnv::new().await;
        env.add_expense(5.0, "food", "Coffee", "2024-02-29").await;
        env.add_expense(50.0, "bills", "Internet", "2024-02-01").await;
        env.add_expense(7.0, "food", "Bagel", "2024-02-29").await;
        env.add_expense(99.0, "travel", "Outside", "2024-03-01").await;

        let out = get_monthly_summary(env.config(), MonthlySummaryArgs { year: 2024, month: 2 })
            .await
            .unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.month, "February");
        assert_eq!(summary.year, 2024);
        assert_eq!(summary.period, "2024-02-01 to 2024-02-29");
        assert_eq!(summary.summary.total_transactions, 3);
        assert_eq!(summary.summary.total_spending, 62.0);

        let categories: Vec<Category> = summary
            .category_breakdown
            .iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(categories, vec![Category::Bills, Category::Food]);

        let days: Vec<String> = summary
            .daily_spending
            .iter()
            .map(|d| d.date.to_string())
            .collect();
        assert_eq!(days, vec!["2024-02-01", "2024-02-29"]);
        assert_eq!(summary.daily_spending[1].transaction_count, 2);
        assert_eq!(summary.daily_spending[1].total_amount, 12.0);
    }

    #[tokio::test]
    async fn test_monthly_summary_empty_month() {
        let env = TestEnv::new().await;
        let out = get_monthly_summary(env.config(), MonthlySummaryArgs { year: 2023, month: 2 })
            .await
            .unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.period, "2023-02-01 to 2023-02-28");
        assert_eq!(summary.summary.total_transactions, 0);
        assert_eq!(summary.summary.total_spending, 0.0);
        assert!(summary.category_breakdown.is_empty());
        assert!(summary.daily_spending.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_summary_out_of_range() {
        let env = TestEnv::new().await;
        for (year, month, field) in [(2024, 13, "month"), (2024, 0, "month"), (1999, 5, "year")] {
            let err = get_monthly_summary(env.config(), MonthlySummaryArgs { year, month })
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
            assert!(err.to_string().contains(field), "{err}");
        }
    }
}
