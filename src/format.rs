//! Presentation helpers: currency and month names for messages, and CSV export.

use crate::model::Expense;
use anyhow::{Context, Result};
use chrono::Month;

/// The header row of an expense CSV export.
pub const CSV_HEADER: [&str; 6] = ["id", "amount", "category", "description", "date", "created_at"];

/// Formats an amount in dollars with thousands separators, e.g. `$1,234.50`.
pub fn currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${}", format_num::format_num!(",.2", amount.abs()))
}

/// The English name of a month, `1` is `January`.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

/// Wraps `s` in double quotes, doubling any double quotes inside it.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Renders expenses as CSV.
///
/// The description column is always quoted. The other columns never contain commas, quotes or
/// line breaks, so they are written as they are.
pub fn to_csv(expenses: &[Expense]) -> Result<String> {
    // The writer only joins fields; `quote` supplies the one quoted column.
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .context("Unable to write CSV header")?;
    for expense in expenses {
        writer
            .write_record([
                expense.id.to_string(),
                expense.amount.to_string(),
                expense.category.to_string(),
                quote(&expense.description),
                expense.date.to_string(),
                expense.created_at.clone(),
            ])
            .with_context(|| format!("Unable to write expense {} as CSV", expense.id))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
