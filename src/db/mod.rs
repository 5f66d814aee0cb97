//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! Every write runs in its own transaction while holding the `Db` write lock, and is committed
//! (with `synchronous=FULL`) before the call returns. The affected row is read back inside the
//! same transaction so callers always see what was stored.

mod filter;
mod migrations;

pub(crate) use filter::{ExpenseFilter, DEFAULT_LIMIT, EXPORT_LIMIT};

use crate::model::{Category, Expense, ExpenseChanges, ExpenseDate, NewExpense};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const SELECT_EXPENSES: &str =
    "SELECT id, amount, category, description, date, created_at FROM expenses";

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(Self::new(pool))
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Opens it
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        let version = migrations::version(&pool).await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self::new(pool))
    }

    fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Waits for in-flight work to finish and closes the connection pool.
    pub(crate) async fn close(&self) {
        self.pool.close().await
    }

    /// Returns the number of rows in the expenses table.
    pub(crate) async fn count_expenses(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count expenses")?;
        Ok(u64::try_from(row.0).unwrap_or_default())
    }

    /// Inserts a new expense and returns it as stored, including its generated `id` and
    /// `created_at`.
    pub(crate) async fn insert_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("Failed to begin insert")?;

        let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let id = sqlx::query(
            "INSERT INTO expenses (amount, category, description, date, created_at) \
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(expense.amount)
        .bind(expense.category.as_str())
        .bind(&expense.description)
        .bind(expense.date.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert expense")?
        .last_insert_rowid();

        let stored = fetch_expense(&mut tx, id)
            .await?
            .with_context(|| format!("Expense {id} was not found after insert"))?;
        tx.commit().await.context("Failed to commit insert")?;
        debug!("Inserted expense {id}");
        Ok(stored)
    }

    /// Returns the expense with `id`, if it exists.
    #[cfg(test)]
    pub(crate) async fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        fetch_expense(&mut conn, id).await
    }

    /// Returns the expenses matching `filter`, most recent first.
    pub(crate) async fn select_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_EXPENSES);
        filter.push_sql(&mut qb);
        let rows: Vec<ExpenseRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query expenses")?;
        let expenses = rows
            .into_iter()
            .map(Expense::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug_assert!(expenses.iter().all(|e| filter.matches(e)));
        Ok(expenses)
    }

    /// Applies `changes` to the expense with `id` and returns the updated expense. Returns `None`
    /// without writing anything if the expense does not exist.
    pub(crate) async fn update_expense(
        &self,
        id: i64,
        changes: &ExpenseChanges,
    ) -> Result<Option<Expense>> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("Failed to begin update")?;

        let Some(existing) = fetch_expense(&mut tx, id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE expenses SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(amount) = changes.amount {
                set.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(category) = changes.category {
                set.push("category = ")
                    .push_bind_unseparated(category.as_str());
            }
            if let Some(description) = &changes.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            if let Some(date) = changes.date {
                set.push("date = ").push_bind_unseparated(date.to_string());
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build()
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update expense {id}"))?;

        let updated = fetch_expense(&mut tx, id)
            .await?
            .with_context(|| format!("Expense {id} was not found after update"))?;
        tx.commit().await.context("Failed to commit update")?;
        debug!("Updated expense {id}");
        Ok(Some(updated))
    }

    /// Deletes the expense with `id` and returns its last state. Returns `None` without writing
    /// anything if the expense does not exist.
    pub(crate) async fn delete_expense(&self, id: i64) -> Result<Option<Expense>> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("Failed to begin delete")?;

        let Some(existing) = fetch_expense(&mut tx, id).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete expense {id}"))?;
        tx.commit().await.context("Failed to commit delete")?;
        debug!("Deleted expense {id}");
        Ok(Some(existing))
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .synchronous(SqliteSynchronous::Full);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at '{}'", path.display()))
}

async fn fetch_expense(conn: &mut SqliteConnection, id: i64) -> Result<Option<Expense>> {
    let row: Option<ExpenseRow> = sqlx::query_as(&format!("{SELECT_EXPENSES} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("Failed to read expense {id}"))?;
    row.map(Expense::try_from).transpose()
}

/// The raw column values of a row in the `expenses` table.
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    amount: f64,
    category: String,
    description: String,
    date: String,
    created_at: String,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = anyhow::Error;

    fn try_from(row: ExpenseRow) -> Result<Self> {
        Ok(Expense {
            id: row.id,
            amount: row.amount,
            category: Category::from_str(&row.category)
                .with_context(|| format!("Expense {} has a bad stored category", row.id))?,
            description: row.description,
            date: ExpenseDate::from_str(&row.date)
                .with_context(|| format!("Expense {} has a bad stored date", row.id))?,
            created_at: row.created_at,
        })
    }
}
