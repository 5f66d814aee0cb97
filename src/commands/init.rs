use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and:
/// - Creates an initial `config.json` file
/// - Creates an empty expenses database, at `sqlite_path` if given
///
/// # Arguments
/// - `expenses_home` - The directory that will be the home directory, e.g. `$HOME/expenses`
/// - `sqlite_path` - Where to create the database. Relative paths are relative to
///   `expenses_home`.
///
/// # Errors
/// - Returns an error if the directory is already initialized or if any file operation fails.
pub async fn init(expenses_home: &Path, sqlite_path: Option<&Path>) -> Result<Out<()>> {
    let config = Config::create(expenses_home, sqlite_path.map(Path::to_path_buf))
        .await
        .context("Unable to create the expenses home directory and config")
        .pub_result(ErrorType::Config)?;
    let message = format!(
        "Created the expenses database at {}",
        config.sqlite_path().display()
    );
    config.db().close().await;
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        let out = init(&home, None).await.unwrap();
        assert!(out.message().contains("expenses.sqlite"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.db().count_expenses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        init(&home, None).await.unwrap();
        let err = init(&home, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
