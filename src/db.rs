//! SQLite connection for the local key-value store.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Open the database at `config.storage.path`, creating the file and its
/// parent directories on first use.
///
/// Two processes (say, `askcorp chat` and `askcorp upload`) may share the
/// file, so writers wait on a lock instead of failing immediately.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let path = &config.storage.path;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open storage: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "storage opened");
    Ok(pool)
}
