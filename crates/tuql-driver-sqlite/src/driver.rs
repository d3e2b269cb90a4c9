//! SQLite driver implementation

use async_trait::async_trait;
use std::sync::Arc;
use tuql_core::{Connection, DatabaseDriver, Dialect, Result, TuqlError};

use crate::SqliteConnection;

/// SQLite database driver
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        tracing::debug!("SQLite driver initialized");
        Self
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    /// `connection_string` is a file path, a `file:` URI or `:memory:`.
    #[tracing::instrument(skip(self))]
    async fn connect(&self, connection_string: &str) -> Result<Arc<dyn Connection>> {
        if connection_string.trim().is_empty() {
            return Err(TuqlError::Configuration(
                "SQLite requires a database path, e.g. ./app.db or :memory:".into(),
            ));
        }

        let conn = SqliteConnection::open(connection_string).map_err(|e| {
            tracing::error!(error = %e, "failed to connect to SQLite database");
            e
        })?;
        Ok(Arc::new(conn))
    }
}
