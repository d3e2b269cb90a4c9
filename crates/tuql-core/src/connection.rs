//! Connection trait

use crate::{Dialect, QueryResult, Result, StatementResult, TableSchema, TuqlError, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// Handle for cancelling a running query from any thread.
///
/// Calling `cancel` when nothing is running is a no-op, and repeated calls
/// are harmless.
pub trait QueryCancelHandle: Send + Sync {
    fn cancel(&self);
}

/// A database connection
///
/// Only the primitive calls are required. Counting, page fetches and
/// primary-key targeted edits have default implementations composed from
/// `query`/`execute` and the connection's `Dialect`; drivers override them
/// when they can do better.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite", "postgresql", "mysql")
    fn driver_name(&self) -> &str;

    /// SQL dialect spoken by this connection
    fn dialect(&self) -> Dialect;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// List user tables
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Describe a table's columns and primary key
    async fn get_schema(&self, table: &str) -> Result<TableSchema>;

    /// Count rows in `table`, optionally restricted by a compiled WHERE body.
    async fn count_rows(&self, table: &str, where_clause: Option<&str>) -> Result<u64> {
        let mut sql = format!(
            "SELECT COUNT(*) FROM {}",
            self.dialect().quote_identifier(table)
        );
        if let Some(w) = where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(w);
        }

        let result = self
            .query(&sql, &[])
            .await
            .map_err(|e| TuqlError::Count(e.to_string()))?;
        let count = result
            .scalar()
            .and_then(Value::as_i64)
            .ok_or_else(|| TuqlError::Count(format!("no count returned for {}", table)))?;
        u64::try_from(count).map_err(|_| TuqlError::Count(format!("negative count {}", count)))
    }

    /// Fetch one page of `table`.
    ///
    /// `where_clause` and `order_by` are pre-rendered SQL bodies without their
    /// keywords.
    async fn query_page(
        &self,
        table: &str,
        offset: u64,
        limit: u64,
        where_clause: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<QueryResult> {
        let mut sql = format!("SELECT * FROM {}", self.dialect().quote_identifier(table));
        if let Some(w) = where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(w);
        }
        if let Some(o) = order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(o);
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        tracing::debug!(table = %table, offset, limit, "fetching page");
        self.query(&sql, &[]).await
    }

    /// Update a single cell of the row identified by its primary key.
    ///
    /// Returns the number of rows affected.
    async fn update_cell(
        &self,
        table: &str,
        pk_names: &[String],
        pk_values: &[Value],
        column: &str,
        new_value: &Value,
    ) -> Result<u64> {
        let dialect = self.dialect();
        let mut params = Vec::with_capacity(pk_values.len() + 1);

        let set_clause = if new_value.is_null() {
            format!("{} = NULL", dialect.quote_identifier(column))
        } else {
            params.push(new_value.clone());
            format!(
                "{} = {}",
                dialect.quote_identifier(column),
                dialect.placeholder(params.len())
            )
        };
        let where_clause = pk_predicate(dialect, pk_names, pk_values, &mut params)?;

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            dialect.quote_identifier(table),
            set_clause,
            where_clause
        );
        tracing::debug!(table = %table, column = %column, "updating cell value");
        let result = self.execute(&sql, &params).await?;
        tracing::debug!(affected_rows = result.affected_rows, "cell update completed");
        Ok(result.affected_rows)
    }

    /// Delete the row identified by its primary key.
    ///
    /// Returns the number of rows affected.
    async fn delete_row(&self, table: &str, pk_names: &[String], pk_values: &[Value]) -> Result<u64> {
        let dialect = self.dialect();
        let mut params = Vec::with_capacity(pk_values.len());
        let where_clause = pk_predicate(dialect, pk_names, pk_values, &mut params)?;

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            dialect.quote_identifier(table),
            where_clause
        );
        tracing::debug!(table = %table, "deleting row");
        let result = self.execute(&sql, &params).await?;
        Ok(result.affected_rows)
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get a handle that can be used to cancel running queries.
    ///
    /// Returns `None` if the driver does not support query cancellation.
    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        None
    }
}

/// Render `pk1 = ? AND pk2 = ?`, appending bound values to `params`.
///
/// NULL key parts become `IS NULL` and bind nothing.
fn pk_predicate(
    dialect: Dialect,
    pk_names: &[String],
    pk_values: &[Value],
    params: &mut Vec<Value>,
) -> Result<String> {
    if pk_names.is_empty() {
        return Err(TuqlError::NoPrimaryKey(
            "no key columns to identify the row".to_string(),
        ));
    }
    if pk_names.len() != pk_values.len() {
        return Err(TuqlError::InvalidArgument(format!(
            "{} key columns but {} key values",
            pk_names.len(),
            pk_values.len()
        )));
    }

    let conditions: Vec<String> = pk_names
        .iter()
        .zip(pk_values)
        .map(|(name, value)| {
            if value.is_null() {
                format!("{} IS NULL", dialect.quote_identifier(name))
            } else {
                params.push(value.clone());
                format!(
                    "{} = {}",
                    dialect.quote_identifier(name),
                    dialect.placeholder(params.len())
                )
            }
        })
        .collect();
    Ok(conditions.join(" AND "))
}
