//! Running the statements of an editor buffer
//!
//! Plain SELECTs are paginated: the row count comes from wrapping the
//! statement in `SELECT COUNT(*) FROM (...) AS wrapper` and only the first
//! page is fetched. Other row-returning statements are materialised once.
//! Data-modifying statements report affected rows. A result read from a
//! single table carries that table's schema so its rows can be edited.

use std::sync::Arc;
use std::time::Instant;
use tuql_core::{ColumnMeta, Connection, Dialect, Row, TableSchema, Value};
use tuql_query::{StatementKind, classify_statement, single_table_source, split_statements};

use crate::error::{ServiceError, ServiceResult};
use crate::windowed::{MAX_WINDOW_ROWS, QueryRowSource};

/// How one statement will be run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    Paginated {
        base: String,
        count_sql: String,
        first_page_sql: String,
    },
    Unpaginated {
        sql: String,
    },
    Mutation {
        sql: String,
    },
}

pub fn count_wrapper_sql(statement: &str) -> String {
    format!("SELECT COUNT(*) FROM ({}) AS wrapper", statement)
}

pub fn plan_execution(statement: &str, dialect: Dialect, page_size: u64) -> ExecutionPlan {
    let statement = statement.trim().trim_end_matches(';').trim_end();
    match classify_statement(statement, dialect) {
        StatementKind::Select { paginatable: true } => ExecutionPlan::Paginated {
            base: statement.to_string(),
            count_sql: count_wrapper_sql(statement),
            first_page_sql: QueryRowSource::page_sql(statement, 0, page_size),
        },
        StatementKind::Select { .. } | StatementKind::ReadOnly => ExecutionPlan::Unpaginated {
            sql: statement.to_string(),
        },
        StatementKind::Mutating => ExecutionPlan::Mutation {
            sql: statement.to_string(),
        },
    }
}

/// Rows produced by the last result-bearing statement
#[derive(Debug, Clone)]
pub struct ExecutedResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
    /// Unwrapped statement used to fetch later pages; `None` when `rows` is
    /// the complete result.
    pub paginated_base: Option<String>,
    pub total_rows: Option<u64>,
    /// Table the rows map onto one-to-one, when the statement reads only one
    pub source_table: Option<String>,
    pub source_schema: Option<TableSchema>,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub result: Option<ExecutedResult>,
    pub statements_run: usize,
    pub affected_rows: u64,
    pub messages: Vec<String>,
    pub elapsed_ms: u64,
}

/// Run every statement of `text` in order.
///
/// The first failing statement stops the run.
#[tracing::instrument(skip(connection, text), fields(sql_preview = %text.chars().take(100).collect::<String>()))]
pub async fn execute_text(
    connection: Arc<dyn Connection>,
    text: String,
    page_size: u64,
) -> ServiceResult<ExecutionOutcome> {
    let started = Instant::now();
    let statements = split_statements(&text);
    if statements.is_empty() {
        return Err(ServiceError::InvalidArgument("nothing to execute".to_string()));
    }

    let dialect = connection.dialect();
    let mut outcome = ExecutionOutcome::default();

    for (index, statement) in statements.iter().enumerate() {
        let plan = plan_execution(statement, dialect, page_size);
        tracing::debug!(index, ?plan, "executing statement");

        let run = run_plan(connection.as_ref(), dialect, plan, &mut outcome).await;
        if let Err(err) = run {
            return Err(if statements.len() > 1 {
                ServiceError::QueryFailed(format!("statement {}: {}", index + 1, err))
            } else {
                err
            });
        }
        outcome.statements_run += 1;
    }

    outcome.elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        statements = outcome.statements_run,
        affected_rows = outcome.affected_rows,
        elapsed_ms = outcome.elapsed_ms,
        "execution finished"
    );
    Ok(outcome)
}

/// Resolve the table a result can be edited through.
///
/// A failed schema fetch is not fatal; key flags on the result columns may
/// still identify rows.
async fn edit_source(
    connection: &dyn Connection,
    dialect: Dialect,
    sql: &str,
) -> (Option<String>, Option<TableSchema>) {
    let Some(table) = single_table_source(sql, dialect) else {
        return (None, None);
    };
    let schema = match connection.get_schema(&table).await {
        Ok(schema) => Some(schema),
        Err(e) => {
            tracing::debug!(table = %table, "schema for result source unavailable: {}", e);
            None
        }
    };
    (Some(table), schema)
}

async fn run_plan(
    connection: &dyn Connection,
    dialect: Dialect,
    plan: ExecutionPlan,
    outcome: &mut ExecutionOutcome,
) -> ServiceResult<()> {
    match plan {
        ExecutionPlan::Paginated {
            base,
            count_sql,
            first_page_sql,
        } => {
            let total_rows = match connection.query(&count_sql, &[]).await {
                Ok(result) => result
                    .scalar()
                    .and_then(Value::as_i64)
                    .and_then(|n| u64::try_from(n).ok()),
                Err(e) => {
                    tracing::warn!("COUNT wrapper failed, pagination total unavailable: {}", e);
                    None
                }
            };
            let page = connection
                .query(&first_page_sql, &[])
                .await
                .map_err(|e| ServiceError::QueryFailed(e.to_string()))?;
            outcome.messages.push(match total_rows {
                Some(total) => format!("{} rows", total),
                None => format!("{}+ rows", page.rows.len()),
            });
            let (source_table, source_schema) = edit_source(connection, dialect, &base).await;
            outcome.result = Some(ExecutedResult {
                columns: page.columns,
                rows: page.rows,
                paginated_base: Some(base),
                total_rows,
                source_table,
                source_schema,
            });
        }
        ExecutionPlan::Unpaginated { sql } => {
            let result = connection
                .query(&sql, &[])
                .await
                .map_err(|e| ServiceError::QueryFailed(e.to_string()))?;
            if result.rows.len() as u64 > MAX_WINDOW_ROWS {
                return Err(ServiceError::ResourceLimit(format!(
                    "result of {} rows exceeds {} rows",
                    result.rows.len(),
                    MAX_WINDOW_ROWS
                )));
            }
            let total = result.rows.len() as u64;
            outcome.messages.push(format!("{} rows", total));
            let (source_table, source_schema) = edit_source(connection, dialect, &sql).await;
            outcome.result = Some(ExecutedResult {
                columns: result.columns,
                rows: result.rows,
                paginated_base: None,
                total_rows: Some(total),
                source_table,
                source_schema,
            });
        }
        ExecutionPlan::Mutation { sql } => {
            let result = connection
                .execute(&sql, &[])
                .await
                .map_err(|e| ServiceError::QueryFailed(e.to_string()))?;
            outcome.affected_rows += result.affected_rows;
            outcome
                .messages
                .push(format!("{} rows affected", result.affected_rows));
        }
    }
    Ok(())
}
