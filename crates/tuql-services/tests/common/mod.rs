//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tuql_core::{
    ColumnInfo, ColumnMeta, Connection, Dialect, QueryCancelHandle, QueryResult, Result, Row,
    StatementResult, TableSchema, TuqlError, Value,
};
use tuql_settings::{FilterSettings, PaginationSettings};

/// In-memory table served by `MockConnection`
#[derive(Clone)]
pub struct MockTable {
    pub name: String,
    pub schema: TableSchema,
    pub rows: Vec<Row>,
}

#[derive(Default)]
pub struct MockCancel {
    pub calls: AtomicUsize,
}

impl QueryCancelHandle for MockCancel {
    fn cancel(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock connection for testing service-layer logic without a real database.
///
/// `SELECT ... FROM <table> ... LIMIT n OFFSET m` and `COUNT(*)` queries are
/// answered from registered in-memory tables; WHERE and ORDER BY are ignored.
/// Pattern responses and failures take precedence and let tests exercise
/// specific SQL paths.
pub struct MockConnection {
    pub name: String,
    pub dialect: Dialect,
    pub tables: Vec<MockTable>,
    /// If a query contains the pattern string, the result is returned instead
    pub query_responses: Vec<(String, QueryResult)>,
    /// Queries or statements containing any of these fail
    pub failing_patterns: Vec<String>,
    pub schema_fails: bool,
    pub affected_rows: u64,
    pub query_delay: Option<Duration>,
    pub cancel: Arc<MockCancel>,
    /// Log of all SQL queries executed, for assertion in tests
    pub query_log: Arc<Mutex<Vec<String>>>,
    /// Log of all statements run through `execute`, with their parameters
    pub execute_log: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockConnection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialect: Dialect::Sqlite,
            tables: Vec::new(),
            query_responses: Vec::new(),
            failing_patterns: Vec::new(),
            schema_fails: false,
            affected_rows: 1,
            query_delay: None,
            cancel: Arc::new(MockCancel::default()),
            query_log: Arc::new(Mutex::new(Vec::new())),
            execute_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_table(mut self, table: MockTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_query_response(mut self, sql_contains: impl Into<String>, result: QueryResult) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn with_failure_on(mut self, sql_contains: impl Into<String>) -> Self {
        self.failing_patterns.push(sql_contains.into());
        self
    }

    pub fn with_schema_failure(mut self) -> Self {
        self.schema_fails = true;
        self
    }

    pub fn with_affected_rows(mut self, affected: u64) -> Self {
        self.affected_rows = affected;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }

    pub fn execute_log(&self) -> Vec<(String, Vec<Value>)> {
        self.execute_log.lock().clone()
    }

    pub fn logged(&self, fragment: &str) -> bool {
        self.query_log().iter().any(|q| q.contains(fragment))
    }

    fn check_failure(&self, sql: &str) -> Result<()> {
        match self.failing_patterns.iter().find(|p| sql.contains(p.as_str())) {
            Some(pattern) => Err(TuqlError::Query(format!("mock failure on '{}'", pattern))),
            None => Ok(()),
        }
    }

    fn find_table(&self, sql: &str) -> Option<&MockTable> {
        let name = table_after_from(sql)?;
        self.tables.iter().find(|t| t.name == name)
    }
}

/// First `FROM <name>` whose target is not a subquery.
fn table_after_from(sql: &str) -> Option<String> {
    let upper = sql.to_uppercase();
    let mut search_from = 0;
    while let Some(pos) = upper[search_from..].find("FROM ") {
        let start = search_from + pos + "FROM ".len();
        let rest = sql[start..].trim_start();
        if !rest.starts_with('(') {
            let token: String = rest
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != ')' && *c != ';')
                .collect();
            return Some(token.trim_matches(|c| c == '"' || c == '`').to_string());
        }
        search_from = start;
    }
    None
}

fn number_after(sql: &str, keyword: &str) -> Option<usize> {
    let upper = sql.to_uppercase();
    let pos = upper.rfind(keyword)?;
    sql[pos + keyword.len()..]
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        self.dialect.id()
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        self.query_log.lock().push(sql.to_string());
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure(sql)?;

        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }

        let Some(table) = self.find_table(sql) else {
            return Err(TuqlError::Query(format!("no such table in: {}", sql)));
        };

        if sql.contains("COUNT(*)") {
            return Ok(mock_query_result(
                vec!["COUNT(*)"],
                vec![vec![Value::Int64(table.rows.len() as i64)]],
            ));
        }

        let offset = number_after(sql, " OFFSET ").unwrap_or(0);
        let limit = number_after(sql, " LIMIT ").unwrap_or(usize::MAX);
        let rows = table
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(QueryResult::from_rows(result_columns(&table.schema), rows))
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.execute_log
            .lock()
            .push((sql.to_string(), params.to_vec()));
        self.check_failure(sql)?;
        Ok(StatementResult::affected(self.affected_rows))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn get_schema(&self, table: &str) -> Result<TableSchema> {
        if self.schema_fails {
            return Err(TuqlError::Schema("Failed to get columns".into()));
        }
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| TuqlError::NotFound(table.to_string()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        Some(self.cancel.clone())
    }
}

/// Result columns as a driver without key annotations reports them
fn result_columns(schema: &TableSchema) -> Vec<ColumnMeta> {
    schema
        .columns
        .iter()
        .map(|c| ColumnMeta::new(c.name.clone(), c.data_type.clone(), c.ordinal))
        .collect()
}

/// Helper to create a mock query result with typed columns and row data
pub fn mock_query_result(column_names: Vec<&str>, row_data: Vec<Vec<Value>>) -> QueryResult {
    let columns = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnMeta::new(*name, "TEXT", i))
        .collect();
    let rows = row_data.into_iter().map(Row::new).collect();
    QueryResult::from_rows(columns, rows)
}

/// `items(id PRIMARY KEY, name)` where row `i` has id `i` and name `item-i`
pub fn items_table(count: usize) -> MockTable {
    MockTable {
        name: "items".to_string(),
        schema: TableSchema::new(
            "items",
            vec![
                ColumnInfo::new("id", "INTEGER", 0).primary_key(),
                ColumnInfo::new("name", "TEXT", 1),
            ],
        ),
        rows: (0..count)
            .map(|i| {
                Row::new(vec![
                    Value::Int64(i as i64),
                    Value::String(format!("item-{}", i)),
                ])
            })
            .collect(),
    }
}

/// `logs(message, level)` with no primary key
pub fn logs_table(count: usize) -> MockTable {
    MockTable {
        name: "logs".to_string(),
        schema: TableSchema::new(
            "logs",
            vec![
                ColumnInfo::new("message", "TEXT", 0),
                ColumnInfo::new("level", "TEXT", 1),
            ],
        ),
        rows: (0..count)
            .map(|i| {
                Row::new(vec![
                    Value::String(format!("line {}", i)),
                    Value::String("info".into()),
                ])
            })
            .collect(),
    }
}

/// Small pages so window behaviour shows up with modest tables
pub fn test_pagination() -> PaginationSettings {
    PaginationSettings {
        page_size: 100,
        load_threshold: 10,
        max_loaded_pages: 5,
        trim_distance_pages: 2,
    }
}

pub fn test_filters() -> FilterSettings {
    FilterSettings::default()
}
