//! Statement classification
//!
//! Decides how a single statement is executed: paginated behind a COUNT
//! wrapper, materialised once, or run for its affected-row count.

use sqlparser::ast::{GroupByExpr, SetExpr, Statement, TableFactor};
use sqlparser::dialect::{Dialect as SqlParserDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use tuql_core::Dialect;

/// How a statement should be run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A plain query. `paginatable` is false when it already carries its own
    /// LIMIT, OFFSET, FETCH or locking clause.
    Select { paginatable: bool },
    /// Returns rows but cannot be wrapped (SHOW, EXPLAIN, PRAGMA, ...).
    ReadOnly,
    /// Modifies data or schema; reports affected rows.
    Mutating,
}

impl StatementKind {
    pub fn returns_rows(&self) -> bool {
        !matches!(self, Self::Mutating)
    }

    pub fn is_paginatable(&self) -> bool {
        matches!(self, Self::Select { paginatable: true })
    }
}

fn parser_dialect(dialect: Dialect) -> Box<dyn SqlParserDialect> {
    match dialect {
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
    }
}

/// Classify a single statement.
///
/// Text that the parser cannot handle, or that parses to more than one
/// statement, is classified by its leading keyword and never paginated.
pub fn classify_statement(sql: &str, dialect: Dialect) -> StatementKind {
    tracing::trace!(sql_preview = %sql.chars().take(50).collect::<String>(), "classifying statement");

    let parser_dialect = parser_dialect(dialect);
    match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(statements) if statements.len() == 1 => classify_ast(&statements[0]),
        Ok(_) => classify_by_keyword(sql),
        Err(err) => {
            tracing::debug!(%err, "statement did not parse, falling back to keyword check");
            classify_by_keyword(sql)
        }
    }
}

fn classify_ast(statement: &Statement) -> StatementKind {
    match statement {
        Statement::Query(query) => {
            if matches!(query.body.as_ref(), SetExpr::Insert(_) | SetExpr::Update(_)) {
                return StatementKind::Mutating;
            }
            let paginatable = query.limit.is_none()
                && query.offset.is_none()
                && query.fetch.is_none()
                && query.locks.is_empty();
            StatementKind::Select { paginatable }
        }
        Statement::Explain { .. }
        | Statement::ExplainTable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowCreate { .. } => StatementKind::ReadOnly,
        Statement::Pragma { value: None, .. } => StatementKind::ReadOnly,
        _ => StatementKind::Mutating,
    }
}

/// Table whose rows a query returns one-to-one, if there is exactly one.
///
/// Only a plain `SELECT ... FROM t` qualifies: joins, derived tables, CTEs,
/// set operations, DISTINCT and grouping all yield `None`, as do
/// schema-qualified names.
pub fn single_table_source(sql: &str, dialect: Dialect) -> Option<String> {
    let parser_dialect = parser_dialect(dialect);
    let statements = Parser::parse_sql(parser_dialect.as_ref(), sql).ok()?;
    let [Statement::Query(query)] = statements.as_slice() else {
        return None;
    };
    if query.with.is_some() {
        return None;
    }
    let SetExpr::Select(select) = query.body.as_ref() else {
        return None;
    };
    let grouped = match &select.group_by {
        GroupByExpr::All(_) => true,
        GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
    };
    if grouped || select.distinct.is_some() || select.having.is_some() {
        return None;
    }
    let [from] = select.from.as_slice() else {
        return None;
    };
    if !from.joins.is_empty() {
        return None;
    }
    match &from.relation {
        TableFactor::Table {
            name, args: None, ..
        } => match name.0.as_slice() {
            [ident] => Some(ident.value.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn classify_by_keyword(sql: &str) -> StatementKind {
    let upper = sql.trim_start().to_uppercase();
    let keyword = upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    match keyword {
        "SELECT" | "WITH" | "VALUES" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "PRAGMA" => {
            StatementKind::ReadOnly
        }
        _ => StatementKind::Mutating,
    }
}
