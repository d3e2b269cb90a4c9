//! SQL dialect selection
//!
//! A `Dialect` is chosen once when a connection is established and threaded
//! through every piece of SQL generation. Nothing downstream compares driver
//! names.

use serde::{Deserialize, Serialize};

/// SQL syntax variant of the connected backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    #[serde(rename = "mysql")]
    MySql,
}

impl Dialect {
    /// Resolve a dialect from a driver identifier.
    ///
    /// Accepts the common aliases drivers report (`postgresql`, `mariadb`, ...).
    pub fn from_driver_name(driver: &str) -> Option<Self> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Stable identifier for this dialect
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }

    /// Character used to quote identifiers
    pub fn identifier_quote(&self) -> char {
        match self {
            Self::MySql => '`',
            Self::Sqlite | Self::Postgres => '"',
        }
    }

    /// Quote an identifier, doubling any embedded quote characters.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let quote = self.identifier_quote();
        let mut out = String::with_capacity(identifier.len() + 2);
        out.push(quote);
        for c in identifier.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Build a possibly schema-qualified table reference.
    pub fn qualified_table(&self, table: &str, schema: Option<&str>) -> String {
        match schema {
            Some(s) => format!(
                "{}.{}",
                self.quote_identifier(s),
                self.quote_identifier(table)
            ),
            None => self.quote_identifier(table),
        }
    }

    /// Whether the backend has a native regular-expression match operator.
    pub fn supports_regex(&self) -> bool {
        !matches!(self, Self::Sqlite)
    }

    /// Native regex operator, if any
    pub fn regex_operator(&self) -> Option<&'static str> {
        match self {
            Self::MySql => Some("REGEXP"),
            Self::Postgres => Some("~"),
            Self::Sqlite => None,
        }
    }

    /// Positional bind-parameter placeholder (1-based index)
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::Sqlite | Self::MySql => "?".to_string(),
        }
    }

    /// Escape a string literal body by doubling single quotes.
    pub fn escape_string(value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Render a quoted string literal
    pub fn quote_literal(value: &str) -> String {
        format!("'{}'", Self::escape_string(value))
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Dialect {
    type Err = crate::TuqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_driver_name(s)
            .ok_or_else(|| crate::TuqlError::NotSupported(format!("unknown dialect '{}'", s)))
    }
}
