//! Column filters and their compilation into a WHERE clause body
//!
//! Values are always rendered as quoted literals with embedded `'` doubled,
//! except bare numeric tokens inside an `In` list. `ColumnRef::Raw` filters
//! are user-authored SQL and are emitted verbatim inside parentheses; they are
//! not escaped.

use serde::{Deserialize, Serialize};
use tuql_core::{Dialect, Result, TuqlError};

/// Filter operators for WHERE clause generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterOp {
    #[default]
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    Contains,
    Regex,
    Between,
    IsEmpty,
    IsNotEmpty,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    /// Short name used on the command line and in saved filters
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Between => "between",
            Self::IsEmpty => "empty",
            Self::IsNotEmpty => "notempty",
            Self::IsNull => "null",
            Self::IsNotNull => "notnull",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns true if this operator requires a value input
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty
        )
    }

    pub fn requires_two_values(&self) -> bool {
        matches!(self, Self::Between)
    }

    pub fn all() -> &'static [FilterOp] {
        &[
            Self::Eq,
            Self::Ne,
            Self::Gt,
            Self::Ge,
            Self::Lt,
            Self::Le,
            Self::In,
            Self::Contains,
            Self::Regex,
            Self::Between,
            Self::IsEmpty,
            Self::IsNotEmpty,
            Self::IsNull,
            Self::IsNotNull,
        ]
    }

    fn comparison_symbol(&self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("<>"),
            Self::Gt => Some(">"),
            Self::Ge => Some(">="),
            Self::Lt => Some("<"),
            Self::Le => Some("<="),
            _ => None,
        }
    }
}

/// What a filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRef {
    /// Index into the active column list
    Column(usize),
    /// A raw SQL boolean expression carried in the filter's value
    Raw,
}

/// A single column filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: ColumnRef,
    pub operator: FilterOp,
    pub value: String,
    /// Upper bound, only meaningful for `Between`
    pub value2: Option<String>,
}

impl ColumnFilter {
    pub fn new(column: usize, operator: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: ColumnRef::Column(column),
            operator,
            value: value.into(),
            value2: None,
        }
    }

    pub fn between(column: usize, low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            column: ColumnRef::Column(column),
            operator: FilterOp::Between,
            value: low.into(),
            value2: Some(high.into()),
        }
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Self {
            column: ColumnRef::Raw,
            operator: FilterOp::Eq,
            value: expression.into(),
            value2: None,
        }
    }

    /// Whether the filter contributes a fragment to the WHERE clause
    pub fn is_active(&self) -> bool {
        if matches!(self.column, ColumnRef::Raw) {
            return !self.value.is_empty();
        }
        if self.operator.requires_value() && self.value.is_empty() {
            return false;
        }
        if self.operator.requires_two_values() {
            return self.value2.as_deref().is_some_and(|v| !v.is_empty());
        }
        true
    }
}

/// Size limits enforced when filters are edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    pub max_value_len: usize,
    pub max_in_list_items: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_value_len: 4096,
            max_in_list_items: MAX_IN_LIST_ITEMS,
        }
    }
}

const MAX_IN_LIST_ITEMS: usize = 1000;

/// Ordered filters of one table tab, joined with AND.
///
/// Every mutation validates its input first and leaves the existing filters
/// untouched when it refuses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFilters {
    filters: Vec<ColumnFilter>,
    limits: FilterLimits,
}

impl TableFilters {
    pub fn new(limits: FilterLimits) -> Self {
        Self {
            filters: Vec::new(),
            limits,
        }
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn push(&mut self, filter: ColumnFilter) -> Result<()> {
        self.validate(&filter)?;
        self.filters.push(filter);
        Ok(())
    }

    pub fn set(&mut self, index: usize, filter: ColumnFilter) -> Result<()> {
        if index >= self.filters.len() {
            return Err(TuqlError::InvalidArgument(format!(
                "filter index {} out of range ({} filters)",
                index,
                self.filters.len()
            )));
        }
        self.validate(&filter)?;
        self.filters[index] = filter;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<ColumnFilter> {
        if index < self.filters.len() {
            Some(self.filters.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn limits(&self) -> FilterLimits {
        self.limits
    }

    /// Compile these filters with the limits they were validated against.
    pub fn build_where<C: AsRef<str>>(&self, columns: &[C], dialect: Dialect) -> Option<String> {
        build_where(&self.filters, columns, dialect, self.limits)
    }

    fn validate(&self, filter: &ColumnFilter) -> Result<()> {
        let max = self.limits.max_value_len;
        let value2_len = filter.value2.as_ref().map_or(0, String::len);
        if filter.value.len() > max || value2_len > max {
            return Err(TuqlError::ResourceLimit(format!(
                "filter value exceeds {} bytes",
                max
            )));
        }
        if filter.operator == FilterOp::In && matches!(filter.column, ColumnRef::Column(_)) {
            let items = parse_in_list(&filter.value, self.limits.max_in_list_items);
            if let Err(InListError::TooMany) = items {
                return Err(TuqlError::ResourceLimit(format!(
                    "IN list exceeds {} items",
                    self.limits.max_in_list_items
                )));
            }
        }
        Ok(())
    }
}

/// Compile filters into a WHERE clause body (without the keyword).
///
/// Returns `None` when no filter is active. IN lists longer than
/// `limits.max_in_list_items` compile to `IN (NULL)`.
pub fn build_where<C: AsRef<str>>(
    filters: &[ColumnFilter],
    columns: &[C],
    dialect: Dialect,
    limits: FilterLimits,
) -> Option<String> {
    let fragments: Vec<String> = filters
        .iter()
        .filter(|f| f.is_active())
        .filter_map(|f| compile_filter(f, columns, dialect, limits.max_in_list_items))
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(" AND "))
    }
}

fn compile_filter<C: AsRef<str>>(
    filter: &ColumnFilter,
    columns: &[C],
    dialect: Dialect,
    max_in_list_items: usize,
) -> Option<String> {
    let index = match filter.column {
        ColumnRef::Raw => return Some(format!("({})", filter.value)),
        ColumnRef::Column(index) => index,
    };
    let Some(column) = columns.get(index) else {
        tracing::debug!(index, columns = columns.len(), "skipping filter on unknown column");
        return None;
    };

    let col = dialect.quote_identifier(column.as_ref());
    let value = &filter.value;

    let fragment = if let Some(symbol) = filter.operator.comparison_symbol() {
        format!("{} {} {}", col, symbol, Dialect::quote_literal(value))
    } else {
        match filter.operator {
            FilterOp::In => compile_in_list(&col, value, max_in_list_items),
            FilterOp::Contains => format!("{} LIKE '%{}%'", col, Dialect::escape_string(value)),
            FilterOp::Regex => match dialect.regex_operator() {
                Some(op) => format!("{} {} {}", col, op, Dialect::quote_literal(value)),
                None => format!("{} GLOB '*{}*'", col, Dialect::escape_string(value)),
            },
            FilterOp::Between => format!(
                "{} BETWEEN {} AND {}",
                col,
                Dialect::quote_literal(value),
                Dialect::quote_literal(filter.value2.as_deref().unwrap_or_default())
            ),
            FilterOp::IsEmpty => format!("{} = ''", col),
            FilterOp::IsNotEmpty => format!("{} <> ''", col),
            FilterOp::IsNull => format!("{} IS NULL", col),
            FilterOp::IsNotNull => format!("{} IS NOT NULL", col),
            FilterOp::Eq
            | FilterOp::Ne
            | FilterOp::Gt
            | FilterOp::Ge
            | FilterOp::Lt
            | FilterOp::Le => return None,
        }
    };
    Some(fragment)
}

fn compile_in_list(col: &str, value: &str, max_items: usize) -> String {
    match parse_in_list(value, max_items) {
        Ok(items) => {
            let rendered: Vec<String> = items
                .into_iter()
                .map(|item| match item {
                    InItem::Numeric(n) => n,
                    InItem::Text(s) => Dialect::quote_literal(&s),
                })
                .collect();
            format!("{} IN ({})", col, rendered.join(", "))
        }
        Err(err) => {
            tracing::debug!(?err, "IN list rejected, matching nothing");
            format!("{} IN (NULL)", col)
        }
    }
}

#[derive(Debug, PartialEq)]
enum InItem {
    Numeric(String),
    Text(String),
}

#[derive(Debug, PartialEq)]
enum InListError {
    Malformed,
    TooMany,
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}

/// Parse `1, 'a,b', "c", bare` into list items.
fn parse_in_list(input: &str, max_items: usize) -> std::result::Result<Vec<InItem>, InListError> {
    let mut items = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let item = match chars.peek().copied() {
            None => return Err(InListError::Malformed),
            Some(quote @ ('\'' | '"')) => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => return Err(InListError::Malformed),
                        Some('\\') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err(InListError::Malformed),
                        },
                        Some(c) if c == quote => {
                            if chars.next_if_eq(&quote).is_some() {
                                text.push(quote);
                            } else {
                                break;
                            }
                        }
                        Some(c) => text.push(c),
                    }
                }
                InItem::Text(text)
            }
            Some(_) => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|c| *c != ',') {
                    token.push(c);
                }
                let token = token.trim();
                if token.is_empty() {
                    return Err(InListError::Malformed);
                }
                if is_numeric_token(token) {
                    InItem::Numeric(token.to_string())
                } else {
                    InItem::Text(token.to_string())
                }
            }
        };

        items.push(item);
        if items.len() > max_items {
            return Err(InListError::TooMany);
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => return Ok(items),
            Some(',') => continue,
            Some(_) => return Err(InListError::Malformed),
        }
    }
}
