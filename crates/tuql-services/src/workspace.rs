//! Tabs and the pagination flow that drives them
//!
//! A `Workspace` owns one connection and an ordered list of tabs. Each tab
//! holds a single `WindowedRows` plus its `Viewport`; every cursor move runs
//! the prefetch check and then trims the window back to its page budget.
//! Query tabs own their editor text; an execution delivers its result to the
//! tab that started it, wherever the focus has moved since.

use std::sync::Arc;
use tokio::runtime::Handle;
use tuql_core::{ColumnMeta, Connection, Dialect, Row, TableSchema, Value};
use tuql_query::{ColumnFilter, FilterLimits, TableFilters, TextBuffer};
use tuql_settings::{EditorSettings, FilterSettings, PaginationSettings};
use uuid::Uuid;

use crate::async_op::{AsyncOperation, OperationState};
use crate::error::{ServiceError, ServiceResult};
use crate::execution::{ExecutionOutcome, execute_text};
use crate::row_identity::{build_pk_info, find_pk_columns};
use crate::windowed::{LoadDirection, QueryRowSource, RowSource, TableRowSource, Viewport, WindowedRows};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Sort on one column of a table tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: usize,
    pub direction: SortDirection,
}

#[derive(Debug, Clone)]
pub enum TabKind {
    Table {
        name: String,
        /// `None` when introspection failed; browsing still works.
        schema: Option<TableSchema>,
        filters: TableFilters,
        sort: Option<SortSpec>,
    },
    Query {
        buffer: TextBuffer,
        /// Statement re-issued with LIMIT/OFFSET for later pages
        paginated_base: Option<String>,
        /// Table the result rows belong to; edits go there.
        source_table: Option<String>,
        source_schema: Option<TableSchema>,
    },
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub id: Uuid,
    pub title: String,
    pub kind: TabKind,
    pub columns: Vec<ColumnMeta>,
    pub window: WindowedRows,
    pub viewport: Viewport,
}

impl Tab {
    fn column_names(&self) -> Vec<String> {
        match &self.kind {
            TabKind::Table {
                schema: Some(schema),
                ..
            } if !schema.columns.is_empty() => schema.column_names(),
            _ => self.columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Compiled WHERE body of a table tab
    pub fn where_clause(&self, dialect: Dialect) -> Option<String> {
        match &self.kind {
            TabKind::Table { filters, .. } => filters.build_where(&self.column_names(), dialect),
            TabKind::Query { .. } => None,
        }
    }

    /// Rendered ORDER BY body of a table tab
    pub fn order_by(&self, dialect: Dialect) -> Option<String> {
        let TabKind::Table {
            sort: Some(sort), ..
        } = &self.kind
        else {
            return None;
        };
        let names = self.column_names();
        let column = names.get(sort.column)?;
        Some(format!(
            "{} {}",
            dialect.quote_identifier(column),
            sort.direction.keyword()
        ))
    }

    /// Absolute index of the focused row
    pub fn cursor_row(&self) -> u64 {
        self.window.global_row(self.viewport.cursor)
    }

    pub fn focused_row(&self) -> Option<&Row> {
        self.window.row(self.viewport.cursor)
    }

    pub fn pk_columns(&self) -> Vec<usize> {
        find_pk_columns(self.schema(), &self.columns)
    }

    fn schema(&self) -> Option<&TableSchema> {
        match &self.kind {
            TabKind::Table { schema, .. } => schema.as_ref(),
            TabKind::Query { source_schema, .. } => source_schema.as_ref(),
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        match &self.kind {
            TabKind::Table { name, .. } => Some(name),
            TabKind::Query { .. } => None,
        }
    }

    /// Table that edits of this tab's rows are written to
    pub fn edit_target(&self) -> Option<&str> {
        match &self.kind {
            TabKind::Table { name, .. } => Some(name),
            TabKind::Query { source_table, .. } => source_table.as_deref(),
        }
    }

    /// Editor text of a query tab
    pub fn query_text(&self) -> Option<&str> {
        match &self.kind {
            TabKind::Query { buffer, .. } => Some(buffer.as_str()),
            TabKind::Table { .. } => None,
        }
    }
}

pub struct Workspace {
    connection: Arc<dyn Connection>,
    dialect: Dialect,
    pagination: PaginationSettings,
    filter_limits: FilterLimits,
    editor: EditorSettings,
    tabs: Vec<Tab>,
    active: Option<usize>,
    execution: AsyncOperation<ExecutionOutcome>,
    /// Tab the running execution reports to
    execution_target: Option<Uuid>,
    status: Option<String>,
}

impl Workspace {
    /// Must be called from within a tokio runtime.
    pub fn new(
        connection: Arc<dyn Connection>,
        pagination: PaginationSettings,
        filters: FilterSettings,
    ) -> ServiceResult<Self> {
        pagination
            .validate()
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
        let runtime = Handle::try_current()
            .map_err(|e| ServiceError::InvalidArgument(format!("no async runtime: {}", e)))?;
        let dialect = connection.dialect();
        Ok(Self {
            connection,
            dialect,
            pagination,
            filter_limits: FilterLimits {
                max_value_len: filters.max_value_len,
                max_in_list_items: filters.max_in_list_items,
            },
            editor: EditorSettings::default(),
            tabs: Vec::new(),
            active: None,
            execution: AsyncOperation::new(runtime),
            execution_target: None,
            status: None,
        })
    }

    /// Use `editor` for query tabs opened from now on.
    pub fn with_editor(mut self, editor: EditorSettings) -> ServiceResult<Self> {
        editor
            .validate()
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
        self.editor = editor;
        Ok(self)
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn current_tab(&self) -> Option<&Tab> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn current_tab_mut(&mut self) -> Option<&mut Tab> {
        self.active.and_then(|i| self.tabs.get_mut(i))
    }

    pub fn select_tab(&mut self, index: usize) -> ServiceResult<()> {
        if index >= self.tabs.len() {
            return Err(ServiceError::InvalidArgument(format!("no tab {}", index)));
        }
        self.active = Some(index);
        Ok(())
    }

    pub fn close_tab(&mut self, index: usize) -> Option<Tab> {
        if index >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(index);
        self.active = match self.tabs.len() {
            0 => None,
            len => Some(self.active.unwrap_or(0).min(len - 1)),
        };
        Some(tab)
    }

    /// Last user-facing message (row counts, non-fatal warnings, errors)
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(status = %message, "status updated");
        self.status = Some(message);
    }

    fn current_index(&self) -> ServiceResult<usize> {
        self.active
            .filter(|i| *i < self.tabs.len())
            .ok_or(ServiceError::NoActiveTab)
    }

    fn source_for(&self, tab: &Tab) -> Option<Box<dyn RowSource>> {
        match &tab.kind {
            TabKind::Table { name, .. } => Some(Box::new(TableRowSource::new(
                self.connection.clone(),
                name.clone(),
                tab.where_clause(self.dialect),
                tab.order_by(self.dialect),
            ))),
            TabKind::Query {
                paginated_base: Some(base),
                ..
            } => Some(Box::new(QueryRowSource::new(self.connection.clone(), base.clone()))),
            TabKind::Query { .. } => None,
        }
    }

    /// Open a table in a new tab and make it current.
    ///
    /// Schema and count failures are logged and leave the tab usable with
    /// reduced metadata; only the first page fetch is fatal.
    #[tracing::instrument(skip(self))]
    pub async fn open_table(&mut self, table: &str) -> ServiceResult<usize> {
        let schema = match self.connection.get_schema(table).await {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!("schema for {} unavailable, editing may be disabled: {}", table, e);
                None
            }
        };

        let mut tab = Tab {
            id: Uuid::new_v4(),
            title: table.to_string(),
            kind: TabKind::Table {
                name: table.to_string(),
                schema,
                filters: TableFilters::new(self.filter_limits),
                sort: None,
            },
            columns: Vec::new(),
            window: WindowedRows::new(self.pagination.page_size, None)?,
            viewport: Viewport::default(),
        };
        self.reload_table_tab(&mut tab).await?;

        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        self.active = Some(index);
        Ok(index)
    }

    /// Count with the tab's WHERE, then load the first page.
    async fn reload_table_tab(&mut self, tab: &mut Tab) -> ServiceResult<()> {
        let Some(table) = tab.table_name().map(str::to_string) else {
            return Ok(());
        };
        let where_clause = tab.where_clause(self.dialect);

        let total = match self
            .connection
            .count_rows(&table, where_clause.as_deref())
            .await
        {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!("COUNT(*) failed for {}, pagination total unavailable: {}", table, e);
                self.set_status(format!("Row count unavailable: {}", e));
                None
            }
        };

        let page = self
            .connection
            .query_page(
                &table,
                0,
                self.pagination.page_size,
                where_clause.as_deref(),
                tab.order_by(self.dialect).as_deref(),
            )
            .await
            .map_err(|e| ServiceError::LoadFailed(e.to_string()))?;

        if !page.columns.is_empty() || tab.columns.is_empty() {
            tab.columns = page.columns;
        }
        tab.window = WindowedRows::with_first_page(page.rows, self.pagination.page_size, total)?;
        tab.viewport = Viewport::default();
        tracing::debug!(table = %table, total = ?tab.window.total_rows(), "table loaded");
        Ok(())
    }

    /// Open an empty query tab and make it current.
    pub fn open_query_tab(&mut self) -> ServiceResult<usize> {
        self.tabs.push(Tab {
            id: Uuid::new_v4(),
            title: "Query".to_string(),
            kind: TabKind::Query {
                buffer: TextBuffer::new(self.editor.max_buffer_bytes),
                paginated_base: None,
                source_table: None,
                source_schema: None,
            },
            columns: Vec::new(),
            window: WindowedRows::new(self.pagination.page_size, Some(0))?,
            viewport: Viewport::default(),
        });
        let index = self.tabs.len() - 1;
        self.active = Some(index);
        Ok(index)
    }

    fn query_buffer_mut(&mut self) -> ServiceResult<&mut TextBuffer> {
        match self.current_tab_mut().map(|t| &mut t.kind) {
            Some(TabKind::Query { buffer, .. }) => Ok(buffer),
            Some(TabKind::Table { .. }) => Err(ServiceError::InvalidArgument(
                "the current tab has no editor".to_string(),
            )),
            None => Err(ServiceError::NoActiveTab),
        }
    }

    /// Replace the editor text of the current query tab, opening one when
    /// the current tab is not a query tab. Oversized text changes nothing.
    pub fn set_query_text(&mut self, text: &str) -> ServiceResult<()> {
        let buffer = TextBuffer::with_text(text, self.editor.max_buffer_bytes)?;
        let is_query_tab = matches!(
            self.current_tab().map(|t| &t.kind),
            Some(TabKind::Query { .. })
        );
        if !is_query_tab {
            self.open_query_tab()?;
        }
        *self.query_buffer_mut()? = buffer;
        Ok(())
    }

    pub fn insert_query_text(&mut self, offset: usize, text: &str) -> ServiceResult<()> {
        self.query_buffer_mut()?.insert_at(offset, text)?;
        Ok(())
    }

    pub fn delete_query_text(&mut self, start: usize, end: usize) -> ServiceResult<String> {
        Ok(self.query_buffer_mut()?.delete_range(start, end)?)
    }

    /// Put `text` in the query editor and start running all of it.
    ///
    /// The result lands in the query tab that was current when the run
    /// started, once `poll_execution` sees it complete.
    pub fn execute(&mut self, text: &str) -> ServiceResult<()> {
        if self.execution.is_running() {
            return Err(ServiceError::OperationRunning);
        }
        self.set_query_text(text)?;
        self.execute_buffer()
    }

    /// Run every statement in the current query tab's editor.
    pub fn execute_buffer(&mut self) -> ServiceResult<()> {
        let text = self.query_buffer_mut()?.as_str().to_string();
        self.start_execution(text)
    }

    /// Run only the statement under `cursor` in the current query tab.
    pub fn execute_statement_at(&mut self, cursor: usize) -> ServiceResult<()> {
        let statement = self.query_buffer_mut()?.statement_at(cursor);
        if statement.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "no statement at the cursor".to_string(),
            ));
        }
        self.start_execution(statement)
    }

    fn start_execution(&mut self, text: String) -> ServiceResult<()> {
        if self.execution.is_running() {
            return Err(ServiceError::OperationRunning);
        }
        let target = self.current_tab().map(|t| t.id).ok_or(ServiceError::NoActiveTab)?;

        let future = execute_text(self.connection.clone(), text, self.pagination.page_size);
        self.execution
            .start(future, self.connection.cancel_handle());
        self.execution_target = Some(target);
        self.set_status("Executing...");
        Ok(())
    }

    pub fn execution_state(&self) -> OperationState {
        self.execution.state()
    }

    pub fn cancel_execution(&mut self) -> bool {
        let cancelled = self.execution.cancel();
        if cancelled {
            self.execution.reset();
            self.execution_target = None;
            self.set_status("Query cancelled");
        }
        cancelled
    }

    /// Poll the running execution, applying its result on completion.
    pub fn poll_execution(&mut self) -> ServiceResult<OperationState> {
        let state = self.execution.poll();
        self.settle_execution(state)
    }

    /// Wait for the running execution and apply its result.
    pub async fn finish_execution(&mut self) -> ServiceResult<OperationState> {
        let state = self.execution.wait().await;
        self.settle_execution(state)
    }

    fn settle_execution(&mut self, state: OperationState) -> ServiceResult<OperationState> {
        match state {
            OperationState::Completed => {
                if let Some(outcome) = self.execution.take_result() {
                    self.apply_outcome(outcome)?;
                }
                Ok(OperationState::Completed)
            }
            OperationState::Error => {
                self.execution_target = None;
                let err = self
                    .execution
                    .take_error()
                    .unwrap_or_else(|| ServiceError::QueryFailed("unknown error".to_string()));
                self.set_status(err.to_string());
                Err(err)
            }
            OperationState::Cancelled => {
                self.execution.reset();
                self.execution_target = None;
                self.set_status("Query cancelled");
                Ok(OperationState::Cancelled)
            }
            other => Ok(other),
        }
    }

    fn apply_outcome(&mut self, outcome: ExecutionOutcome) -> ServiceResult<()> {
        let page_size = self.pagination.page_size;
        let summary = outcome.messages.join("; ");
        let target = self.execution_target.take();
        let Some(tab) = self.tabs.iter_mut().find(|t| Some(t.id) == target) else {
            tracing::debug!(?target, "result tab was closed, discarding result");
            self.set_status(format!("{} (result discarded, tab closed)", summary));
            return Ok(());
        };

        if let Some(result) = outcome.result {
            let window = match result.paginated_base {
                Some(_) => WindowedRows::with_first_page(result.rows, page_size, result.total_rows)?,
                None => WindowedRows::materialized(result.rows, page_size)?,
            };
            if let TabKind::Query {
                paginated_base,
                source_table,
                source_schema,
                ..
            } = &mut tab.kind
            {
                *paginated_base = result.paginated_base;
                *source_table = result.source_table;
                *source_schema = result.source_schema;
            }
            tab.columns = result.columns;
            tab.window = window;
            tab.viewport = Viewport::default();
        }
        self.set_status(format!("{} ({} ms)", summary, outcome.elapsed_ms));
        Ok(())
    }

    /// Move the cursor by `delta` rows, loading and trimming as needed.
    pub async fn move_cursor(&mut self, delta: i64) -> ServiceResult<()> {
        let index = self.current_index()?;
        let tab = &self.tabs[index];
        let current = tab.cursor_row();
        let last = match tab.window.total_rows() {
            Some(total) => total.saturating_sub(1),
            None => tab.window.global_row(tab.window.rows().len().saturating_sub(1)),
        };
        let target = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u64).min(last)
        };
        self.focus_row(index, target).await
    }

    /// Jump to an absolute row.
    pub async fn goto_row(&mut self, row: u64) -> ServiceResult<()> {
        let index = self.current_index()?;
        let window = &self.tabs[index].window;
        match window.total_rows() {
            Some(total) if row >= total => {
                return Err(ServiceError::InvalidArgument(format!(
                    "row {} is past the last row ({} rows)",
                    row + 1,
                    total
                )));
            }
            None if row >= window.global_row(window.rows().len()) => {
                return Err(ServiceError::CountUnavailable);
            }
            _ => {}
        }
        self.focus_row(index, row).await
    }

    pub async fn goto_home(&mut self) -> ServiceResult<()> {
        let index = self.current_index()?;
        self.focus_row(index, 0).await
    }

    pub async fn goto_end(&mut self) -> ServiceResult<()> {
        let index = self.current_index()?;
        let total = self.tabs[index]
            .window
            .total_rows()
            .ok_or(ServiceError::CountUnavailable)?;
        self.focus_row(index, total.saturating_sub(1)).await
    }

    async fn focus_row(&mut self, index: usize, target: u64) -> ServiceResult<()> {
        let source = self.source_for(&self.tabs[index]);
        let pagination = self.pagination;
        let tab = &mut self.tabs[index];

        if tab.window.is_empty() {
            return Ok(());
        }

        if tab.window.local_row(target).is_none() {
            let Some(source) = source.as_deref() else {
                return Ok(());
            };
            let page_start = target - target % pagination.page_size;
            tab.window
                .load_at(source, page_start)
                .await
                .map_err(|e| ServiceError::LoadFailed(e.to_string()))?;
            tab.viewport = Viewport::default();
        }

        let local = match tab.window.local_row(target) {
            Some(local) => local,
            None => tab.window.rows().len().saturating_sub(1),
        };
        tab.viewport.cursor = local;
        if tab.viewport.scroll > local {
            tab.viewport.scroll = local;
        }

        if let Some(source) = source.as_deref() {
            let direction = tab
                .window
                .load_more(source, &mut tab.viewport, pagination.load_threshold)
                .await
                .map_err(|e| ServiceError::LoadFailed(e.to_string()))?;
            if direction != LoadDirection::None {
                tracing::debug!(?direction, "prefetched page");
            }
        }

        let cursor = tab.cursor_row();
        tab.window.trim(
            cursor,
            pagination.max_loaded_pages,
            pagination.trim_distance_pages,
            &mut tab.viewport,
        );
        Ok(())
    }

    fn table_filters_mut(&mut self) -> ServiceResult<&mut TableFilters> {
        match self.current_tab_mut().map(|t| &mut t.kind) {
            Some(TabKind::Table { filters, .. }) => Ok(filters),
            Some(TabKind::Query { .. }) => Err(ServiceError::InvalidArgument(
                "filters apply to table tabs only".to_string(),
            )),
            None => Err(ServiceError::NoActiveTab),
        }
    }

    /// Add a filter to the current table tab and reload it.
    pub async fn add_filter(&mut self, filter: ColumnFilter) -> ServiceResult<()> {
        self.table_filters_mut()?.push(filter)?;
        self.refresh().await
    }

    pub async fn remove_filter(&mut self, index: usize) -> ServiceResult<()> {
        if self.table_filters_mut()?.remove(index).is_some() {
            self.refresh().await?;
        }
        Ok(())
    }

    pub async fn clear_filters(&mut self) -> ServiceResult<()> {
        self.table_filters_mut()?.clear();
        self.refresh().await
    }

    pub async fn set_sort(&mut self, sort: Option<SortSpec>) -> ServiceResult<()> {
        match self.current_tab_mut().map(|t| &mut t.kind) {
            Some(TabKind::Table { sort: current, .. }) => *current = sort,
            Some(TabKind::Query { .. }) => {
                return Err(ServiceError::InvalidArgument(
                    "sorting applies to table tabs only".to_string(),
                ));
            }
            None => return Err(ServiceError::NoActiveTab),
        }
        self.refresh().await
    }

    /// Recount and reload the current table tab from its first row.
    ///
    /// On failure the previous window stays in place. Query tabs are
    /// refreshed by executing them again.
    pub async fn refresh(&mut self) -> ServiceResult<()> {
        let index = self.current_index()?;
        if self.tabs[index].table_name().is_none() {
            return Err(ServiceError::InvalidArgument(
                "only table tabs can be refreshed; re-run the query instead".to_string(),
            ));
        }
        let mut tab = self.tabs[index].clone();
        self.reload_table_tab(&mut tab).await?;
        self.tabs[index] = tab;
        Ok(())
    }

    /// Write `value` into a cell of the current tab.
    ///
    /// Query results are editable when they read a single table and their
    /// key columns are known. The in-memory row changes only after the
    /// driver reports success.
    #[tracing::instrument(skip(self, value))]
    pub async fn update_cell(&mut self, local_row: usize, column: usize, value: Value) -> ServiceResult<()> {
        let index = self.current_index()?;
        let tab = &self.tabs[index];
        let table = edit_target(tab)?;
        let column_name = tab
            .columns
            .get(column)
            .map(|c| c.name.clone())
            .ok_or_else(|| ServiceError::InvalidArgument(format!("no column {}", column)))?;
        if let Some(schema) = tab.schema() {
            if schema.column(&column_name).is_none() {
                return Err(ServiceError::InvalidArgument(format!(
                    "{} is not a column of {}",
                    column_name, table
                )));
            }
        }
        let row = tab
            .window
            .row(local_row)
            .ok_or_else(|| ServiceError::InvalidArgument(format!("row {} is not loaded", local_row)))?;
        let pk = build_pk_info(row, &tab.columns, &tab.pk_columns())?;

        let affected = self
            .connection
            .update_cell(&table, &pk.names, &pk.values, &column_name, &value)
            .await
            .map_err(|e| match e {
                tuql_core::TuqlError::NoPrimaryKey(msg) => ServiceError::NoPrimaryKey(msg),
                other => ServiceError::UpdateFailed(other.to_string()),
            })?;
        if affected == 0 {
            return Err(ServiceError::RowNotFound(table));
        }

        if let Some(cell) = self.tabs[index]
            .window
            .row_mut(local_row)
            .and_then(|r| r.get_mut(column))
        {
            *cell = value;
        }
        self.set_status(format!("Updated {}.{}", table, column_name));
        Ok(())
    }

    /// Delete a row of the current tab.
    #[tracing::instrument(skip(self))]
    pub async fn delete_row(&mut self, local_row: usize) -> ServiceResult<()> {
        let index = self.current_index()?;
        let tab = &self.tabs[index];
        let table = edit_target(tab)?;
        let row = tab
            .window
            .row(local_row)
            .ok_or_else(|| ServiceError::InvalidArgument(format!("row {} is not loaded", local_row)))?;
        let pk = build_pk_info(row, &tab.columns, &tab.pk_columns())?;

        let affected = self
            .connection
            .delete_row(&table, &pk.names, &pk.values)
            .await
            .map_err(|e| match e {
                tuql_core::TuqlError::NoPrimaryKey(msg) => ServiceError::NoPrimaryKey(msg),
                other => ServiceError::DeleteFailed(other.to_string()),
            })?;
        if affected == 0 {
            return Err(ServiceError::RowNotFound(table));
        }

        let tab = &mut self.tabs[index];
        tab.window.remove_row(local_row, &mut tab.viewport);
        self.set_status(format!("Deleted 1 row from {}", table));
        Ok(())
    }
}

fn edit_target(tab: &Tab) -> ServiceResult<String> {
    tab.edit_target().map(str::to_string).ok_or_else(|| {
        ServiceError::NoPrimaryKey(
            "result does not come from a single table; editing is disabled".to_string(),
        )
    })
}
