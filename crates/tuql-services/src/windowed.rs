//! Windowed result cache
//!
//! A `WindowedRows` holds a contiguous slice `[loaded_offset, loaded_offset +
//! loaded_count)` of a logically unbounded row sequence. Pages are pulled
//! through a `RowSource`, appended or prepended as the cursor approaches an
//! edge, and trimmed back to a bounded number of pages around the cursor.
//!
//! Invariant: when `total_rows` is known, `loaded_offset + loaded_count <=
//! total_rows`. A fetch that returns more rows than the stored total bumps
//! the total rather than breaking the invariant.

use async_trait::async_trait;
use std::sync::Arc;
use tuql_core::{Connection, Result, Row, TuqlError};

/// Upper bound on rows held by one window
pub const MAX_WINDOW_ROWS: u64 = 1_000_000;

/// Supplies rows by absolute position
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Row>>;
}

/// Pages of a table, with the tab's WHERE and ORDER BY applied
pub struct TableRowSource {
    connection: Arc<dyn Connection>,
    table: String,
    where_clause: Option<String>,
    order_by: Option<String>,
}

impl TableRowSource {
    pub fn new(
        connection: Arc<dyn Connection>,
        table: impl Into<String>,
        where_clause: Option<String>,
        order_by: Option<String>,
    ) -> Self {
        Self {
            connection,
            table: table.into(),
            where_clause,
            order_by,
        }
    }
}

#[async_trait]
impl RowSource for TableRowSource {
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Row>> {
        let result = self
            .connection
            .query_page(
                &self.table,
                offset,
                limit,
                self.where_clause.as_deref(),
                self.order_by.as_deref(),
            )
            .await?;
        Ok(result.rows)
    }
}

/// Pages of an ad-hoc SELECT, fetched as `<stmt> LIMIT n OFFSET m`
pub struct QueryRowSource {
    connection: Arc<dyn Connection>,
    sql: String,
}

impl QueryRowSource {
    pub fn new(connection: Arc<dyn Connection>, sql: impl Into<String>) -> Self {
        Self {
            connection,
            sql: sql.into(),
        }
    }

    pub fn page_sql(sql: &str, offset: u64, limit: u64) -> String {
        format!("{} LIMIT {} OFFSET {}", sql, limit, offset)
    }
}

#[async_trait]
impl RowSource for QueryRowSource {
    #[tracing::instrument(skip(self), fields(sql_preview = %self.sql.chars().take(100).collect::<String>()))]
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Row>> {
        let sql = Self::page_sql(&self.sql, offset, limit);
        let result = self.connection.query(&sql, &[]).await?;
        Ok(result.rows)
    }
}

/// Window-relative cursor and scroll position of a tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub cursor: usize,
    pub scroll: usize,
}

impl Viewport {
    fn shift_forward(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_add(rows);
        self.scroll = self.scroll.saturating_add(rows);
    }

    fn shift_back(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows);
        self.scroll = self.scroll.saturating_sub(rows);
    }

    fn clamp_to(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        self.cursor = self.cursor.min(last);
        self.scroll = self.scroll.min(self.cursor);
    }
}

/// Which prefetch `check_load_more` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDirection {
    None,
    Forward,
    Backward,
}

fn limit_error(what: impl std::fmt::Display) -> TuqlError {
    TuqlError::ResourceLimit(what.to_string())
}

fn to_usize(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| limit_error(format!("{} rows do not fit in memory", n)))
}

#[derive(Debug, Clone)]
pub struct WindowedRows {
    rows: Vec<Row>,
    loaded_offset: u64,
    total_rows: Option<u64>,
    page_size: u64,
    end_reached: bool,
}

impl WindowedRows {
    /// Empty window. Fails when `page_size` is zero or above the window cap.
    pub fn new(page_size: u64, total_rows: Option<u64>) -> Result<Self> {
        if page_size == 0 {
            return Err(TuqlError::InvalidArgument("page size must be non-zero".into()));
        }
        if page_size > MAX_WINDOW_ROWS {
            return Err(limit_error(format!(
                "page size {} exceeds {} rows",
                page_size, MAX_WINDOW_ROWS
            )));
        }
        Ok(Self {
            rows: Vec::new(),
            loaded_offset: 0,
            total_rows,
            page_size,
            end_reached: false,
        })
    }

    /// Window over an already fetched first page.
    ///
    /// A short page with an unknown total marks the end as reached.
    pub fn with_first_page(rows: Vec<Row>, page_size: u64, total_rows: Option<u64>) -> Result<Self> {
        let mut window = Self::new(page_size, total_rows)?;
        if rows.len() as u64 > MAX_WINDOW_ROWS {
            return Err(limit_error(format!(
                "result of {} rows exceeds {} rows",
                rows.len(),
                MAX_WINDOW_ROWS
            )));
        }
        window.end_reached = (rows.len() as u64) < page_size;
        window.rows = rows;
        window.reconcile_total();
        Ok(window)
    }

    /// Window holding a complete, materialised result.
    pub fn materialized(rows: Vec<Row>, page_size: u64) -> Result<Self> {
        let total = rows.len() as u64;
        let mut window = Self::with_first_page(rows, page_size, Some(total))?;
        window.end_reached = true;
        Ok(window)
    }

    pub fn loaded_offset(&self) -> u64 {
        self.loaded_offset
    }

    pub fn loaded_count(&self) -> u64 {
        self.rows.len() as u64
    }

    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    pub fn set_total_rows(&mut self, total_rows: Option<u64>) {
        self.total_rows = total_rows;
        self.reconcile_total();
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, local: usize) -> Option<&Row> {
        self.rows.get(local)
    }

    pub fn row_mut(&mut self, local: usize) -> Option<&mut Row> {
        self.rows.get_mut(local)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Absolute position of a window-local row
    pub fn global_row(&self, local: usize) -> u64 {
        self.loaded_offset + local as u64
    }

    /// Window-local index of an absolute row, if loaded
    pub fn local_row(&self, global: u64) -> Option<usize> {
        let local = global.checked_sub(self.loaded_offset)?;
        if local < self.loaded_count() {
            usize::try_from(local).ok()
        } else {
            None
        }
    }

    fn loaded_end(&self) -> Result<u64> {
        self.loaded_offset
            .checked_add(self.loaded_count())
            .ok_or_else(|| limit_error("row offset overflow"))
    }

    /// Whether rows exist past the loaded edge
    pub fn has_more_forward(&self) -> bool {
        let Ok(end) = self.loaded_end() else {
            return false;
        };
        match self.total_rows {
            Some(total) => end < total,
            None => !self.end_reached,
        }
    }

    fn reconcile_total(&mut self) {
        if let (Some(total), Ok(end)) = (self.total_rows, self.loaded_end()) {
            if end > total {
                tracing::debug!(total, end, "fetched past stale total, bumping");
                self.total_rows = Some(end);
            }
        }
    }

    /// Replace the window with one page starting at `offset`.
    ///
    /// The offset is clamped so a known total is not overrun. On failure the
    /// previous window is kept.
    pub async fn load_at(&mut self, source: &dyn RowSource, offset: u64) -> Result<()> {
        let offset = match self.total_rows {
            Some(total) => offset.min(total.saturating_sub(self.page_size)),
            None => offset,
        };
        offset
            .checked_add(self.page_size)
            .ok_or_else(|| limit_error(format!("offset {} overflows", offset)))?;

        let rows = source.fetch(offset, self.page_size).await?;
        if rows.len() as u64 > MAX_WINDOW_ROWS {
            return Err(limit_error(format!("page of {} rows exceeds window cap", rows.len())));
        }

        tracing::debug!(offset, fetched = rows.len(), "window reloaded");
        self.end_reached = (rows.len() as u64) < self.page_size;
        self.rows = rows;
        self.loaded_offset = offset;
        self.reconcile_total();
        Ok(())
    }

    /// Append the next page. Returns `false` when there is nothing more.
    pub async fn extend_forward(&mut self, source: &dyn RowSource) -> Result<bool> {
        if !self.has_more_forward() {
            return Ok(false);
        }
        let end = self.loaded_end()?;
        let grown = self
            .loaded_count()
            .checked_add(self.page_size)
            .ok_or_else(|| limit_error("window size overflow"))?;
        if grown > MAX_WINDOW_ROWS {
            return Err(limit_error(format!("window would exceed {} rows", MAX_WINDOW_ROWS)));
        }

        let mut rows = source.fetch(end, self.page_size).await?;
        if rows.is_empty() {
            self.end_reached = true;
            return Ok(false);
        }
        rows.truncate(to_usize(self.page_size)?);
        if (rows.len() as u64) < self.page_size {
            self.end_reached = true;
        }

        tracing::debug!(from = end, fetched = rows.len(), "extended window forward");
        self.rows.append(&mut rows);
        self.reconcile_total();
        Ok(true)
    }

    /// Prepend up to one page ending at `loaded_offset`, shifting the viewport
    /// so it keeps pointing at the same rows.
    pub async fn extend_backward(
        &mut self,
        source: &dyn RowSource,
        viewport: &mut Viewport,
    ) -> Result<bool> {
        if self.loaded_offset == 0 {
            return Ok(false);
        }
        let want = self.page_size.min(self.loaded_offset);
        let grown = self
            .loaded_count()
            .checked_add(want)
            .ok_or_else(|| limit_error("window size overflow"))?;
        if grown > MAX_WINDOW_ROWS {
            return Err(limit_error(format!("window would exceed {} rows", MAX_WINDOW_ROWS)));
        }

        let start = self.loaded_offset - want;
        let mut rows = source.fetch(start, want).await?;
        rows.truncate(to_usize(want)?);
        if rows.is_empty() {
            return Ok(false);
        }

        let prepended = rows.len();
        if (prepended as u64) < want {
            // Rows before the window disappeared; the loaded rows no longer
            // follow the fetched ones, so the fetched page becomes the window.
            tracing::debug!(from = start, want, fetched = prepended, "short backward page, replacing window");
            self.rows = rows;
            self.loaded_offset = start;
            self.end_reached = false;
            viewport.cursor = prepended - 1;
            viewport.clamp_to(prepended);
            return Ok(true);
        }

        tracing::debug!(from = start, fetched = prepended, "extended window backward");
        self.rows.splice(0..0, rows);
        self.loaded_offset -= prepended as u64;
        viewport.shift_forward(prepended);
        Ok(true)
    }

    /// Release pages far from the cursor once the window exceeds
    /// `max_loaded_pages`. The cursor's page and `trim_distance_pages` pages on
    /// each side of it are kept. Returns whether anything was dropped.
    pub fn trim(
        &mut self,
        cursor_global_row: u64,
        max_loaded_pages: u64,
        trim_distance_pages: u64,
        viewport: &mut Viewport,
    ) -> bool {
        let count = self.loaded_count();
        let limit = max_loaded_pages.saturating_mul(self.page_size);
        if count <= limit || count == 0 {
            return false;
        }

        let cursor_local = cursor_global_row
            .saturating_sub(self.loaded_offset)
            .min(count - 1);
        let cursor_page = cursor_local / self.page_size;
        let total_pages = count.div_ceil(self.page_size);

        let first_page = cursor_page.saturating_sub(trim_distance_pages);
        let end_page = cursor_page
            .saturating_add(trim_distance_pages)
            .saturating_add(1)
            .min(total_pages);
        let keep_start = first_page * self.page_size;
        let keep_end = end_page.saturating_mul(self.page_size).min(count);

        // Both bounds are at most `count`, which indexes `rows`.
        let (keep_start, keep_end) = (keep_start as usize, keep_end as usize);
        if keep_end < self.rows.len() {
            self.rows.truncate(keep_end);
            self.end_reached = false;
        }
        if keep_start > 0 {
            self.rows.drain(..keep_start);
            self.loaded_offset += keep_start as u64;
            viewport.shift_back(keep_start);
        }
        viewport.clamp_to(self.rows.len());

        tracing::debug!(
            dropped = count - self.loaded_count(),
            loaded_offset = self.loaded_offset,
            "trimmed window"
        );
        true
    }

    /// Decide whether the cursor is close enough to an edge to prefetch.
    pub fn check_load_more(&self, cursor_local_row: usize, load_threshold: u64) -> LoadDirection {
        let remaining = self.loaded_count().saturating_sub(cursor_local_row as u64);
        if remaining < load_threshold && self.has_more_forward() {
            LoadDirection::Forward
        } else if (cursor_local_row as u64) < load_threshold && self.loaded_offset > 0 {
            LoadDirection::Backward
        } else {
            LoadDirection::None
        }
    }

    /// Run `check_load_more` for the viewport's cursor and perform the load.
    pub async fn load_more(
        &mut self,
        source: &dyn RowSource,
        viewport: &mut Viewport,
        load_threshold: u64,
    ) -> Result<LoadDirection> {
        let direction = self.check_load_more(viewport.cursor, load_threshold);
        let loaded = match direction {
            LoadDirection::Forward => self.extend_forward(source).await?,
            LoadDirection::Backward => self.extend_backward(source, viewport).await?,
            LoadDirection::None => false,
        };
        Ok(if loaded { direction } else { LoadDirection::None })
    }

    /// Drop a row after it was deleted at the source.
    pub fn remove_row(&mut self, local: usize, viewport: &mut Viewport) -> Option<Row> {
        if local >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(local);
        if let Some(total) = self.total_rows {
            self.total_rows = Some(total.saturating_sub(1));
        }
        viewport.clamp_to(self.rows.len());
        Some(row)
    }
}
