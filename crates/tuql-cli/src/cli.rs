//! tuql CLI
//!
//! Non-interactive front end over the service layer: list tables, print one
//! page of a table with filters applied, or run a SQL script and print the
//! first page of its last result.
//!
//! ```text
//! tuql app.db tables
//! tuql app.db browse users --offset 1000 --filter "name=contains:ann" --sort id:desc
//! tuql app.db exec "UPDATE users SET active = 0 WHERE id = 3; SELECT * FROM users"
//! tuql app.db exec --at 40 "SELECT * FROM users; SELECT * FROM orders"
//! ```

mod logging;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tuql_core::{Connection, DatabaseDriver};
use tuql_driver_sqlite::SqliteDriver;
use tuql_query::{ColumnFilter, FilterOp};
use tuql_services::{OperationState, SortDirection, SortSpec, Tab, Workspace};
use tuql_settings::TuqlSettings;

use logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "tuql", about = "Terminal client for browsing and editing SQL databases", version)]
struct Cli {
    /// Database to open (SQLite file path or :memory:)
    #[arg(env = "TUQL_DATABASE")]
    database: String,

    /// Settings file; defaults to <config dir>/tuql/settings.json
    #[arg(long, env = "TUQL_SETTINGS")]
    settings: Option<PathBuf>,

    /// Override the configured page size
    #[arg(long)]
    page_size: Option<u64>,

    /// Verbose console logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only write JSON log files, nothing on the console
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables and views
    Tables,
    /// Print the page of a table containing a row
    Browse {
        table: String,
        /// Absolute row to jump to
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Filter as `column=op:value`, e.g. `age=gt:30`, `email=notnull`, `id=between:10,20`
        #[arg(long = "filter", value_name = "FILTER")]
        filters: Vec<String>,
        /// Sort as `column[:asc|:desc]`
        #[arg(long)]
        sort: Option<String>,
    },
    /// Run SQL statements separated by `;`
    Exec {
        sql: String,
        /// Run only the statement containing this byte offset
        #[arg(long, value_name = "OFFSET")]
        at: Option<usize>,
    },
}

/// A `--filter` argument before column names are resolved
#[derive(Debug, PartialEq)]
struct FilterArg {
    column: String,
    operator: FilterOp,
    value: String,
    value2: Option<String>,
}

fn parse_filter(arg: &str) -> Result<FilterArg> {
    let (column, rest) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("filter '{}' is not column=op:value", arg))?;
    let (op_name, value) = rest.split_once(':').unwrap_or((rest, ""));
    let operator = FilterOp::from_name(op_name.trim()).ok_or_else(|| {
        let known: Vec<_> = FilterOp::all().iter().map(|op| op.name()).collect();
        anyhow!("unknown filter operator '{}' (expected one of {})", op_name, known.join(", "))
    })?;

    if operator.requires_two_values() {
        let (low, high) = value
            .split_once(',')
            .ok_or_else(|| anyhow!("between expects low,high in '{}'", arg))?;
        return Ok(FilterArg {
            column: column.trim().to_string(),
            operator,
            value: low.trim().to_string(),
            value2: Some(high.trim().to_string()),
        });
    }
    if operator.requires_value() && value.is_empty() {
        bail!("filter '{}' needs a value", arg);
    }
    Ok(FilterArg {
        column: column.trim().to_string(),
        operator,
        value: value.to_string(),
        value2: None,
    })
}

fn parse_sort(arg: &str) -> Result<(String, SortDirection)> {
    let (column, direction) = arg.split_once(':').unwrap_or((arg, "asc"));
    let direction = match direction.to_ascii_lowercase().as_str() {
        "asc" => SortDirection::Ascending,
        "desc" => SortDirection::Descending,
        other => bail!("sort direction must be asc or desc, got '{}'", other),
    };
    Ok((column.trim().to_string(), direction))
}

fn column_index(tab: &Tab, name: &str) -> Result<usize> {
    tab.columns
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("no column '{}' in {}", name, tab.title))
}

/// Render the loaded rows of the cursor's page.
fn render_page(tab: &Tab, page_size: u64) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(tab.columns.iter().map(|c| c.name.clone()));

    let start = tab.viewport.cursor;
    let end = (start as u64 + page_size).min(tab.window.loaded_count()) as usize;
    for row in &tab.window.rows()[start..end] {
        table.add_row(row.values.iter().map(ToString::to_string));
    }
    table
}

fn print_footer(tab: &Tab, shown: usize) {
    let first = tab.cursor_row();
    let total = match tab.window.total_rows() {
        Some(total) => total.to_string(),
        None => "?".to_string(),
    };
    if shown == 0 {
        println!("0 rows shown of {}", total);
    } else {
        println!("rows {}-{} of {}", first + 1, first + shown as u64, total);
    }
}

async fn cmd_tables(conn: &Arc<dyn Connection>) -> Result<()> {
    let tables = conn.list_tables().await.context("Failed to list tables")?;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec!["table"]);
    for name in &tables {
        table.add_row(vec![name.as_str()]);
    }
    println!("{table}");
    Ok(())
}

async fn cmd_browse(
    ws: &mut Workspace,
    page_size: u64,
    table_name: &str,
    offset: u64,
    filters: &[String],
    sort: Option<&str>,
) -> Result<()> {
    ws.open_table(table_name)
        .await
        .with_context(|| format!("Failed to open {}", table_name))?;

    for arg in filters {
        let parsed = parse_filter(arg)?;
        let tab = ws.current_tab().context("no table open")?;
        let column = column_index(tab, &parsed.column)?;
        let filter = match parsed.value2 {
            Some(high) => ColumnFilter::between(column, parsed.value, high),
            None => ColumnFilter::new(column, parsed.operator, parsed.value),
        };
        ws.add_filter(filter).await?;
    }

    if let Some(sort) = sort {
        let (name, direction) = parse_sort(sort)?;
        let tab = ws.current_tab().context("no table open")?;
        let column = column_index(tab, &name)?;
        ws.set_sort(Some(SortSpec { column, direction })).await?;
    }

    if offset > 0 {
        ws.goto_row(offset).await?;
    }

    let tab = ws.current_tab().context("no table open")?;
    let table = render_page(tab, page_size);
    let shown = table.row_iter().count();
    println!("{table}");
    print_footer(tab, shown);
    if let Some(status) = ws.status() {
        eprintln!("{}", status);
    }
    Ok(())
}

async fn cmd_exec(ws: &mut Workspace, page_size: u64, sql: &str, at: Option<usize>) -> Result<()> {
    ws.set_query_text(sql)?;
    match at {
        Some(offset) => ws.execute_statement_at(offset)?,
        None => ws.execute_buffer()?,
    }

    // Ctrl-C interrupts the running statement instead of killing the process.
    let state = loop {
        match ws.poll_execution()? {
            OperationState::Running => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(20)) => {}
                    _ = tokio::signal::ctrl_c() => {
                        ws.cancel_execution();
                    }
                }
            }
            state => break state,
        }
    };

    // A cancel resets the operation, so the next poll reports Idle.
    if state != OperationState::Completed {
        bail!("query cancelled");
    }

    let tab = ws.current_tab().context("no result tab")?;
    if !tab.columns.is_empty() {
        let table = render_page(tab, page_size);
        let shown = table.row_iter().count();
        println!("{table}");
        print_footer(tab, shown);
    }
    if let Some(status) = ws.status() {
        println!("{}", status);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => TuqlSettings::load_from(path)?,
        None => TuqlSettings::load()?,
    };

    let logging_config = if cli.verbose {
        LoggingConfig::development()
    } else if cli.quiet {
        LoggingConfig::production()
    } else {
        LoggingConfig::from_settings(&settings.logging)
    };
    let _log_guard = logging::init(logging_config)?;

    let mut pagination = settings.pagination;
    if let Some(page_size) = cli.page_size {
        pagination.page_size = page_size;
    }
    pagination.validate()?;

    let conn = SqliteDriver::new()
        .connect(&cli.database)
        .await
        .with_context(|| format!("Failed to open {}", cli.database))?;
    tracing::info!(database = %cli.database, driver = conn.driver_name(), "connected");

    let result = match &cli.command {
        Commands::Tables => cmd_tables(&conn).await,
        Commands::Browse {
            table,
            offset,
            filters,
            sort,
        } => {
            let mut ws = Workspace::new(conn.clone(), pagination, settings.filters)?;
            cmd_browse(&mut ws, pagination.page_size, table, *offset, filters, sort.as_deref()).await
        }
        Commands::Exec { sql, at } => {
            let mut ws = Workspace::new(conn.clone(), pagination, settings.filters)?
                .with_editor(settings.editor)?;
            cmd_exec(&mut ws, pagination.page_size, sql, *at).await
        }
    };

    conn.close().await?;
    result
}
