//! Integration tests for Workspace
//!
//! Drives table browsing, cursor movement, filters, edits and statement
//! execution against the MockConnection.

mod common;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tuql_core::{ColumnMeta, Connection, Dialect, QueryResult, Row, Value};
use tuql_query::{ColumnFilter, FilterOp};
use tuql_services::{OperationState, ServiceError, SortDirection, SortSpec, TabKind, Workspace};
use tuql_settings::EditorSettings;

use common::{MockConnection, items_table, logs_table, test_filters, test_pagination};

fn workspace(conn: &Arc<MockConnection>) -> Workspace {
    Workspace::new(conn.clone() as Arc<dyn Connection>, test_pagination(), test_filters())
        .expect("workspace")
}

fn focused_id(ws: &Workspace) -> i64 {
    ws.current_tab()
        .and_then(|t| t.focused_row())
        .and_then(|r| r.get(0))
        .and_then(Value::as_i64)
        .expect("focused row")
}

fn assert_window_invariants(ws: &Workspace) {
    let tab = ws.current_tab().expect("tab");
    let window = &tab.window;
    if let Some(total) = window.total_rows() {
        assert!(
            window.loaded_offset() + window.loaded_count() <= total,
            "window {}+{} overruns total {}",
            window.loaded_offset(),
            window.loaded_count(),
            total
        );
    }
    assert!(window.loaded_count() <= 5 * 100, "window holds {} rows", window.loaded_count());
    assert_eq!(focused_id(ws) as u64, tab.cursor_row());
}

// ============ open_table Tests ============

#[tokio::test]
async fn open_table_counts_then_loads_first_page() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1200)));
    let mut ws = workspace(&conn);

    ws.open_table("items").await.expect("open table");

    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.total_rows(), Some(1200));
    assert_eq!(tab.window.loaded_offset(), 0);
    assert_eq!(tab.window.loaded_count(), 100);
    assert_eq!(tab.columns.len(), 2);
    assert_eq!(
        conn.query_log(),
        vec![
            "SELECT COUNT(*) FROM \"items\"".to_string(),
            "SELECT * FROM \"items\" LIMIT 100 OFFSET 0".to_string(),
        ]
    );
}

#[tokio::test]
async fn count_failure_is_non_fatal() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(250))
            .with_failure_on("COUNT(*)"),
    );
    let mut ws = workspace(&conn);

    ws.open_table("items").await.expect("open despite count failure");
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.total_rows(), None);
    assert_eq!(tab.window.loaded_count(), 100);
    assert!(ws.status().unwrap().contains("Row count unavailable"));

    assert!(matches!(ws.goto_end().await, Err(ServiceError::CountUnavailable)));
    assert!(matches!(ws.goto_row(150).await, Err(ServiceError::CountUnavailable)));
}

#[tokio::test]
async fn unknown_total_scrolls_to_the_end() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(250))
            .with_failure_on("COUNT(*)"),
    );
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    for _ in 0..300 {
        ws.move_cursor(1).await.unwrap();
    }
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.cursor_row(), 249);
    assert!(tab.window.end_reached());
    assert_eq!(focused_id(&ws), 249);
}

#[tokio::test]
async fn schema_failure_is_non_fatal_but_blocks_edits() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(10))
            .with_schema_failure(),
    );
    let mut ws = workspace(&conn);

    ws.open_table("items").await.expect("open despite schema failure");
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 10);

    let err = ws
        .update_cell(0, 1, Value::String("x".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NoPrimaryKey(_)));
    assert!(conn.execute_log().is_empty());
}

#[tokio::test]
async fn open_missing_table_fails() {
    let conn = Arc::new(MockConnection::new("db"));
    let mut ws = workspace(&conn);
    assert!(ws.open_table("ghost").await.is_err());
    assert!(ws.current_tab().is_none());
}

// ============ Cursor movement Tests ============

#[tokio::test]
async fn scrolling_prefetches_and_trims() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1200)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    for _ in 0..700 {
        ws.move_cursor(1).await.unwrap();
        assert_window_invariants(&ws);
    }

    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.cursor_row(), 700);
    assert!(tab.window.loaded_offset() > 0, "front pages should have been trimmed");
    assert!(conn.logged("LIMIT 100 OFFSET 700"));
}

#[tokio::test]
async fn scrolling_back_up_prepends_pages() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1200)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.goto_row(800).await.unwrap();
    assert_window_invariants(&ws);
    for _ in 0..300 {
        ws.move_cursor(-1).await.unwrap();
        assert_window_invariants(&ws);
    }
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 500);
    assert_eq!(focused_id(&ws), 500);
}

#[tokio::test]
async fn goto_end_and_home() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1234)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.goto_end().await.unwrap();
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 1233);
    assert_eq!(focused_id(&ws), 1233);
    assert_window_invariants(&ws);

    ws.goto_home().await.unwrap();
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 0);
    assert_eq!(focused_id(&ws), 0);
}

#[tokio::test]
async fn goto_row_past_total_is_rejected() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(50)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    let err = ws.goto_row(50).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 0);
}

#[tokio::test]
async fn cursor_moves_are_clamped() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(30)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.move_cursor(-5).await.unwrap();
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 0);
    ws.move_cursor(1000).await.unwrap();
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 29);
}

#[tokio::test]
async fn no_active_tab() {
    let conn = Arc::new(MockConnection::new("db"));
    let mut ws = workspace(&conn);
    assert!(matches!(ws.move_cursor(1).await, Err(ServiceError::NoActiveTab)));
    assert!(matches!(ws.goto_end().await, Err(ServiceError::NoActiveTab)));
}

// ============ Filter and sort Tests ============

#[tokio::test]
async fn filter_recounts_and_reloads() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1200)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();
    ws.goto_row(600).await.unwrap();

    ws.add_filter(ColumnFilter::new(1, FilterOp::Contains, "O'Brien"))
        .await
        .unwrap();

    assert!(conn.logged("SELECT COUNT(*) FROM \"items\" WHERE \"name\" LIKE '%O''Brien%'"));
    assert!(conn.logged(
        "SELECT * FROM \"items\" WHERE \"name\" LIKE '%O''Brien%' LIMIT 100 OFFSET 0"
    ));
    assert_eq!(ws.current_tab().unwrap().cursor_row(), 0);
    assert_eq!(ws.current_tab().unwrap().window.loaded_offset(), 0);
}

#[tokio::test]
async fn oversized_filter_is_rejected_without_queries() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();
    let queries_before = conn.query_log().len();

    let err = ws
        .add_filter(ColumnFilter::new(1, FilterOp::Eq, "x".repeat(5000)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ResourceLimit(_)));
    assert_eq!(conn.query_log().len(), queries_before);

    let TabKind::Table { filters, .. } = &ws.current_tab().unwrap().kind else {
        panic!("expected a table tab");
    };
    assert!(filters.is_empty());
}

#[tokio::test]
async fn regex_filter_uses_postgres_operator() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_dialect(Dialect::Postgres)
            .with_table(items_table(10)),
    );
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();
    ws.add_filter(ColumnFilter::new(1, FilterOp::Regex, "^item-[0-3]$"))
        .await
        .unwrap();
    assert!(conn.logged("WHERE \"name\" ~ '^item-[0-3]$'"));
}

#[tokio::test]
async fn clearing_filters_reloads_unfiltered() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();
    ws.add_filter(ColumnFilter::new(0, FilterOp::Gt, "3")).await.unwrap();
    ws.clear_filters().await.unwrap();

    let last = conn.query_log().last().cloned().unwrap();
    assert_eq!(last, "SELECT * FROM \"items\" LIMIT 100 OFFSET 0");
}

#[tokio::test]
async fn sort_renders_order_by() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();
    ws.set_sort(Some(SortSpec {
        column: 0,
        direction: SortDirection::Descending,
    }))
    .await
    .unwrap();
    assert!(conn.logged("SELECT * FROM \"items\" ORDER BY \"id\" DESC LIMIT 100 OFFSET 0"));
}

// ============ Edit Tests ============

#[tokio::test]
async fn update_cell_patches_row_after_success() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.update_cell(3, 1, Value::String("renamed".into()))
        .await
        .unwrap();

    assert_eq!(
        conn.execute_log(),
        vec![(
            "UPDATE \"items\" SET \"name\" = ? WHERE \"id\" = ?".to_string(),
            vec![Value::String("renamed".into()), Value::Int64(3)],
        )]
    );
    let row = ws.current_tab().unwrap().window.row(3).unwrap();
    assert_eq!(row.get(1), Some(&Value::String("renamed".into())));
}

#[tokio::test]
async fn failed_update_leaves_row_untouched() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(10))
            .with_failure_on("UPDATE"),
    );
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    let err = ws
        .update_cell(3, 1, Value::String("renamed".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UpdateFailed(_)));
    let row = ws.current_tab().unwrap().window.row(3).unwrap();
    assert_eq!(row.get(1), Some(&Value::String("item-3".into())));
}

#[tokio::test]
async fn update_of_vanished_row_reports_not_found() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(10))
            .with_affected_rows(0),
    );
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    let err = ws.update_cell(2, 1, Value::Null).await.unwrap_err();
    assert!(matches!(err, ServiceError::RowNotFound(_)));
    let row = ws.current_tab().unwrap().window.row(2).unwrap();
    assert_eq!(row.get(1), Some(&Value::String("item-2".into())));
}

#[tokio::test]
async fn delete_row_removes_and_decrements_total() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.delete_row(4).await.unwrap();

    assert_eq!(
        conn.execute_log(),
        vec![(
            "DELETE FROM \"items\" WHERE \"id\" = ?".to_string(),
            vec![Value::Int64(4)],
        )]
    );
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.total_rows(), Some(9));
    assert_eq!(tab.window.loaded_count(), 9);
    assert_eq!(tab.window.row(4).and_then(|r| r.get(0)), Some(&Value::Int64(5)));
}

#[tokio::test]
async fn table_without_key_blocks_mutation_but_not_reads() {
    let conn = Arc::new(MockConnection::new("db").with_table(logs_table(20)));
    let mut ws = workspace(&conn);
    ws.open_table("logs").await.unwrap();
    assert!(ws.current_tab().unwrap().pk_columns().is_empty());

    let err = ws.update_cell(0, 0, Value::String("x".into())).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoPrimaryKey(_)));
    let err = ws.delete_row(0).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoPrimaryKey(_)));
    assert!(conn.execute_log().is_empty());

    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.loaded_count(), 20);
    assert_eq!(tab.window.total_rows(), Some(20));
    ws.move_cursor(5).await.unwrap();
}

// ============ Execution Tests ============

#[tokio::test]
async fn paginated_select_uses_count_wrapper() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(1200)));
    let mut ws = workspace(&conn);

    ws.execute("SELECT * FROM items").unwrap();
    assert_eq!(ws.finish_execution().await.unwrap(), OperationState::Completed);

    assert!(conn.logged("SELECT COUNT(*) FROM (SELECT * FROM items) AS wrapper"));
    assert!(conn.logged("SELECT * FROM items LIMIT 100 OFFSET 0"));

    let tab = ws.current_tab().unwrap();
    assert!(matches!(
        &tab.kind,
        TabKind::Query { paginated_base: Some(base), .. } if base == "SELECT * FROM items"
    ));
    assert_eq!(tab.window.total_rows(), Some(1200));
    assert_eq!(tab.window.loaded_count(), 100);

    ws.goto_row(750).await.unwrap();
    assert!(conn.logged("SELECT * FROM items LIMIT 100 OFFSET 700"));
    assert_eq!(focused_id(&ws), 750);
}

#[tokio::test]
async fn multi_statement_last_result_wins() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(50)));
    let mut ws = workspace(&conn);

    ws.execute("UPDATE items SET name = 'x' WHERE id = 1;\nSELECT * FROM items LIMIT 5;")
        .unwrap();
    assert_eq!(ws.finish_execution().await.unwrap(), OperationState::Completed);

    assert_eq!(conn.execute_log().len(), 1);
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.total_rows(), Some(5));
    assert_eq!(tab.window.loaded_count(), 5);
    assert!(ws.status().unwrap().contains("1 rows affected"));
}

#[tokio::test]
async fn execution_error_keeps_previous_result() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(50)));
    let mut ws = workspace(&conn);
    ws.execute("SELECT * FROM items LIMIT 3").unwrap();
    ws.finish_execution().await.unwrap();

    ws.execute("SELECT * FROM no_such_table").unwrap();
    let err = ws.finish_execution().await.unwrap_err();
    assert!(matches!(err, ServiceError::QueryFailed(_)));
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 3);
    assert_eq!(ws.execution_state(), OperationState::Idle);
}

#[tokio::test]
async fn execute_from_table_tab_opens_query_tab() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(5)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.execute("SELECT * FROM items LIMIT 2").unwrap();
    ws.finish_execution().await.unwrap();

    assert_eq!(ws.tabs().len(), 2);
    assert!(matches!(ws.current_tab().unwrap().kind, TabKind::Query { .. }));
    assert!(matches!(ws.tabs()[0].kind, TabKind::Table { .. }));
}

#[tokio::test]
async fn second_execute_refused_and_cancel_interrupts_driver() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(5))
            .with_delay(Duration::from_secs(60)),
    );
    let mut ws = workspace(&conn);

    ws.execute("SELECT * FROM items").unwrap();
    assert_eq!(ws.poll_execution().unwrap(), OperationState::Running);
    assert!(matches!(ws.execute("SELECT 1"), Err(ServiceError::OperationRunning)));

    assert!(ws.cancel_execution());
    assert_eq!(conn.cancel.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ws.execution_state(), OperationState::Idle);
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 0);
}

#[tokio::test]
async fn empty_buffer_is_an_error() {
    let conn = Arc::new(MockConnection::new("db"));
    let mut ws = workspace(&conn);
    ws.execute(" ;; ").unwrap();
    assert!(matches!(
        ws.finish_execution().await,
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn result_lands_in_starting_tab_after_focus_moves() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(100)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.execute("SELECT * FROM items LIMIT 2").unwrap();
    ws.select_tab(0).unwrap();
    assert_eq!(ws.finish_execution().await.unwrap(), OperationState::Completed);

    let table_tab = &ws.tabs()[0];
    assert!(matches!(table_tab.kind, TabKind::Table { .. }));
    assert_eq!(table_tab.window.loaded_count(), 100);
    assert_eq!(ws.current_tab().unwrap().id, table_tab.id);

    let query_tab = &ws.tabs()[1];
    assert_eq!(query_tab.window.loaded_count(), 2);
    assert_eq!(query_tab.query_text(), Some("SELECT * FROM items LIMIT 2"));
}

#[tokio::test]
async fn result_for_closed_tab_is_discarded() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(100)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    ws.execute("SELECT * FROM items LIMIT 2").unwrap();
    ws.close_tab(1).unwrap();
    assert_eq!(ws.finish_execution().await.unwrap(), OperationState::Completed);

    assert_eq!(ws.tabs().len(), 1);
    assert_eq!(ws.tabs()[0].window.loaded_count(), 100);
    assert!(ws.status().unwrap().contains("discarded"));
}

#[tokio::test]
async fn executed_select_rows_edit_through_result_key_flags() {
    // No schema: only the key flags on the result identify rows.
    let page = QueryResult::from_rows(
        vec![
            ColumnMeta::new("id", "INTEGER", 0).primary_key(),
            ColumnMeta::new("name", "TEXT", 1),
        ],
        (0..3)
            .map(|i| Row::new(vec![Value::Int64(i), Value::String(format!("item-{}", i))]))
            .collect(),
    );
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(10))
            .with_schema_failure()
            .with_query_response("LIMIT 100 OFFSET 0", page),
    );
    let mut ws = workspace(&conn);
    ws.execute("SELECT * FROM items").unwrap();
    ws.finish_execution().await.unwrap();
    assert_eq!(ws.current_tab().unwrap().edit_target(), Some("items"));

    ws.update_cell(1, 1, Value::String("renamed".into()))
        .await
        .unwrap();
    ws.delete_row(0).await.unwrap();

    assert_eq!(
        conn.execute_log(),
        vec![
            (
                "UPDATE \"items\" SET \"name\" = ? WHERE \"id\" = ?".to_string(),
                vec![Value::String("renamed".into()), Value::Int64(1)],
            ),
            (
                "DELETE FROM \"items\" WHERE \"id\" = ?".to_string(),
                vec![Value::Int64(0)],
            ),
        ]
    );
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.total_rows(), Some(9));
    assert_eq!(tab.window.row(0).and_then(|r| r.get(1)), Some(&Value::String("renamed".into())));
}

#[tokio::test]
async fn executed_select_uses_source_schema_for_keys() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.execute("SELECT * FROM items WHERE id > 2").unwrap();
    ws.finish_execution().await.unwrap();

    let tab = ws.current_tab().unwrap();
    assert!(tab.columns.iter().all(|c| !c.is_primary_key));
    assert_eq!(tab.pk_columns(), vec![0]);

    ws.delete_row(2).await.unwrap();
    assert_eq!(
        conn.execute_log(),
        vec![("DELETE FROM \"items\" WHERE \"id\" = ?".to_string(), vec![Value::Int64(2)])]
    );
}

#[tokio::test]
async fn joined_result_is_not_editable() {
    let conn = Arc::new(
        MockConnection::new("db")
            .with_table(items_table(10))
            .with_table(logs_table(10)),
    );
    let mut ws = workspace(&conn);
    ws.execute("SELECT * FROM items JOIN logs ON 1 = 1 LIMIT 3").unwrap();
    ws.finish_execution().await.unwrap();
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 3);

    let err = ws.update_cell(0, 1, Value::String("x".into())).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoPrimaryKey(_)));
    let err = ws.delete_row(0).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoPrimaryKey(_)));
    assert!(conn.execute_log().is_empty());
}

#[tokio::test]
async fn refresh_on_query_tab_is_rejected() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.execute("SELECT * FROM items LIMIT 2").unwrap();
    ws.finish_execution().await.unwrap();
    let queries = conn.query_log().len();

    assert!(matches!(ws.refresh().await, Err(ServiceError::InvalidArgument(_))));
    assert_eq!(conn.query_log().len(), queries);
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 2);
}

// ============ Editor Tests ============

#[tokio::test]
async fn execute_statement_under_cursor_only() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    let text = "SELECT * FROM items LIMIT 2;\nSELECT * FROM items LIMIT 4;";
    ws.set_query_text(text).unwrap();

    ws.execute_statement_at(text.find("LIMIT 4").unwrap()).unwrap();
    ws.finish_execution().await.unwrap();

    assert!(conn.logged("LIMIT 4"));
    assert!(!conn.logged("LIMIT 2"));
    let tab = ws.current_tab().unwrap();
    assert_eq!(tab.window.loaded_count(), 4);
    assert_eq!(tab.query_text(), Some(text));
}

#[tokio::test]
async fn query_text_edits_and_buffer_limit() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn)
        .with_editor(EditorSettings { max_buffer_bytes: 32 })
        .unwrap();

    let err = ws
        .set_query_text("SELECT * FROM items WHERE name = 'far too long'")
        .unwrap_err();
    assert!(matches!(err, ServiceError::ResourceLimit(_)));
    assert!(ws.tabs().is_empty());

    ws.set_query_text("SELECT * FROM items").unwrap();
    ws.insert_query_text(19, " LIMIT 3").unwrap();
    assert!(matches!(
        ws.insert_query_text(0, "SELECT * FROM items; "),
        Err(ServiceError::ResourceLimit(_))
    ));
    assert_eq!(ws.delete_query_text(0, 9).unwrap(), "SELECT * ");
    ws.insert_query_text(0, "SELECT * ").unwrap();
    assert_eq!(ws.current_tab().unwrap().query_text(), Some("SELECT * FROM items LIMIT 3"));

    ws.execute_buffer().unwrap();
    ws.finish_execution().await.unwrap();
    assert_eq!(ws.current_tab().unwrap().window.loaded_count(), 3);
}

#[tokio::test]
async fn table_tab_has_no_editor() {
    let conn = Arc::new(MockConnection::new("db").with_table(items_table(10)));
    let mut ws = workspace(&conn);
    ws.open_table("items").await.unwrap();

    assert!(matches!(ws.execute_statement_at(0), Err(ServiceError::InvalidArgument(_))));
    assert!(matches!(ws.insert_query_text(0, "x"), Err(ServiceError::InvalidArgument(_))));
    assert_eq!(ws.tabs().len(), 1);
}
