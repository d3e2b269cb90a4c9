//! tuql Services Layer
//!
//! Sits between a front end and the driver collaborator. Everything that makes
//! browsing large results feasible lives here:
//!
//! - [`WindowedRows`] - bounded window over a row sequence with prefetch and trim
//! - [`find_pk_columns`] / [`build_pk_info`] - row identity for edits and deletes
//! - [`AsyncOperation`] - background execution polled from the interaction loop
//! - [`Workspace`] - tabs, cursor movement, filters and the execution flow
//!
//! Services never render anything; they return data and status messages.

mod async_op;
mod error;
mod execution;
mod row_identity;
mod windowed;
mod workspace;

pub use async_op::{AsyncOperation, OperationState};
pub use error::{ServiceError, ServiceResult};
pub use execution::{
    ExecutedResult, ExecutionOutcome, ExecutionPlan, count_wrapper_sql, execute_text,
    plan_execution,
};
pub use row_identity::{PkInfo, build_pk_info, find_pk_columns};
pub use windowed::{
    LoadDirection, MAX_WINDOW_ROWS, QueryRowSource, RowSource, TableRowSource, Viewport,
    WindowedRows,
};
pub use workspace::{SortDirection, SortSpec, Tab, TabKind, Workspace};
