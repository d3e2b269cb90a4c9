//! tuql Query - pure SQL text utilities
//!
//! Nothing in this crate performs I/O. It provides:
//!
//! - statement segmentation of an editor buffer (`split_statements`, `statement_at`)
//! - compilation of column filters into a dialect-aware WHERE body (`build_where`)
//! - statement classification used to decide how a statement is executed, and
//!   resolution of the single table a query reads (`single_table_source`)
//! - `TextBuffer`, the owned editable query text

mod classify;
mod filter;
mod segmenter;
mod text_buffer;

pub use classify::{StatementKind, classify_statement, single_table_source};
pub use filter::{ColumnFilter, ColumnRef, FilterLimits, FilterOp, TableFilters, build_where};
pub use segmenter::{split_statements, statement_at, statement_bounds_at};
pub use text_buffer::TextBuffer;
