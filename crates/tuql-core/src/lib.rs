//! tuql Core - shared abstractions for the terminal database client
//!
//! This crate provides the fundamental traits and types that all other
//! tuql crates depend on. It defines:
//!
//! - `DatabaseDriver` - Trait for database driver implementations
//! - `Connection` - Trait for database connections (the data-fetch collaborator)
//! - `Dialect` - SQL dialect selected once per connection
//! - Common types like `Value`, `Row`, `ColumnMeta`, `TableSchema`, etc.

mod connection;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
