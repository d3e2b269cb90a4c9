//! Database driver trait definition

use crate::{Connection, Dialect, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// A database driver produces connections from a path or URL.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Driver identifier (e.g., "sqlite")
    fn name(&self) -> &'static str;

    /// Dialect of every connection this driver produces
    fn dialect(&self) -> Dialect;

    /// Open a connection. Interpretation of `connection_string` is driver-specific.
    async fn connect(&self, connection_string: &str) -> Result<Arc<dyn Connection>>;
}
