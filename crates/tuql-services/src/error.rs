use thiserror::Error;
use tuql_core::TuqlError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Loading rows failed: {0}")]
    LoadFailed(String),

    #[error("Cell update failed: {0}")]
    UpdateFailed(String),

    #[error("Row delete failed: {0}")]
    DeleteFailed(String),

    #[error("Cannot identify row: {0}")]
    NoPrimaryKey(String),

    #[error("Row no longer exists in {0}")]
    RowNotFound(String),

    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Row count unavailable for this result")]
    CountUnavailable,

    #[error("Another operation is still running")]
    OperationRunning,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<TuqlError> for ServiceError {
    fn from(err: TuqlError) -> Self {
        match err {
            TuqlError::NoPrimaryKey(msg) => Self::NoPrimaryKey(msg),
            TuqlError::ResourceLimit(msg) => Self::ResourceLimit(msg),
            TuqlError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            TuqlError::Cancelled => Self::Cancelled,
            other => Self::Database(other.to_string()),
        }
    }
}
