use thiserror::Error;

use crate::db_pool::DbDriver;

#[derive(Debug, Error)]
pub enum SqlxStmtError {
    /// The target dialect structurally lacks the requested capability
    #[error("{driver} does not support {operation}.")]
    UnsupportedOperation {
        driver: DbDriver,
        operation: &'static str,
    },
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabase(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("No connection pool available for driver")]
    NoPoolAvailable,
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SqlxStmtError {
    pub fn unsupported(driver: DbDriver, operation: &'static str) -> Self {
        SqlxStmtError::UnsupportedOperation { driver, operation }
    }
}

pub type Result<T> = std::result::Result<T, SqlxStmtError>;
