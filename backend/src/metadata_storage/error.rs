//! Error types for image metadata storage operations

use std::time::Duration;

use thiserror::Error;

/// Result type for metadata storage operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur during metadata storage operations
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No database connection was established at startup
    #[error("Database connection is not available")]
    NotConnected,

    /// The startup connection attempt did not finish in time
    #[error("Timed out connecting to the database after {0:?}")]
    ConnectTimeout(Duration),

    /// The database rejected the statement or the connection failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the bundled schema failed
    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
