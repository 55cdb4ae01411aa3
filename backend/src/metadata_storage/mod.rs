//! Image metadata storage using MySQL
//!
//! One row per successful upload in `image_metadata`. Rows are only ever
//! inserted; `uploaded_at` is assigned by the database clock.

mod error;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

pub use error::{MetadataError, MetadataResult};

const INSERT_IMAGE_METADATA: &str = r"
    INSERT INTO image_metadata (image_url, uploaded_at, description)
    VALUES (?, NOW(), ?)
";

/// Fields of an `image_metadata` row supplied by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImageMetadata {
    /// Presigned read URL of the stored object
    pub image_url: String,
    /// User supplied description, stored as-is
    pub description: String,
}

/// Metadata operations needed by the upload pipeline
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Inserts one metadata row stamped with the current server time
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if no connection is available or the insert is rejected
    async fn insert(&self, metadata: &NewImageMetadata) -> MetadataResult<()>;
}

/// MySQL-backed metadata storage
///
/// Holds a single long-lived connection opened once at startup. When that
/// attempt failed the storage is disconnected and every insert fails.
pub struct MetadataStorage {
    pool: Option<MySqlPool>,
}

impl MetadataStorage {
    /// Opens the connection used for the lifetime of the server
    ///
    /// # Arguments
    ///
    /// * `options` - Connection target and credentials
    /// * `connect_timeout` - Bound on this startup attempt only; inserts keep
    ///   the driver's default acquire timeout
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Database` if the connection is refused and
    /// `MetadataError::ConnectTimeout` if it is not established in time
    pub async fn connect(
        options: MySqlConnectOptions,
        connect_timeout: Duration,
    ) -> MetadataResult<Self> {
        let pool = tokio::time::timeout(
            connect_timeout,
            MySqlPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .connect_with(options),
        )
        .await
        .map_err(|_| MetadataError::ConnectTimeout(connect_timeout))??;

        tracing::info!("Connected to MySQL");

        Ok(Self { pool: Some(pool) })
    }

    /// Storage without a database connection
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { pool: None }
    }

    /// Whether a connection was established at startup
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    /// Creates the `image_metadata` table if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotConnected` without a connection and
    /// `MetadataError::Migration` if a migration fails
    pub async fn run_migrations(&self) -> MetadataResult<()> {
        let pool = self.pool.as_ref().ok_or(MetadataError::NotConnected)?;
        sqlx::migrate!("./migrations").run(pool).await?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Releases the connection; later inserts fail
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("MySQL connection closed");
        }
    }
}

#[async_trait]
impl MetadataStore for MetadataStorage {
    async fn insert(&self, metadata: &NewImageMetadata) -> MetadataResult<()> {
        let pool = self.pool.as_ref().ok_or(MetadataError::NotConnected)?;

        sqlx::query(INSERT_IMAGE_METADATA)
            .bind(&metadata.image_url)
            .bind(&metadata.description)
            .execute(pool)
            .await?;

        Ok(())
    }
}
