//! S3-based image storage operations
mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    presigning::PresigningConfig, primitives::ByteStream, types::ObjectCannedAcl,
    Client as S3Client,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use error::{BucketError, BucketResult};

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for GET operations
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Object storage operations needed by the upload pipeline
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key` as a private object tagged with `content_type`.
    /// An existing object under the same key is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `BucketError` if the store is unreachable or rejects the write
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()>;

    /// Generates a time-limited read URL for `key`
    ///
    /// # Errors
    ///
    /// Returns `BucketError` if the URL cannot be produced
    async fn presigned_get_url(&self, key: &str, expires_in: Duration)
        -> BucketResult<PresignedUrl>;
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
        }
    }
}

#[async_trait]
impl ObjectStore for MediaStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()> {
        let size = body.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::Private)
            .send()
            .await?;

        tracing::debug!(bucket = %self.bucket_name, key, size_bytes = size, "S3 put_object succeeded");

        Ok(())
    }

    /// Generates a presigned URL for GET operations
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl> {
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let issued_at = Utc::now();
        let presigned_request = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigned_config)
            .await?;

        Ok(PresignedUrl {
            url: presigned_request.uri().to_string(),
            expires_at: issued_at + expires_in,
        })
    }
}
