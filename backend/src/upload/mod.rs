//! Upload pipeline: store the object, presign a read URL, record the metadata
//!
//! The steps run strictly in order and the first failure aborts the upload.
//! Nothing is rolled back: a failure after the object write leaves the object
//! in the bucket with no metadata row pointing at it.

mod error;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{
    media_storage::ObjectStore,
    metadata_storage::{MetadataStore, NewImageMetadata},
};

pub use error::UploadError;

/// A single image received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original filename, used verbatim as the storage key
    pub filename: String,
    /// Content type reported by the client
    pub content_type: String,
    /// Raw file contents
    pub bytes: Bytes,
    /// User supplied description, not validated
    pub description: String,
}

impl ImageUpload {
    /// Storage key for this upload
    ///
    /// The key is the raw filename with no sanitization or namespacing, so
    /// uploads sharing a filename overwrite one another (last writer wins).
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.filename
    }
}

/// Outcome of a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Key the object was stored under
    pub key: String,
    /// Presigned read URL recorded in the metadata row
    pub image_url: String,
    /// When `image_url` stops granting access
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates the object store and metadata store for one upload
pub struct UploadPipeline {
    object_store: Arc<dyn ObjectStore>,
    metadata_store: Arc<dyn MetadataStore>,
    url_expiry: Duration,
}

impl UploadPipeline {
    /// Creates a pipeline over the given stores
    ///
    /// # Arguments
    ///
    /// * `object_store` - Where image bytes are written
    /// * `metadata_store` - Where the upload record is inserted
    /// * `url_expiry` - Validity of the generated read URL
    #[must_use]
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        metadata_store: Arc<dyn MetadataStore>,
        url_expiry: Duration,
    ) -> Self {
        Self {
            object_store,
            metadata_store,
            url_expiry,
        }
    }

    /// Runs the upload
    ///
    /// # Errors
    ///
    /// - `UploadError::StorageWrite` - the object write failed; nothing was stored
    /// - `UploadError::UrlGeneration` - the object is stored but orphaned
    /// - `UploadError::MetadataWrite` - the object is stored but orphaned
    #[instrument(
        skip(self, upload),
        fields(key = %upload.filename, size_bytes = upload.bytes.len())
    )]
    pub async fn run(&self, upload: ImageUpload) -> Result<UploadReceipt, UploadError> {
        let key = upload.storage_key().to_string();

        self.object_store
            .put_object(&key, upload.bytes, &upload.content_type)
            .await
            .map_err(UploadError::StorageWrite)?;
        tracing::debug!("Object stored");

        let presigned_url = self
            .object_store
            .presigned_get_url(&key, self.url_expiry)
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, "Object left without metadata after URL generation failed");
                UploadError::UrlGeneration(e)
            })?;
        tracing::debug!(expires_at = %presigned_url.expires_at, "Presigned URL generated");

        let metadata = NewImageMetadata {
            image_url: presigned_url.url,
            description: upload.description,
        };
        self.metadata_store.insert(&metadata).await.map_err(|e| {
            tracing::warn!(key = %key, "Object left without metadata after insert failed");
            UploadError::MetadataWrite(e)
        })?;

        Ok(UploadReceipt {
            key,
            image_url: metadata.image_url,
            expires_at: presigned_url.expires_at,
        })
    }
}
