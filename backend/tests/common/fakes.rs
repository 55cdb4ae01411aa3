use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use image_upload_backend::{
    media_storage::{BucketError, BucketResult, ObjectStore, PresignedUrl},
    metadata_storage::{MetadataError, MetadataResult, MetadataStore, NewImageMetadata},
};

pub const FAKE_BUCKET_URL: &str = "https://image-uploads.s3.fake.test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// Object store kept in memory, with switchable failures
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    /// Every successful write in the order it landed
    write_log: Mutex<Vec<(String, Bytes)>>,
    presigned: AtomicUsize,
    fail_put: AtomicBool,
    fail_presign: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn fail_put(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn fail_presign(&self) {
        self.fail_presign.store(true, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn write_log(&self) -> Vec<(String, Bytes)> {
        self.write_log.lock().unwrap().clone()
    }

    pub fn presigned_count(&self) -> usize {
        self.presigned.load(Ordering::SeqCst)
    }

    /// Resolves a URL issued by this store to the current object, the way a
    /// GET on a presigned URL would
    pub fn resolve(&self, url: &str) -> Option<StoredObject> {
        let key = url
            .strip_prefix(FAKE_BUCKET_URL)?
            .strip_prefix('/')?
            .split('?')
            .next()?;
        self.object(key)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError("simulated outage".to_string()));
        }

        // yield so concurrent uploads can interleave
        tokio::task::yield_now().await;

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: body.clone(),
                content_type: content_type.to_string(),
            },
        );
        self.write_log.lock().unwrap().push((key.to_string(), body));
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(BucketError::ConfigError("simulated signing failure".to_string()));
        }

        let issued = self.presigned.fetch_add(1, Ordering::SeqCst);
        Ok(PresignedUrl {
            url: format!(
                "{FAKE_BUCKET_URL}/{key}?X-Amz-Expires={}&X-Amz-Signature={issued:064x}",
                expires_in.as_secs()
            ),
            expires_at: Utc::now() + expires_in,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoredRow {
    pub image_url: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata table kept in memory, with a switchable failure
#[derive(Default)]
pub struct InMemoryMetadataStore {
    rows: Mutex<Vec<StoredRow>>,
    fail_insert: AtomicBool,
}

impl InMemoryMetadataStore {
    pub fn fail_insert(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, metadata: &NewImageMetadata) -> MetadataResult<()> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(MetadataError::Database(sqlx::Error::PoolClosed));
        }

        self.rows.lock().unwrap().push(StoredRow {
            image_url: metadata.image_url.clone(),
            description: metadata.description.clone(),
            uploaded_at: Utc::now(),
        });
        Ok(())
    }
}
