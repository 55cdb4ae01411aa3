//! Error types for the upload pipeline

use thiserror::Error;

use crate::{media_storage::BucketError, metadata_storage::MetadataError};

/// Errors that abort an upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// The request could not be turned into an upload
    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    /// Writing the object failed
    #[error("Failed to store object: {0}")]
    StorageWrite(#[source] BucketError),

    /// The object was written but no read URL could be generated
    #[error("Failed to generate presigned URL: {0}")]
    UrlGeneration(#[source] BucketError),

    /// Object and URL exist but the metadata row was not written
    #[error("Failed to store metadata: {0}")]
    MetadataWrite(#[source] MetadataError),
}

impl UploadError {
    /// Short name of the failed step, for logs
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "request",
            Self::StorageWrite(_) => "storage_write",
            Self::UrlGeneration(_) => "url_generation",
            Self::MetadataWrite(_) => "metadata_write",
        }
    }
}
