//! Image upload service
//!
//! Accepts an image over HTTP, stores it in S3, generates a time-limited read
//! URL and records the URL with a description in MySQL.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

/// S3 object storage
pub mod media_storage;

/// MySQL metadata storage
pub mod metadata_storage;

/// HTTP routes
pub mod routes;

/// Server lifecycle
pub mod server;

/// Configuration and error types
pub mod types;

/// Upload orchestration
pub mod upload;
