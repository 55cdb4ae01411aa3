//! Error handling at the HTTP boundary
//!
//! Every failure collapses into a plain-text response. The underlying cause is
//! only ever logged, never returned to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::upload::UploadError;

/// Body returned for every failed upload
pub const UPLOAD_FAILED_MESSAGE: &str = "Error uploading image";

/// Application error type returned by handlers
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Status code sent to the client
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {}", self.message),
            500..=599 => tracing::error!("Server error: {}", self.message),
            _ => {}
        }

        (self.status, self.message).into_response()
    }
}

/// Every pipeline failure is reported as the same generic 500
impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        tracing::error!(step = err.step(), error = %err, "Error uploading image");

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED_MESSAGE)
    }
}
