mod health;
/// Image upload endpoint
pub mod upload;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// Creates the router with the upload endpoint and the static asset root
///
/// `GET /` serves `index.html` from `static_dir`; any other path not matched
/// by a route is looked up under `static_dir` and answers 404 when absent.
pub fn handler(static_dir: &Path) -> Router {
    Router::new()
        .route("/upload", post(upload::upload_image))
        .route("/health", get(health::handler))
        .fallback_service(ServeDir::new(static_dir))
}
