use std::path::Path;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::{metadata_storage::MetadataStorage, types::Environment, upload::UploadPipeline};

/// Builds the application router with its shared dependencies
pub fn app(
    static_dir: &Path,
    upload_pipeline: Arc<UploadPipeline>,
    max_upload_bytes: usize,
) -> Router {
    routes::handler(static_dir)
        .layer(Extension(upload_pipeline))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Starts the server with the given environment and dependencies
///
/// Runs until SIGINT or SIGTERM, then releases the database connection.
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    upload_pipeline: Arc<UploadPipeline>,
    metadata_storage: Arc<MetadataStorage>,
) -> anyhow::Result<()> {
    let router = app(
        &environment.static_dir(),
        upload_pipeline,
        environment.max_upload_bytes(),
    );

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()?));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server is running on http://{addr}");

    let result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from);

    metadata_storage.close().await;

    result
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
