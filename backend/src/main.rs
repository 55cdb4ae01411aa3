use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::Client as S3Client;

use image_upload_backend::{
    media_storage::MediaStorage,
    metadata_storage::MetadataStorage,
    server,
    types::Environment,
    upload::UploadPipeline,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Bounds only the connection attempt made at startup
const DATABASE_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // JSON logs for staging/production, human readable for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(s3_client, environment.s3_bucket()));

    let metadata_storage = Arc::new(connect_metadata_storage(&environment).await);

    let upload_pipeline = Arc::new(UploadPipeline::new(
        media_storage,
        metadata_storage.clone(),
        environment.presigned_url_expiry(),
    ));

    server::start(environment, upload_pipeline, metadata_storage).await
}

/// Connects to MySQL once. A failure is logged and the server starts anyway;
/// every upload then fails at the metadata step.
async fn connect_metadata_storage(environment: &Environment) -> MetadataStorage {
    let options = match environment.database_connect_options() {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("Could not connect to MySQL: {e}");
            return MetadataStorage::disconnected();
        }
    };

    let storage = match MetadataStorage::connect(options, DATABASE_STARTUP_TIMEOUT).await {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Could not connect to MySQL: {e}");
            return MetadataStorage::disconnected();
        }
    };

    if environment.run_migrations() {
        if let Err(e) = storage.run_migrations().await {
            tracing::error!("Could not apply database migrations: {e}");
        }
    }

    storage
}
