//! Environment configuration for different deployment stages

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aws_config::{retry::RetryConfig, BehaviorVersion};
use sqlx::mysql::MySqlConnectOptions;
use thiserror::Error;

/// Validity window of every presigned read URL
pub const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(3600);

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while reading database settings from the environment
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    /// A required variable is unset
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("{0} environment variable is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `AWS_S3_BUCKET_NAME` environment variable is not set
    /// outside of development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("AWS_S3_BUCKET_NAME")
                .expect("AWS_S3_BUCKET_NAME environment variable is not set"),
            Self::Development => {
                env::var("AWS_S3_BUCKET_NAME").unwrap_or_else(|_| "image-uploads".to_string())
            }
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration
    ///
    /// Region and credentials come from the default provider chain, which reads
    /// `AWS_REGION`, `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`. SDK-level
    /// retries are disabled: a failed call fails the upload.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only supports path-style bucket addressing
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Presigned URL expiry, identical in every environment
    #[must_use]
    pub const fn presigned_url_expiry(&self) -> Duration {
        PRESIGNED_URL_EXPIRY
    }

    /// MySQL connection options built from the `RDS_*` variables
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::Missing` if host, user, password or database
    /// is unset, and `EnvironmentError::Invalid` for an unparsable `RDS_PORT`
    pub fn database_connect_options(&self) -> Result<MySqlConnectOptions, EnvironmentError> {
        let host = required_var("RDS_HOST")?;
        let user = required_var("RDS_USER")?;
        let password = required_var("RDS_PASSWORD")?;
        let database = required_var("RDS_DATABASE")?;
        let port = match env::var("RDS_PORT") {
            Ok(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|e| EnvironmentError::Invalid("RDS_PORT", e.to_string()))?,
            Err(_) => DEFAULT_MYSQL_PORT,
        };

        Ok(MySqlConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&user)
            .password(&password)
            .database(&database))
    }

    /// Whether the bundled schema is applied at startup
    #[must_use]
    pub fn run_migrations(&self) -> bool {
        env::var("RDS_RUN_MIGRATIONS")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }

    /// TCP port the HTTP server listens on
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::Invalid` if `PORT` is set but not a valid port
    pub fn port(&self) -> Result<u16, EnvironmentError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| {
            p.trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| EnvironmentError::Invalid("PORT", e.to_string()))
        })
    }

    /// Directory served for `/` and static assets
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        env::var("STATIC_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from)
    }

    /// Maximum accepted request body for uploads, in bytes
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

fn required_var(name: &'static str) -> Result<String, EnvironmentError> {
    env::var(name).map_err(|_| EnvironmentError::Missing(name))
}
