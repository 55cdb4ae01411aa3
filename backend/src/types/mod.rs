mod environment;
mod error;

pub use environment::{Environment, EnvironmentError, PRESIGNED_URL_EXPIRY};
pub use error::{AppError, UPLOAD_FAILED_MESSAGE};
