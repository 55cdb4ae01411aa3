use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Extension,
};
use bytes::Bytes;
use tracing::instrument;

use crate::{
    types::AppError,
    upload::{ImageUpload, UploadError, UploadPipeline},
};

/// Form field carrying the image file
pub const IMAGE_FIELD: &str = "image";
/// Form field carrying the free-text description
pub const DESCRIPTION_FIELD: &str = "description";
/// Body returned for a completed upload
pub const UPLOAD_SUCCEEDED_MESSAGE: &str = "Image and metadata uploaded successfully";

/// Stores an uploaded image and records its metadata
///
/// Expects a `multipart/form-data` body with an `image` file part and a
/// `description` text part. The object is stored under its original filename,
/// a read URL valid for one hour is generated and a metadata row referencing
/// that URL is inserted.
///
/// # Errors
///
/// Any failure, whether in the request itself, the object write, URL generation
/// or the metadata insert, yields the same 500 response. The cause is logged.
#[instrument(skip(upload_pipeline, multipart))]
pub async fn upload_image(
    Extension(upload_pipeline): Extension<Arc<UploadPipeline>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, AppError> {
    let multipart = multipart.map_err(|e| UploadError::InvalidRequest(e.body_text()))?;
    let upload = read_upload_form(multipart).await?;

    let receipt = upload_pipeline.run(upload).await?;
    tracing::info!(key = %receipt.key, expires_at = %receipt.expires_at, "Upload complete");
    tracing::debug!(image_url = %receipt.image_url, "Recorded read URL");

    Ok(UPLOAD_SUCCEEDED_MESSAGE)
}

/// Collects the `image` and `description` parts of the form
///
/// Unknown text fields are skipped; a file under any field other than `image`
/// rejects the request. A missing content type on the image part falls back
/// to `application/octet-stream`.
///
/// Both `image` and `description` are required. A missing description is
/// rejected here, before anything is written, rather than surfacing later as
/// a failed metadata insert that leaves the stored object orphaned.
async fn read_upload_form(mut multipart: Multipart) -> Result<ImageUpload, UploadError> {
    let mut image: Option<(String, String, Bytes)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::InvalidRequest(format!("Failed to read multipart: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                if image.is_some() {
                    return Err(UploadError::InvalidRequest(format!(
                        "Only one '{IMAGE_FIELD}' file is accepted"
                    )));
                }

                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                    .ok_or_else(|| {
                        UploadError::InvalidRequest(format!("'{IMAGE_FIELD}' has no filename"))
                    })?;
                let content_type = field
                    .content_type()
                    .map_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string(), ToString::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    UploadError::InvalidRequest(format!("Failed to read file data: {e}"))
                })?;

                image = Some((filename, content_type, bytes));
            }
            Some(DESCRIPTION_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    UploadError::InvalidRequest(format!("Failed to read description: {e}"))
                })?;
                description = Some(text);
            }
            other if field.file_name().is_some() => {
                return Err(UploadError::InvalidRequest(format!(
                    "Unexpected file field {other:?}; only '{IMAGE_FIELD}' accepts a file"
                )));
            }
            other => tracing::debug!(field = ?other, "Ignoring unexpected form field"),
        }
    }

    let (filename, content_type, bytes) = image
        .ok_or_else(|| UploadError::InvalidRequest(format!("No '{IMAGE_FIELD}' file provided")))?;
    let description = description.ok_or_else(|| {
        UploadError::InvalidRequest(format!("No '{DESCRIPTION_FIELD}' provided"))
    })?;

    Ok(ImageUpload {
        filename,
        content_type,
        bytes,
        description,
    })
}
