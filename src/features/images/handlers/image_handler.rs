use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::core::error::AppError;
use crate::features::images::dtos::{ImageWithUrlDto, UploadImageDto, UploadResponseDto};
use crate::features::images::services::{RetrievalService, UploadService};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, DEFAULT_ORIGINAL_NAME, IMAGE_FIELD_NAME};
use crate::shared::types::ErrorResponse;

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `image`: The image to upload (required)
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "images",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
        description = "Multipart form with the image in the `image` field",
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponseDto),
        (status = 400, description = "No file uploaded", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or metadata failure", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != IMAGE_FIELD_NAME {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        // Only parts carrying a filename are files; a plain text value is not
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            debug!("Ignoring non-file '{}' field", IMAGE_FIELD_NAME);
            continue;
        };

        if upload.is_some() {
            return Err(AppError::BadRequest(format!(
                "Only one '{}' file is accepted",
                IMAGE_FIELD_NAME
            )));
        }

        let file_name = if file_name.is_empty() {
            DEFAULT_ORIGINAL_NAME.to_string()
        } else {
            file_name
        };
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;

        upload = Some((data, file_name, content_type));
    }

    let (data, file_name, content_type) = upload.ok_or(AppError::NoFileProvided)?;

    let file = service
        .upload_image(data, &file_name, &content_type)
        .await?;

    Ok(Json(UploadResponseDto {
        message: "File uploaded successfully".to_string(),
        file,
    }))
}

fn multipart_error(context: &str, e: MultipartError) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("{}: {}", context, e))
    }
}

/// Redirect to a presigned URL for an image
///
/// The URL expires after one hour and downloads the image as an attachment.
#[utoipa::path(
    get,
    path = "/api/images/{filename}",
    tag = "images",
    params(
        ("filename" = String, Path, description = "Generated filename returned by the upload")
    ),
    responses(
        (status = 302, description = "Redirect to the presigned object URL"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Signing failure", body = ErrorResponse)
    )
)]
pub async fn redirect_to_image(
    State(service): State<Arc<RetrievalService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let url = service.signed_url(&filename).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// Download an image through the service
#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "images",
    params(
        ("filename" = String, Path, description = "Generated filename returned by the upload")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Object storage failure", body = ErrorResponse)
    )
)]
pub async fn download_image(
    State(service): State<Arc<RetrievalService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let download = service.download(&filename).await?;

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let content_disposition = HeaderValue::from_bytes(download.content_disposition.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid content disposition: {}", e)))?;

    let mut response = Response::new(Body::from_stream(download.body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, content_disposition);
    if let Some(len) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    Ok(response)
}

/// List all images with presigned URLs, newest first
#[utoipa::path(
    get,
    path = "/api/images",
    tag = "images",
    responses(
        (status = 200, description = "All images with presigned URLs", body = Vec<ImageWithUrlDto>),
        (status = 500, description = "Metadata or signing failure", body = ErrorResponse)
    )
)]
pub async fn list_images(
    State(service): State<Arc<RetrievalService>>,
) -> Result<Json<Vec<ImageWithUrlDto>>, AppError> {
    let images = service.list_with_urls().await?;
    Ok(Json(images))
}
