use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::features::images::handlers::{
    download_image, list_images, redirect_to_image, upload_image,
};
use crate::features::images::services::{RetrievalService, UploadService};

/// Create routes for the images feature
///
/// `max_body_size` bounds the multipart upload body.
pub fn routes(
    upload_service: Arc<UploadService>,
    retrieval_service: Arc<RetrievalService>,
    max_body_size: usize,
) -> Router {
    let upload_routes = Router::new()
        .route(
            "/api/upload",
            post(upload_image).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(upload_service);

    let retrieval_routes = Router::new()
        .route("/api/images", get(list_images))
        .route("/api/images/{filename}", get(redirect_to_image))
        .route("/api/download/{filename}", get(download_image))
        .with_state(retrieval_service);

    upload_routes.merge(retrieval_routes)
}
