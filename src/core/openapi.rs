use utoipa::{Modify, OpenApi};

use crate::features::images::{dtos as images_dtos, handlers as images_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        images_handlers::upload_image,
        images_handlers::redirect_to_image,
        images_handlers::download_image,
        images_handlers::list_images,
    ),
    components(
        schemas(
            ErrorResponse,
            images_dtos::UploadImageDto,
            images_dtos::ImageResponseDto,
            images_dtos::UploadResponseDto,
            images_dtos::ImageWithUrlDto,
        )
    ),
    tags(
        (name = "images", description = "Image upload, download and presigned links"),
    ),
    info(
        title = "Imagevault API",
        version = "0.1.0",
        description = "Image upload and retrieval API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
