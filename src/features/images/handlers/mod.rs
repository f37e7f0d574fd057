pub mod image_handler;

pub use image_handler::{
    __path_download_image, __path_list_images, __path_redirect_to_image, __path_upload_image,
    download_image, list_images, redirect_to_image, upload_image,
};
