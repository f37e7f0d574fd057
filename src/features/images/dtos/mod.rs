mod image_dto;

pub use image_dto::{ImageResponseDto, ImageWithUrlDto, UploadImageDto, UploadResponseDto};
