mod retrieval_service;
mod upload_service;

pub use retrieval_service::RetrievalService;
pub use upload_service::UploadService;
