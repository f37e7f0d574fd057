//! Storage module for image payloads
//!
//! Provides the object storage abstraction and its S3-compatible
//! implementation for uploads, streamed downloads, and presigned URLs.

mod object_storage;
mod s3_client;

pub use object_storage::{ByteStream, ObjectStorage, StorageError, StoredObject};
pub use s3_client::S3StorageClient;
