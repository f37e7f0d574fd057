/// Lifetime of presigned image URLs (1 hour)
pub const SIGNED_URL_EXPIRY_SECS: u32 = 3600;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD_NAME: &str = "image";

/// Content type used when neither the client nor the object store declares one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Filename used when the multipart part carries none
pub const DEFAULT_ORIGINAL_NAME: &str = "unnamed";
