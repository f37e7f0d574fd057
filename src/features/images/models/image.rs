use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for image metadata
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Image {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub upload_date: DateTime<Utc>,
    pub storage_key: String,
}

/// Fields supplied by the upload flow; `id` and `upload_date` are assigned on insert
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
}
