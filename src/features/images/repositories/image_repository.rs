use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::features::images::models::{Image, NewImage};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Image with filename '{0}' already exists")]
    DuplicateFilename(String),
}

/// Persistence for image metadata records
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert a new record, assigning its id and upload date
    async fn create(&self, image: NewImage) -> Result<Image, RepositoryError>;

    /// Find a record by its generated filename
    async fn find_by_filename(&self, filename: &str) -> Result<Option<Image>, RepositoryError>;

    /// All records, most recent upload first
    async fn list_newest_first(&self) -> Result<Vec<Image>, RepositoryError>;
}

/// PostgreSQL-backed image repository
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn create(&self, image: NewImage) -> Result<Image, RepositoryError> {
        let created = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (id, filename, original_name, mime_type, size, storage_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, filename, original_name, mime_type, size, upload_date, storage_key
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&image.filename)
        .bind(&image.original_name)
        .bind(&image.mime_type)
        .bind(image.size)
        .bind(&image.storage_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                RepositoryError::DuplicateFilename(image.filename.clone())
            }
            _ => RepositoryError::Database(e),
        })?;

        debug!("Inserted image record: id={}, filename={}", created.id, created.filename);
        Ok(created)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<Image>, RepositoryError> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, filename, original_name, mime_type, size, upload_date, storage_key
            FROM images
            WHERE filename = $1
            "#,
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    async fn list_newest_first(&self) -> Result<Vec<Image>, RepositoryError> {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, filename, original_name, mime_type, size, upload_date, storage_key
            FROM images
            ORDER BY upload_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }
}
