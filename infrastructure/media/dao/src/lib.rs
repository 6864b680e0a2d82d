use common_errors::AppError;
use media_models::{Document, DocumentInfo, Image, ImageInfo, UploadedFile};
use sql_connection::{PgError, PoolError, SqlConnect};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image not found: {image_id}")]
    ImageNotFound { image_id: Uuid },
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] PoolError),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::ImageNotFound { image_id } => {
                AppError::not_found(
                    "IMAGE_NOT_FOUND",
                    &format!("Image with ID {image_id} not found"),
                )
            }
            MediaError::DocumentNotFound { document_id } => {
                AppError::not_found(
                    "DOCUMENT_NOT_FOUND",
                    &format!("Document with ID {document_id} not found"),
                )
            }
            MediaError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            MediaError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
        }
    }
}

/// Image and document rows. Attachment to properties (join tables) is the
/// property DAO's concern; this one only touches the blob tables.
#[derive(Clone)]
pub struct MediaDao {
    db: SqlConnect,
}

impl MediaDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    #[instrument(skip(self))]
    pub async fn find_image(&self, id: Uuid) -> Result<Image, MediaError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, name, content_type, data, preview FROM image \
                 WHERE id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| {
                Image {
                    id: row.get(0),
                    name: row.get(1),
                    content_type: row.get(2),
                    data: row.get(3),
                    preview: row.get(4),
                }
            })
            .ok_or(MediaError::ImageNotFound { image_id: id })
    }

    #[instrument(skip(self))]
    pub async fn image_info(
        &self, id: Uuid,
    ) -> Result<ImageInfo, MediaError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, name, content_type, preview FROM image WHERE id \
                 = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(map_image_info)
            .ok_or(MediaError::ImageNotFound { image_id: id })
    }

    #[instrument(skip_all)]
    pub async fn create_image(
        &self, file: &UploadedFile, preview: bool,
    ) -> Result<ImageInfo, MediaError> {
        let client = self.db.get_client().await?;
        let id = Uuid::now_v7();

        let stmt = client
            .prepare(
                "INSERT INTO image (id, name, content_type, data, preview) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id, name, \
                 content_type, preview",
            )
            .await?;
        let rows = client
            .query(
                &stmt,
                &[&id, &file.name, &file.content_type, &file.data, &preview],
            )
            .await?;

        rows.first()
            .map(map_image_info)
            .ok_or(MediaError::ImageNotFound { image_id: id })
    }

    #[instrument(skip(self))]
    pub async fn delete_images(
        &self, ids: &[Uuid],
    ) -> Result<u64, MediaError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("DELETE FROM image WHERE id = ANY($1)")
            .await?;
        let deleted = client.execute(&stmt, &[&ids]).await?;
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn find_document(
        &self, id: Uuid,
    ) -> Result<Document, MediaError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id, name, content_type, data FROM document WHERE id \
                 = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| {
                Document {
                    id: row.get(0),
                    name: row.get(1),
                    content_type: row.get(2),
                    data: row.get(3),
                }
            })
            .ok_or(MediaError::DocumentNotFound { document_id: id })
    }

    #[instrument(skip_all)]
    pub async fn create_document(
        &self, file: &UploadedFile,
    ) -> Result<DocumentInfo, MediaError> {
        let client = self.db.get_client().await?;
        let id = Uuid::now_v7();

        let stmt = client
            .prepare(
                "INSERT INTO document (id, name, content_type, data) VALUES \
                 ($1, $2, $3, $4) RETURNING id, name, content_type",
            )
            .await?;
        let rows = client
            .query(&stmt, &[&id, &file.name, &file.content_type, &file.data])
            .await?;

        rows.first()
            .map(map_document_info)
            .ok_or(MediaError::DocumentNotFound { document_id: id })
    }

    #[instrument(skip(self))]
    pub async fn delete_documents(
        &self, ids: &[Uuid],
    ) -> Result<u64, MediaError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("DELETE FROM document WHERE id = ANY($1)")
            .await?;
        let deleted = client.execute(&stmt, &[&ids]).await?;
        Ok(deleted)
    }
}

pub fn map_image_info(row: &tokio_postgres::Row) -> ImageInfo {
    ImageInfo {
        id: row.get(0),
        name: row.get(1),
        content_type: row.get(2),
        preview: row.get(3),
    }
}

pub fn map_document_info(row: &tokio_postgres::Row) -> DocumentInfo {
    DocumentInfo {
        id: row.get(0),
        name: row.get(1),
        content_type: row.get(2),
    }
}
