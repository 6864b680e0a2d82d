use axum::{
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use common_errors::AppError;
use media_dao::MediaDao;
use sql_connection::SqlConnect;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaServices {
    pub media_dao: MediaDao,
}

impl MediaServices {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            media_dao: MediaDao::new(db),
        }
    }
}

/// Drains a multipart body into uploaded files; non-file fields are
/// skipped.
pub async fn collect_uploads(
    mut multipart: Multipart,
) -> Result<Vec<media_models::UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::bad_request_with_details(
            "INVALID_MULTIPART",
            "Malformed multipart payload",
            &e.to_string(),
        )
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field.bytes().await.map_err(|e| {
            AppError::bad_request_with_details(
                "INVALID_MULTIPART",
                "Failed to read multipart field",
                &e.to_string(),
            )
        })?;

        files.push(media_models::UploadedFile {
            name: file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::bad_request(
            "NO_FILES",
            "Multipart payload contains no files",
        ));
    }

    Ok(files)
}

#[utoipa::path(
    get,
    path = "/images/{id}",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Image not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "media"
)]
#[instrument(skip_all)]
pub async fn get_image(
    State(services): State<MediaServices>, Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let image = services.media_dao.find_image(id).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.content_type)],
        image.data,
    ))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Raw document bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "media"
)]
#[instrument(skip_all)]
pub async fn get_document(
    State(services): State<MediaServices>, Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let document = services.media_dao.find_document(id).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, document.content_type)],
        document.data,
    ))
}
