use std::sync::Arc;

use auth_core::AuthPrincipal;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common_errors::AppError;
use media_responses::{DocumentResponse, ImageResponse};
use property_cache_keys::PropertyFullResponse;
use property_command_handlers::{
    CreatePropertyHandler, DeletePropertyHandler,
    RemovePropertyDocumentsHandler, RemovePropertyImagesHandler,
    SetImagePreviewHandler, UpdatePropertyHandler,
    UploadPropertyDocumentsHandler, UploadPropertyImagesHandler,
};
use property_commands::{
    CreatePropertyCommand, DeletePropertyCommand,
    RemovePropertyDocumentsCommand, RemovePropertyImagesCommand,
    SetImagePreviewCommand, UpdatePropertyCommand,
};
use property_query_handlers::{
    GetPropertyQueryHandler, ListPropertiesQueryHandler,
};
use property_responses::{
    PropertyShortResponse, PropertyWithCategoryResponse,
};
use redis_connection::CacheBackend;
use serde::Deserialize;
use sql_connection::SqlConnect;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Clone)]
pub struct PropertyServices {
    pub create_property: CreatePropertyHandler,
    pub update_property: UpdatePropertyHandler,
    pub delete_property: DeletePropertyHandler,
    pub upload_images: UploadPropertyImagesHandler,
    pub remove_images: RemovePropertyImagesHandler,
    pub upload_documents: UploadPropertyDocumentsHandler,
    pub remove_documents: RemovePropertyDocumentsHandler,
    pub set_image_preview: SetImagePreviewHandler,

    pub get_property: GetPropertyQueryHandler,
    pub list_properties: ListPropertiesQueryHandler,
}

impl PropertyServices {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            create_property: CreatePropertyHandler::new(
                db.clone(),
                cache.clone(),
            ),
            update_property: UpdatePropertyHandler::new(
                db.clone(),
                cache.clone(),
            ),
            delete_property: DeletePropertyHandler::new(
                db.clone(),
                cache.clone(),
            ),
            upload_images: UploadPropertyImagesHandler::new(
                db.clone(),
                cache.clone(),
            ),
            remove_images: RemovePropertyImagesHandler::new(
                db.clone(),
                cache.clone(),
            ),
            upload_documents: UploadPropertyDocumentsHandler::new(
                db.clone(),
                cache.clone(),
            ),
            remove_documents: RemovePropertyDocumentsHandler::new(
                db.clone(),
                cache.clone(),
            ),
            set_image_preview: SetImagePreviewHandler::new(
                db.clone(),
                cache.clone(),
            ),
            get_property: GetPropertyQueryHandler::new(db.clone(), cache),
            list_properties: ListPropertiesQueryHandler::new(db),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PropertyQueryParams {
    limit: Option<u64>,
    offset: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/properties",
    request_body = CreatePropertyCommand,
    responses(
        (status = 201, description = "Property created", body = PropertyShortResponse),
        (status = 403, description = "Principal is not the named owner", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Owner, category or tenant not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn create_property(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Json(command): Json<CreatePropertyCommand>,
) -> Result<(StatusCode, Json<PropertyShortResponse>), AppError> {
    let result =
        services.create_property.execute(&principal, command).await?;

    tracing::info!("Property created: {}", result.id);

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/properties",
    params(PropertyQueryParams),
    responses(
        (status = 200, description = "List of properties", body = Vec<PropertyWithCategoryResponse>)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn list_properties(
    State(services): State<PropertyServices>,
    Query(params): Query<PropertyQueryParams>,
) -> Result<Json<Vec<PropertyWithCategoryResponse>>, AppError> {
    let query = property_queries::ListPropertiesQuery {
        limit: params.limit,
        offset: params.offset,
    };
    let properties = services.list_properties.execute(query).await?;

    Ok(Json(properties))
}

#[utoipa::path(
    get,
    path = "/properties/{id}",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property with embedded relations", body = PropertyFullResponse),
        (status = 404, description = "Property not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn get_property(
    State(services): State<PropertyServices>, Path(id): Path<Uuid>,
) -> Result<Json<PropertyFullResponse>, AppError> {
    let query = property_queries::GetPropertyQuery { property_id: id };
    let property = services.get_property.execute(query).await?;

    Ok(Json(property))
}

#[utoipa::path(
    put,
    path = "/properties/{id}",
    request_body = UpdatePropertyCommand,
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 204, description = "Property updated"),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Property not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn update_property(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, Json(mut command): Json<UpdatePropertyCommand>,
) -> Result<StatusCode, AppError> {
    command.property_id = id;
    services.update_property.execute(&principal, command).await?;

    tracing::info!("Property updated: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/properties/{id}",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Property not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn delete_property(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let command = DeletePropertyCommand { property_id: id };
    services.delete_property.execute(&principal, command).await?;

    tracing::info!("Property deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/properties/{id}/images",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Images stored and attached", body = Vec<ImageResponse>),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn upload_property_images(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, multipart: Multipart,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let files = media_http::collect_uploads(multipart).await?;

    let images = services
        .upload_images
        .execute(&principal, id, files)
        .await?;

    Ok(Json(images))
}

#[utoipa::path(
    delete,
    path = "/properties/{id}/images",
    request_body = RemovePropertyImagesCommand,
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 204, description = "Images detached and deleted"),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn remove_property_images(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(mut command): Json<RemovePropertyImagesCommand>,
) -> Result<StatusCode, AppError> {
    command.property_id = id;
    services.remove_images.execute(&principal, command).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/properties/{id}/images/{image_id}/preview",
    params(
        ("id" = Uuid, Path, description = "Property ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Preview image set"),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Image does not belong to the property", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn set_property_image_preview(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let command = SetImagePreviewCommand {
        property_id: id,
        image_id,
    };
    services
        .set_image_preview
        .execute(&principal, command)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/properties/{id}/documents",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Documents stored and attached", body = Vec<DocumentResponse>),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn upload_property_documents(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, multipart: Multipart,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let files = media_http::collect_uploads(multipart).await?;

    let documents = services
        .upload_documents
        .execute(&principal, id, files)
        .await?;

    Ok(Json(documents))
}

#[utoipa::path(
    delete,
    path = "/properties/{id}/documents",
    request_body = RemovePropertyDocumentsCommand,
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 204, description = "Documents detached and deleted"),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse)
    ),
    tag = "properties"
)]
#[instrument(skip_all)]
pub async fn remove_property_documents(
    State(services): State<PropertyServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(mut command): Json<RemovePropertyDocumentsCommand>,
) -> Result<StatusCode, AppError> {
    command.property_id = id;
    services
        .remove_documents
        .execute(&principal, command)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
