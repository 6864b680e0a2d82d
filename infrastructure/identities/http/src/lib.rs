use std::sync::Arc;

use auth_core::AuthPrincipal;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common_errors::AppError;
use identity_cache_keys::IdentityFullResponse;
use identity_command_handlers::{
    ChangePasswordHandler, ChangeStatusHandler, CreateIdentityHandler,
    DeleteIdentityHandler, RemoveIdentityImageHandler,
    UpdateIdentityHandler, UploadIdentityImageHandler,
};
use identity_commands::{
    ChangePasswordCommand, ChangeStatusCommand, CreateIdentityCommand,
    DeleteIdentityCommand, UpdateIdentityCommand,
};
use identity_query_handlers::{
    GetIdentityQueryHandler, ListIdentitiesQueryHandler,
};
use identity_responses::IdentityShortResponse;
use media_responses::ImageResponse;
use redis_connection::CacheBackend;
use serde::Deserialize;
use sql_connection::SqlConnect;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Clone)]
pub struct IdentityServices {
    pub create_identity: CreateIdentityHandler,
    pub update_identity: UpdateIdentityHandler,
    pub delete_identity: DeleteIdentityHandler,
    pub change_password: ChangePasswordHandler,
    pub change_status: ChangeStatusHandler,
    pub upload_image: UploadIdentityImageHandler,
    pub remove_image: RemoveIdentityImageHandler,

    pub get_identity: GetIdentityQueryHandler,
    pub list_identities: ListIdentitiesQueryHandler,
}

impl IdentityServices {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            create_identity: CreateIdentityHandler::new(db.clone()),
            update_identity: UpdateIdentityHandler::new(
                db.clone(),
                cache.clone(),
            ),
            delete_identity: DeleteIdentityHandler::new(
                db.clone(),
                cache.clone(),
            ),
            change_password: ChangePasswordHandler::new(
                db.clone(),
                cache.clone(),
            ),
            change_status: ChangeStatusHandler::new(
                db.clone(),
                cache.clone(),
            ),
            upload_image: UploadIdentityImageHandler::new(
                db.clone(),
                cache.clone(),
            ),
            remove_image: RemoveIdentityImageHandler::new(
                db.clone(),
                cache.clone(),
            ),
            get_identity: GetIdentityQueryHandler::new(db.clone(), cache),
            list_identities: ListIdentitiesQueryHandler::new(db),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct IdentityQueryParams {
    limit: Option<u64>,
    offset: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/identities",
    request_body = CreateIdentityCommand,
    responses(
        (status = 201, description = "Identity created", body = IdentityShortResponse),
        (status = 400, description = "Missing or empty required field", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Username or email already exists", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn create_identity(
    State(services): State<IdentityServices>,
    Json(command): Json<CreateIdentityCommand>,
) -> Result<(StatusCode, Json<IdentityShortResponse>), AppError> {
    let result = services.create_identity.execute(command).await?;

    tracing::info!("Identity created: {}", result.id);

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/identities",
    params(IdentityQueryParams),
    responses(
        (status = 200, description = "List of identities", body = Vec<IdentityShortResponse>),
        (status = 401, description = "Not authenticated", body = common_errors::ApiErrorResponse),
        (status = 403, description = "Admin authority required", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn list_identities(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Query(params): Query<IdentityQueryParams>,
) -> Result<Json<Vec<IdentityShortResponse>>, AppError> {
    principal.require_admin()?;

    let query = identity_queries::ListIdentitiesQuery {
        limit: params.limit,
        offset: params.offset,
    };
    let identities = services.list_identities.execute(query).await?;

    Ok(Json(identities))
}

#[utoipa::path(
    get,
    path = "/identities/{id}",
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 200, description = "Identity with embedded properties", body = IdentityFullResponse),
        (status = 404, description = "Identity not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn get_identity(
    State(services): State<IdentityServices>, _principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentityFullResponse>, AppError> {
    let query = identity_queries::GetIdentityQuery { identity_id: id };
    let identity = services.get_identity.execute(query).await?;

    Ok(Json(identity))
}

#[utoipa::path(
    put,
    path = "/identities/{id}",
    request_body = UpdateIdentityCommand,
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Identity updated"),
        (status = 403, description = "Not the identity itself", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Identity not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn update_identity(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, Json(mut command): Json<UpdateIdentityCommand>,
) -> Result<StatusCode, AppError> {
    command.identity_id = id;
    services.update_identity.execute(&principal, command).await?;

    tracing::info!("Identity updated: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/identities/{id}",
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Identity deleted"),
        (status = 403, description = "Not the identity itself", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Identity not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn delete_identity(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let command = DeleteIdentityCommand { identity_id: id };
    services.delete_identity.execute(&principal, command).await?;

    tracing::info!("Identity deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/identities/{id}/password",
    request_body = ChangePasswordCommand,
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Empty password", body = common_errors::ApiErrorResponse),
        (status = 409, description = "New password equals the old one", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn change_password(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, Json(mut command): Json<ChangePasswordCommand>,
) -> Result<StatusCode, AppError> {
    command.identity_id = id;
    services.change_password.execute(&principal, command).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/identities/{id}/status",
    request_body = ChangeStatusCommand,
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Status changed"),
        (status = 403, description = "Admin authority required", body = common_errors::ApiErrorResponse),
        (status = 409, description = "Status already set", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn change_status(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, Json(mut command): Json<ChangeStatusCommand>,
) -> Result<StatusCode, AppError> {
    command.identity_id = id;
    services.change_status.execute(&principal, command).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/identities/{id}/image",
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 200, description = "Profile image stored", body = ImageResponse),
        (status = 403, description = "Not the identity itself", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn upload_identity_image(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, multipart: Multipart,
) -> Result<Json<ImageResponse>, AppError> {
    let mut files = media_http::collect_uploads(multipart).await?;
    let file = files.remove(0);

    let image = services
        .upload_image
        .execute(&principal, id, file)
        .await?;

    Ok(Json(image))
}

#[utoipa::path(
    delete,
    path = "/identities/{id}/image",
    params(
        ("id" = Uuid, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Profile image removed"),
        (status = 404, description = "Identity has no image", body = common_errors::ApiErrorResponse)
    ),
    tag = "identities"
)]
#[instrument(skip_all)]
pub async fn remove_identity_image(
    State(services): State<IdentityServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services.remove_image.execute(&principal, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
