use std::sync::Arc;

use advertisement_cache_keys::AdvertisementFullResponse;
use advertisement_command_handlers::{
    CreateAdvertisementHandler, DeleteAdvertisementHandler,
    RentPropertyHandler, UpdateAdvertisementHandler,
};
use advertisement_commands::{
    CreateAdvertisementCommand, DeleteAdvertisementCommand,
    RentPropertyCommand, UpdateAdvertisementCommand,
};
use advertisement_query_handlers::{
    GetAdvertisementQueryHandler, ListAdvertisementsQueryHandler,
};
use advertisement_responses::AdvertisementShortResponse;
use auth_core::AuthPrincipal;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common_errors::AppError;
use redis_connection::CacheBackend;
use serde::Deserialize;
use sql_connection::SqlConnect;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Clone)]
pub struct AdvertisementServices {
    pub create_advertisement: CreateAdvertisementHandler,
    pub update_advertisement: UpdateAdvertisementHandler,
    pub delete_advertisement: DeleteAdvertisementHandler,
    pub rent_property: RentPropertyHandler,

    pub get_advertisement: GetAdvertisementQueryHandler,
    pub list_advertisements: ListAdvertisementsQueryHandler,
}

impl AdvertisementServices {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            create_advertisement: CreateAdvertisementHandler::new(
                db.clone(),
                cache.clone(),
            ),
            update_advertisement: UpdateAdvertisementHandler::new(
                db.clone(),
                cache.clone(),
            ),
            delete_advertisement: DeleteAdvertisementHandler::new(
                db.clone(),
                cache.clone(),
            ),
            rent_property: RentPropertyHandler::new(
                db.clone(),
                cache.clone(),
            ),
            get_advertisement: GetAdvertisementQueryHandler::new(
                db.clone(),
                cache,
            ),
            list_advertisements: ListAdvertisementsQueryHandler::new(db),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct AdvertisementQueryParams {
    limit: Option<u64>,
    offset: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/advertisements",
    request_body = CreateAdvertisementCommand,
    responses(
        (status = 201, description = "Advertisement created", body = AdvertisementShortResponse),
        (status = 403, description = "Principal does not own the property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Property not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn create_advertisement(
    State(services): State<AdvertisementServices>, principal: AuthPrincipal,
    Json(command): Json<CreateAdvertisementCommand>,
) -> Result<(StatusCode, Json<AdvertisementShortResponse>), AppError> {
    let result = services
        .create_advertisement
        .execute(&principal, command)
        .await?;

    tracing::info!("Advertisement created: {}", result.id);

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/advertisements",
    params(AdvertisementQueryParams),
    responses(
        (status = 200, description = "List of advertisements", body = Vec<AdvertisementShortResponse>)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn list_advertisements(
    State(services): State<AdvertisementServices>,
    Query(params): Query<AdvertisementQueryParams>,
) -> Result<Json<Vec<AdvertisementShortResponse>>, AppError> {
    let query = advertisement_queries::ListAdvertisementsQuery {
        limit: params.limit,
        offset: params.offset,
    };
    let advertisements =
        services.list_advertisements.execute(query).await?;

    Ok(Json(advertisements))
}

#[utoipa::path(
    get,
    path = "/advertisements/{id}",
    params(
        ("id" = Uuid, Path, description = "Advertisement ID")
    ),
    responses(
        (status = 200, description = "Advertisement with embedded property", body = AdvertisementFullResponse),
        (status = 404, description = "Advertisement not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn get_advertisement(
    State(services): State<AdvertisementServices>, Path(id): Path<Uuid>,
) -> Result<Json<AdvertisementFullResponse>, AppError> {
    let query = advertisement_queries::GetAdvertisementQuery {
        advertisement_id: id,
    };
    let advertisement = services.get_advertisement.execute(query).await?;

    Ok(Json(advertisement))
}

#[utoipa::path(
    put,
    path = "/advertisements/{id}",
    request_body = UpdateAdvertisementCommand,
    params(
        ("id" = Uuid, Path, description = "Advertisement ID")
    ),
    responses(
        (status = 204, description = "Advertisement updated"),
        (status = 403, description = "Principal does not own the advertised property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Advertisement not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn update_advertisement(
    State(services): State<AdvertisementServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateAdvertisementCommand>,
) -> Result<StatusCode, AppError> {
    command.advertisement_id = id;
    services
        .update_advertisement
        .execute(&principal, command)
        .await?;

    tracing::info!("Advertisement updated: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/advertisements/{id}",
    params(
        ("id" = Uuid, Path, description = "Advertisement ID")
    ),
    responses(
        (status = 204, description = "Advertisement deleted"),
        (status = 403, description = "Principal does not own the advertised property", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Advertisement not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn delete_advertisement(
    State(services): State<AdvertisementServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let command = DeleteAdvertisementCommand {
        advertisement_id: id,
    };
    services
        .delete_advertisement
        .execute(&principal, command)
        .await?;

    tracing::info!("Advertisement deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/advertisements/rent",
    request_body = RentPropertyCommand,
    responses(
        (status = 204, description = "Property rented to the tenant"),
        (status = 403, description = "Principal is not the requesting tenant", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Tenant or advertisement not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "advertisements"
)]
#[instrument(skip_all)]
pub async fn rent_property(
    State(services): State<AdvertisementServices>, principal: AuthPrincipal,
    Json(command): Json<RentPropertyCommand>,
) -> Result<StatusCode, AppError> {
    services.rent_property.execute(&principal, command).await?;

    tracing::info!("Property rented via advertisement");

    Ok(StatusCode::NO_CONTENT)
}
