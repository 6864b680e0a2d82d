use std::sync::Arc;

use auth_core::AuthPrincipal;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use category_cache_keys::CategoryFullResponse;
use category_command_handlers::{
    CreateCategoryHandler, DeleteCategoryHandler, UpdateCategoryHandler,
};
use category_commands::{
    CreateCategoryCommand, DeleteCategoryCommand, UpdateCategoryCommand,
};
use category_query_handlers::{
    GetCategoryQueryHandler, ListCategoriesQueryHandler,
};
use category_responses::CategoryShortResponse;
use common_errors::AppError;
use redis_connection::CacheBackend;
use serde::Deserialize;
use sql_connection::SqlConnect;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Clone)]
pub struct CategoryServices {
    pub create_category: CreateCategoryHandler,
    pub update_category: UpdateCategoryHandler,
    pub delete_category: DeleteCategoryHandler,

    pub get_category: GetCategoryQueryHandler,
    pub list_categories: ListCategoriesQueryHandler,
}

impl CategoryServices {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            create_category: CreateCategoryHandler::new(db.clone()),
            update_category: UpdateCategoryHandler::new(
                db.clone(),
                cache.clone(),
            ),
            delete_category: DeleteCategoryHandler::new(
                db.clone(),
                cache.clone(),
            ),
            get_category: GetCategoryQueryHandler::new(db.clone(), cache),
            list_categories: ListCategoriesQueryHandler::new(db),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CategoryQueryParams {
    limit: Option<u64>,
    offset: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryCommand,
    responses(
        (status = 201, description = "Category created", body = CategoryShortResponse),
        (status = 403, description = "Admin authority required", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Category name already exists", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn create_category(
    State(services): State<CategoryServices>, principal: AuthPrincipal,
    Json(command): Json<CreateCategoryCommand>,
) -> Result<(StatusCode, Json<CategoryShortResponse>), AppError> {
    let result =
        services.create_category.execute(&principal, command).await?;

    tracing::info!("Category created: {}", result.id);

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/categories",
    params(CategoryQueryParams),
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryShortResponse>)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn list_categories(
    State(services): State<CategoryServices>,
    Query(params): Query<CategoryQueryParams>,
) -> Result<Json<Vec<CategoryShortResponse>>, AppError> {
    let query = category_queries::ListCategoriesQuery {
        limit: params.limit,
        offset: params.offset,
    };
    let categories = services.list_categories.execute(query).await?;

    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category with embedded properties", body = CategoryFullResponse),
        (status = 404, description = "Category not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn get_category(
    State(services): State<CategoryServices>, Path(id): Path<Uuid>,
) -> Result<Json<CategoryFullResponse>, AppError> {
    let query = category_queries::GetCategoryQuery { category_id: id };
    let category = services.get_category.execute(query).await?;

    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    request_body = UpdateCategoryCommand,
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category updated", body = CategoryShortResponse),
        (status = 403, description = "Admin authority required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Category not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn update_category(
    State(services): State<CategoryServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>, Json(mut command): Json<UpdateCategoryCommand>,
) -> Result<Json<CategoryShortResponse>, AppError> {
    command.category_id = id;
    let result =
        services.update_category.execute(&principal, command).await?;

    tracing::info!("Category updated: {}", id);

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Admin authority required", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Category not found", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn delete_category(
    State(services): State<CategoryServices>, principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let command = DeleteCategoryCommand { category_id: id };
    services.delete_category.execute(&principal, command).await?;

    tracing::info!("Category deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}
