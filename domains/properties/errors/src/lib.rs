use common_errors::AppError;
use redis_connection::CacheError;
use sql_connection::{PgError, PoolError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Property not found: {property_id}")]
    NotFound { property_id: Uuid },
    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: Uuid },
    #[error("Owner not found: {owner_id}")]
    OwnerNotFound { owner_id: Uuid },
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: Uuid },
    #[error("Property image not found: {image_id}")]
    ImageNotFound { image_id: Uuid },
    #[error("Identity not authorized")]
    NotOwner,
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] PoolError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<PropertyError> for AppError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::NotFound { property_id } => {
                AppError::not_found(
                    "PROPERTY_NOT_FOUND",
                    &format!("Property with ID {property_id} not found"),
                )
            }
            PropertyError::CategoryNotFound { category_id } => {
                AppError::not_found(
                    "CATEGORY_NOT_FOUND",
                    &format!("Category with ID {category_id} not found"),
                )
            }
            PropertyError::OwnerNotFound { owner_id } => {
                AppError::not_found(
                    "OWNER_NOT_FOUND",
                    &format!("Identity with ID {owner_id} not found"),
                )
            }
            PropertyError::TenantNotFound { tenant_id } => {
                AppError::not_found(
                    "TENANT_NOT_FOUND",
                    &format!("Identity with ID {tenant_id} not found"),
                )
            }
            PropertyError::ImageNotFound { image_id } => {
                AppError::not_found(
                    "PROPERTY_IMAGE_NOT_FOUND",
                    &format!(
                        "Image with ID {image_id} does not belong to the \
                         property"
                    ),
                )
            }
            PropertyError::NotOwner => {
                AppError::unauthorized("NOT_OWNER", "Identity not authorized")
            }
            PropertyError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            PropertyError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
            PropertyError::Cache(cache_err) => {
                AppError::internal_server_error(&format!(
                    "Cache error: {cache_err}"
                ))
            }
        }
    }
}
