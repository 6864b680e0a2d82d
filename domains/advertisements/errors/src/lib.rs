use common_errors::AppError;
use redis_connection::CacheError;
use sql_connection::{PgError, PoolError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AdvertisementError {
    #[error("Advertisement not found: {advertisement_id}")]
    NotFound { advertisement_id: Uuid },
    #[error("Property not found: {property_id}")]
    PropertyNotFound { property_id: Uuid },
    #[error("Identity tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: Uuid },
    #[error("Identity not authorized")]
    NotOwner,
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] PoolError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<AdvertisementError> for AppError {
    fn from(err: AdvertisementError) -> Self {
        match err {
            AdvertisementError::NotFound { advertisement_id } => {
                AppError::not_found(
                    "ADVERTISEMENT_NOT_FOUND",
                    &format!(
                        "Advertisement with ID {advertisement_id} not found"
                    ),
                )
            }
            AdvertisementError::PropertyNotFound { property_id } => {
                AppError::not_found(
                    "PROPERTY_NOT_FOUND",
                    &format!("Property with ID {property_id} not found"),
                )
            }
            AdvertisementError::TenantNotFound { tenant_id } => {
                AppError::not_found(
                    "TENANT_NOT_FOUND",
                    &format!("Identity with ID {tenant_id} not found"),
                )
            }
            AdvertisementError::NotOwner => {
                AppError::unauthorized("NOT_OWNER", "Identity not authorized")
            }
            AdvertisementError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            AdvertisementError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
            AdvertisementError::Cache(cache_err) => {
                AppError::internal_server_error(&format!(
                    "Cache error: {cache_err}"
                ))
            }
        }
    }
}
