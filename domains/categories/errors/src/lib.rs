use common_errors::AppError;
use redis_connection::CacheError;
use sql_connection::{PgError, PoolError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found: {category_id}")]
    NotFound { category_id: Uuid },
    #[error("Category name already exists")]
    NameExists,
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] PoolError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Property(#[from] property_errors::PropertyError),
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound { category_id } => {
                AppError::not_found(
                    "CATEGORY_NOT_FOUND",
                    &format!("Category with ID {category_id} not found"),
                )
            }
            CategoryError::NameExists => {
                AppError::unprocessable_entity(
                    "CATEGORY_NAME_EXISTS",
                    "A category with this name already exists",
                )
            }
            CategoryError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            CategoryError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
            CategoryError::Cache(cache_err) => {
                AppError::internal_server_error(&format!(
                    "Cache error: {cache_err}"
                ))
            }
            CategoryError::Property(property_err) => property_err.into(),
        }
    }
}
