use common_errors::AppError;
use redis_connection::CacheError;
use sql_connection::{PgError, PoolError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity not found: {identity_id}")]
    NotFound { identity_id: Uuid },
    #[error("Identity not found: {email}")]
    EmailNotFound { email: String },
    #[error("Username or email already exists")]
    AlreadyExists,
    #[error("Identity image not found")]
    ImageNotFound,
    #[error("Identity not authorized")]
    NotOwner,
    #[error("Identity password is null or empty")]
    EmptyPassword,
    #[error("Old and new passwords matched")]
    PasswordMatched,
    #[error("Identity statuses matched")]
    StatusMatched,
    #[error("Password hashing failed")]
    PasswordHash,
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] PoolError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Property(#[from] property_errors::PropertyError),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound { identity_id } => {
                AppError::not_found(
                    "IDENTITY_NOT_FOUND",
                    &format!("Identity with ID {identity_id} not found"),
                )
            }
            IdentityError::EmailNotFound { email } => {
                AppError::not_found(
                    "IDENTITY_NOT_FOUND",
                    &format!("Identity with email '{email}' not found"),
                )
            }
            IdentityError::AlreadyExists => {
                AppError::unprocessable_entity(
                    "IDENTITY_EXISTS",
                    "An identity with this username or email already exists",
                )
            }
            IdentityError::ImageNotFound => {
                AppError::not_found(
                    "IDENTITY_IMAGE_NOT_FOUND",
                    "Identity has no image to remove",
                )
            }
            IdentityError::NotOwner => {
                AppError::unauthorized(
                    "NOT_OWNER",
                    "Identity not authorized",
                )
            }
            IdentityError::EmptyPassword => {
                AppError::bad_request(
                    "EMPTY_PASSWORD",
                    "Identity password is null or empty",
                )
            }
            IdentityError::PasswordMatched => {
                AppError::conflict(
                    "PASSWORD_UNCHANGED",
                    "Old and new passwords matched",
                )
            }
            IdentityError::StatusMatched => {
                AppError::conflict(
                    "STATUS_UNCHANGED",
                    "Identity statuses matched",
                )
            }
            IdentityError::PasswordHash => {
                AppError::internal_server_error("Password hashing failed")
            }
            IdentityError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            IdentityError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
            IdentityError::Cache(cache_err) => {
                AppError::internal_server_error(&format!(
                    "Cache error: {cache_err}"
                ))
            }
            IdentityError::Property(property_err) => property_err.into(),
        }
    }
}
