use axum::{extract::FromRequestParts, http::request::Parts};
use common_errors::AppError;
use identity_models::Authority;
use uuid::Uuid;

/// Verified caller identity for the current request. Inserted into the
/// request extensions by the authentication middleware after the Basic
/// credentials have been validated against the identity store; lives for
/// exactly one request.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub id: Uuid,
    pub email: String,
    pub authority: Authority,
}

impl AuthPrincipal {
    pub fn is_admin(&self) -> bool {
        matches!(self.authority, Authority::Admin)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        }
        else {
            Err(AppError::unauthorized(
                "ADMIN_REQUIRED",
                "Identity not authorized",
            ))
        }
    }
}

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts, _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthPrincipal>().cloned().ok_or_else(|| {
            AppError::unauthenticated("Principal not found for request")
        })
    }
}
