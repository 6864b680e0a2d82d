use auth_core::{AuthPrincipal, BasicCredentials, verify_password};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use common_errors::AppError;
use identity_dao::IdentityDao;
use sql_connection::SqlConnect;
use tracing::instrument;

#[derive(Clone)]
pub struct AuthState {
    identity_dao: IdentityDao,
}

impl AuthState {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            identity_dao: IdentityDao::new(db),
        }
    }
}

/// Validates Basic credentials against the identity store and attaches an
/// [`AuthPrincipal`] to the request. Requests without an authorization
/// header pass through unauthenticated: guarded handlers reject them when
/// they extract the principal. Presented-but-invalid credentials are
/// rejected here. The ownership decision itself stays with the command
/// handlers.
#[instrument(skip_all)]
pub async fn authenticate(
    State(state): State<AuthState>, mut request: Request, next: Next,
) -> Result<Response, AppError> {
    let Some(header_value) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(next.run(request).await);
    };

    let credentials =
        BasicCredentials::from_header(header_value).ok_or_else(|| {
            AppError::unauthenticated("Malformed Basic credentials")
        })?;

    let identity = state
        .identity_dao
        .find_by_email(&credentials.email)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::unauthenticated("Invalid credentials"))?;

    if !identity.enabled
        || !verify_password(&credentials.password, &identity.password_hash)
    {
        return Err(AppError::unauthenticated("Invalid credentials"));
    }

    request.extensions_mut().insert(AuthPrincipal {
        id: identity.id,
        email: identity.email,
        authority: identity.authority,
    });

    Ok(next.run(request).await)
}
