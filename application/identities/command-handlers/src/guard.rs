use auth_core::AuthPrincipal;
use database_traits::dao::GenericDao;
use identity_dao::IdentityDao;
use identity_errors::IdentityError;
use identity_models::Identity;
use tracing::instrument;
use uuid::Uuid;

/// Self-service guard: the target identity must be the authenticated
/// principal itself. Returns the loaded identity so the handler does not
/// query it again.
#[instrument(skip(dao, principal))]
pub async fn ensure_self(
    dao: &IdentityDao, principal: &AuthPrincipal, identity_id: Uuid,
) -> Result<Identity, IdentityError> {
    let identity = dao.find_by_id(identity_id).await?;

    if identity.email != principal.email {
        return Err(IdentityError::NotOwner);
    }

    Ok(identity)
}
