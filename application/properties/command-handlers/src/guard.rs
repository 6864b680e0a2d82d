use auth_core::AuthPrincipal;
use property_dao::PropertyDao;
use property_errors::PropertyError;
use tracing::instrument;
use uuid::Uuid;

/// Create-path guard: the would-be owner named in the request must be the
/// authenticated principal. Read-only; runs before any mutation.
#[instrument(skip(dao, principal))]
pub async fn ensure_create_owner(
    dao: &PropertyDao, principal: &AuthPrincipal, owner_id: Uuid,
) -> Result<(), PropertyError> {
    let email = dao
        .identity_email(owner_id)
        .await?
        .ok_or(PropertyError::OwnerNotFound { owner_id })?;

    if email != principal.email {
        return Err(PropertyError::NotOwner);
    }

    Ok(())
}

/// Mutation-path guard: the property's owning identity must be the
/// authenticated principal. Callers that already hold a detail load use
/// [`ensure_detail_owner`] instead of re-querying.
#[instrument(skip(dao, principal))]
pub async fn ensure_owner(
    dao: &PropertyDao, principal: &AuthPrincipal, property_id: Uuid,
) -> Result<(), PropertyError> {
    let (_, email) = dao
        .owner_of(property_id)
        .await?
        .ok_or(PropertyError::NotFound { property_id })?;

    if email != principal.email {
        return Err(PropertyError::NotOwner);
    }

    Ok(())
}

pub fn ensure_detail_owner(
    principal: &AuthPrincipal, detail: &property_dao::PropertyDetail,
) -> Result<(), PropertyError> {
    if detail.owner.email != principal.email {
        return Err(PropertyError::NotOwner);
    }

    Ok(())
}
