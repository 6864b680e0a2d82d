use advertisement_dao::AdvertisementDao;
use advertisement_errors::AdvertisementError;
use auth_core::AuthPrincipal;
use tracing::instrument;
use uuid::Uuid;

/// Create-path guard: the advertised property's owner must be the
/// authenticated principal.
#[instrument(skip(dao, principal))]
pub async fn ensure_property_owner(
    dao: &AdvertisementDao, principal: &AuthPrincipal, property_id: Uuid,
) -> Result<(), AdvertisementError> {
    let (_, email) = dao
        .property_owner_of(property_id)
        .await?
        .ok_or(AdvertisementError::PropertyNotFound { property_id })?;

    if email != principal.email {
        return Err(AdvertisementError::NotOwner);
    }

    Ok(())
}

/// Mutation-path guard: ownership runs transitively through the
/// advertisement's property to its owner.
#[instrument(skip(dao, principal))]
pub async fn ensure_owner(
    dao: &AdvertisementDao, principal: &AuthPrincipal,
    advertisement_id: Uuid,
) -> Result<(), AdvertisementError> {
    let (_, email) = dao.owner_of(advertisement_id).await?.ok_or(
        AdvertisementError::NotFound { advertisement_id },
    )?;

    if email != principal.email {
        return Err(AdvertisementError::NotOwner);
    }

    Ok(())
}

/// Rent-path guard: the requesting tenant authorizes as itself.
#[instrument(skip(dao, principal))]
pub async fn ensure_tenant_self(
    dao: &AdvertisementDao, principal: &AuthPrincipal, tenant_id: Uuid,
) -> Result<(), AdvertisementError> {
    let email = dao
        .identity_email(tenant_id)
        .await?
        .ok_or(AdvertisementError::TenantNotFound { tenant_id })?;

    if email != principal.email {
        return Err(AdvertisementError::NotOwner);
    }

    Ok(())
}
