use std::sync::Arc;

use advertisement_commands::{
    CreateAdvertisementCommand, DeleteAdvertisementCommand,
    RentPropertyCommand, UpdateAdvertisementCommand,
};
use advertisement_dao::{AdvertisementDao, NewAdvertisement};
use advertisement_errors::AdvertisementError;
use advertisement_responses::AdvertisementShortResponse;
use auth_core::AuthPrincipal;
use common_errors::AppError;
use database_traits::dao::GenericDao;
use identity_cache_keys::IdentityCacheKey;
use property_cache_keys::PropertyCacheKey;
use redis_connection::{CacheBackend, CacheTypeBind};
use sql_connection::SqlConnect;
use tracing::instrument;

use crate::invalidation::invalidate_advertisement_graph;

pub mod guard;
pub mod invalidation;

#[derive(Clone)]
pub struct CreateAdvertisementHandler {
    advertisement_dao: AdvertisementDao,
    cache: Arc<CacheBackend>,
}

impl CreateAdvertisementHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal,
        command: CreateAdvertisementCommand,
    ) -> Result<AdvertisementShortResponse, AppError> {
        guard::ensure_property_owner(
            &self.advertisement_dao,
            principal,
            command.property_id,
        )
        .await?;

        let advertisement = self
            .advertisement_dao
            .create(NewAdvertisement {
                title: command.title,
                description: command.description,
                property_id: command.property_id,
                price: command.price,
                date: command
                    .date
                    .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            })
            .await?;

        // The parent property's snapshot embeds its advertisement slot
        PropertyCacheKey
            .bind_with(self.cache.clone(), &advertisement.property_id)
            .remove()
            .await
            .map_err(AdvertisementError::Cache)?;

        Ok(advertisement.into())
    }
}

#[derive(Clone)]
pub struct UpdateAdvertisementHandler {
    advertisement_dao: AdvertisementDao,
    cache: Arc<CacheBackend>,
}

impl UpdateAdvertisementHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal,
        command: UpdateAdvertisementCommand,
    ) -> Result<(), AppError> {
        guard::ensure_owner(
            &self.advertisement_dao,
            principal,
            command.advertisement_id,
        )
        .await?;

        let advertisement_id = command.advertisement_id;
        let updated = self
            .advertisement_dao
            .update(advertisement_id, command)
            .await?;

        invalidate_advertisement_graph(
            &self.cache,
            updated.id,
            updated.property_id,
        )
        .await
        .map_err(AdvertisementError::Cache)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct DeleteAdvertisementHandler {
    advertisement_dao: AdvertisementDao,
    cache: Arc<CacheBackend>,
}

impl DeleteAdvertisementHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal,
        command: DeleteAdvertisementCommand,
    ) -> Result<(), AppError> {
        guard::ensure_owner(
            &self.advertisement_dao,
            principal,
            command.advertisement_id,
        )
        .await?;

        // The parent edge is read before the row disappears
        let advertisement = self
            .advertisement_dao
            .find_by_id(command.advertisement_id)
            .await?;

        self.advertisement_dao
            .delete(command.advertisement_id)
            .await?;

        invalidate_advertisement_graph(
            &self.cache,
            advertisement.id,
            advertisement.property_id,
        )
        .await
        .map_err(AdvertisementError::Cache)?;

        Ok(())
    }
}

/// Rents the advertised property to the requesting tenant. The DAO takes
/// row locks on the tenant and the advertisement; the fan-out additionally
/// clears the tenant identity's snapshot, which now embeds the property.
#[derive(Clone)]
pub struct RentPropertyHandler {
    advertisement_dao: AdvertisementDao,
    cache: Arc<CacheBackend>,
}

impl RentPropertyHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: RentPropertyCommand,
    ) -> Result<(), AppError> {
        guard::ensure_tenant_self(
            &self.advertisement_dao,
            principal,
            command.tenant_id,
        )
        .await?;

        let outcome = self
            .advertisement_dao
            .rent(command.tenant_id, command.advertisement_id)
            .await?;

        IdentityCacheKey
            .bind_with(self.cache.clone(), &outcome.tenant_id)
            .remove()
            .await
            .map_err(AdvertisementError::Cache)?;
        invalidate_advertisement_graph(
            &self.cache,
            outcome.advertisement_id,
            outcome.property_id,
        )
        .await
        .map_err(AdvertisementError::Cache)?;

        Ok(())
    }
}
