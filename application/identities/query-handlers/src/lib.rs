use std::sync::Arc;

use identity_cache_keys::{IdentityCacheKey, IdentityFullResponse};
use identity_dao::IdentityDao;
use identity_errors::IdentityError;
use identity_queries::{GetIdentityQuery, ListIdentitiesQuery};
use identity_responses::IdentityShortResponse;
use property_dao::PropertyDao;
use property_responses::PropertyWithCategoryResponse;
use redis_connection::{CacheBackend, CacheTypeBind};
use sql_connection::SqlConnect;
use tracing::instrument;

/// Cache-aside read of one identity's full response.
#[derive(Clone)]
pub struct GetIdentityQueryHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl GetIdentityQueryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetIdentityQuery,
    ) -> Result<IdentityFullResponse, IdentityError> {
        let entry = IdentityCacheKey
            .bind_with(self.cache.clone(), &query.identity_id);

        if let Some(cached) = entry.try_get().await? {
            tracing::debug!("Cache hit for identity {}", query.identity_id);
            return Ok(cached);
        }

        tracing::debug!(
            "Cache miss for identity {}, fetching from DB",
            query.identity_id
        );

        let (identity, image) = self
            .identity_dao
            .find_with_image(query.identity_id)
            .await?;
        let owned = self.property_dao.owned_by(identity.id).await?;
        let tenanted = self.property_dao.tenanted_by(identity.id).await?;

        let response = IdentityFullResponse {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            firstname: identity.firstname,
            lastname: identity.lastname,
            patronymic: identity.patronymic,
            image: image.map(Into::into),
            owner_properties: owned
                .into_iter()
                .map(|(property, category)| {
                    PropertyWithCategoryResponse::from_parts(
                        property, category,
                    )
                })
                .collect(),
            tenant_properties: tenanted
                .into_iter()
                .map(|(property, category)| {
                    PropertyWithCategoryResponse::from_parts(
                        property, category,
                    )
                })
                .collect(),
        };

        entry.set(&response).await?;

        Ok(response)
    }
}

/// List endpoint; always hits the relational store and returns the short
/// shape.
#[derive(Clone)]
pub struct ListIdentitiesQueryHandler {
    identity_dao: IdentityDao,
}

impl ListIdentitiesQueryHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            identity_dao: IdentityDao::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListIdentitiesQuery,
    ) -> Result<Vec<IdentityShortResponse>, IdentityError> {
        let identities = self
            .identity_dao
            .find_with_pagination(query.limit, query.offset)
            .await?;

        Ok(identities
            .into_iter()
            .map(|(identity, image)| {
                IdentityShortResponse::from_parts(identity, image)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use identity_queries::GetIdentityQuery;
    use redis_connection::CacheKey;
    use test_utils::*;

    use super::*;

    #[tokio::test]
    async fn test_get_identity_populates_cache() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = GetIdentityQueryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let identity_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        create_test_property(&container, identity_id, None).await.unwrap();

        let first = handler
            .execute(GetIdentityQuery { identity_id })
            .await
            .unwrap();
        assert_eq!(first.email, "owner@example.com");
        assert_eq!(first.owner_properties.len(), 1);

        let entry = IdentityCacheKey.bind_with(cache.clone(), &identity_id);
        assert!(entry.exists().await.unwrap());

        // Second read must be served from the populated cache
        let second = handler
            .execute(GetIdentityQuery { identity_id })
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_identity_not_found() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = GetIdentityQueryHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let identity_id = uuid::Uuid::now_v7();
        let result =
            handler.execute(GetIdentityQuery { identity_id }).await;

        assert!(matches!(
            result,
            Err(identity_errors::IdentityError::NotFound { identity_id: id }) if id == identity_id
        ));
    }

    #[test]
    fn test_cache_key_format() {
        let id = uuid::Uuid::now_v7();
        let key = IdentityCacheKey.get_key_with_args((&id,));
        assert_eq!(key, format!("identityFullResponse::{id}"));
    }
}
