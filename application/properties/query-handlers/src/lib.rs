use std::sync::Arc;

use identity_responses::IdentityShortResponse;
use property_cache_keys::{PropertyCacheKey, PropertyFullResponse};
use property_dao::{PropertyDao, PropertyDetail};
use property_errors::PropertyError;
use property_queries::{GetPropertyQuery, ListPropertiesQuery};
use property_responses::PropertyWithCategoryResponse;
use redis_connection::{CacheBackend, CacheTypeBind};
use sql_connection::SqlConnect;
use tracing::instrument;

/// Builds the cached snapshot from a relational detail load.
pub fn full_response(detail: PropertyDetail) -> PropertyFullResponse {
    let tenant = detail.tenant.map(|tenant| {
        IdentityShortResponse::from_parts(tenant, detail.tenant_image)
    });

    PropertyFullResponse {
        id: detail.property.id,
        category: detail.category.map(Into::into),
        name: detail.property.name,
        address: detail.property.address,
        description: detail.property.description,
        advertisement: detail.advertisement.map(Into::into),
        owner: IdentityShortResponse::from_parts(
            detail.owner,
            detail.owner_image,
        ),
        tenant,
        images: detail.images.into_iter().map(Into::into).collect(),
        documents: detail.documents.into_iter().map(Into::into).collect(),
    }
}

/// Cache-aside read of one property's full response.
#[derive(Clone)]
pub struct GetPropertyQueryHandler {
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl GetPropertyQueryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetPropertyQuery,
    ) -> Result<PropertyFullResponse, PropertyError> {
        let entry = PropertyCacheKey
            .bind_with(self.cache.clone(), &query.property_id);

        if let Some(cached) = entry.try_get().await? {
            tracing::debug!("Cache hit for property {}", query.property_id);
            return Ok(cached);
        }

        tracing::debug!(
            "Cache miss for property {}, fetching from DB",
            query.property_id
        );

        let detail =
            self.property_dao.find_detail(query.property_id).await?;
        let response = full_response(detail);

        entry.set(&response).await?;

        Ok(response)
    }
}

#[derive(Clone)]
pub struct ListPropertiesQueryHandler {
    property_dao: PropertyDao,
}

impl ListPropertiesQueryHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            property_dao: PropertyDao::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListPropertiesQuery,
    ) -> Result<Vec<PropertyWithCategoryResponse>, PropertyError> {
        let properties = self
            .property_dao
            .list_with_category(query.limit, query.offset)
            .await?;

        Ok(properties
            .into_iter()
            .map(|(property, category)| {
                PropertyWithCategoryResponse::from_parts(property, category)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use property_queries::{GetPropertyQuery, ListPropertiesQuery};
    use test_utils::*;

    use super::*;

    #[tokio::test]
    async fn test_get_property_full_response() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = GetPropertyQueryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let category_id = create_test_category(&container).await.unwrap();
        let property_id =
            create_test_property(&container, owner_id, Some(category_id))
                .await
                .unwrap();
        create_test_advertisement(&container, property_id).await.unwrap();

        let response = handler
            .execute(GetPropertyQuery { property_id })
            .await
            .unwrap();

        assert_eq!(response.owner.email, "owner@example.com");
        assert!(response.category.is_some());
        assert!(response.advertisement.is_some());
        assert!(response.tenant.is_none());

        let entry = PropertyCacheKey.bind_with(cache, &property_id);
        assert_eq!(entry.try_get().await.unwrap(), Some(response));
    }

    #[tokio::test]
    async fn test_cached_read_skips_store() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = GetPropertyQueryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let property_id =
            create_test_property(&container, owner_id, None).await.unwrap();

        let first = handler
            .execute(GetPropertyQuery { property_id })
            .await
            .unwrap();

        // Change the row behind the cache's back; a cached read must still
        // serve the stale-but-present snapshot until invalidated.
        container
            .execute_sql(&format!(
                "UPDATE property SET name = 'Changed' WHERE id = \
                 '{property_id}'"
            ))
            .await
            .unwrap();

        let second = handler
            .execute(GetPropertyQuery { property_id })
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.name, "Deleon");
    }

    #[tokio::test]
    async fn test_list_bypasses_cache() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler =
            ListPropertiesQueryHandler::new(create_sql_connect(&container));

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let category_id = create_test_category(&container).await.unwrap();
        create_test_property(&container, owner_id, Some(category_id))
            .await
            .unwrap();

        let listed = handler
            .execute(ListPropertiesQuery {
                limit: None,
                offset: None,
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed[0].category.is_some());
    }
}
