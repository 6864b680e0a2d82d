use std::sync::Arc;

use advertisement_cache_keys::{
    AdvertisementCacheKey, AdvertisementFullResponse,
};
use advertisement_dao::AdvertisementDao;
use advertisement_errors::AdvertisementError;
use advertisement_queries::{
    GetAdvertisementQuery, ListAdvertisementsQuery,
};
use advertisement_responses::AdvertisementShortResponse;
use property_responses::PropertyWithCategoryResponse;
use redis_connection::{CacheBackend, CacheTypeBind};
use sql_connection::SqlConnect;
use tracing::instrument;

/// Cache-aside read of one advertisement's full response.
#[derive(Clone)]
pub struct GetAdvertisementQueryHandler {
    advertisement_dao: AdvertisementDao,
    cache: Arc<CacheBackend>,
}

impl GetAdvertisementQueryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetAdvertisementQuery,
    ) -> Result<AdvertisementFullResponse, AdvertisementError> {
        let entry = AdvertisementCacheKey
            .bind_with(self.cache.clone(), &query.advertisement_id);

        if let Some(cached) = entry.try_get().await? {
            tracing::debug!(
                "Cache hit for advertisement {}",
                query.advertisement_id
            );
            return Ok(cached);
        }

        tracing::debug!(
            "Cache miss for advertisement {}, fetching from DB",
            query.advertisement_id
        );

        let (advertisement, property, category) = self
            .advertisement_dao
            .find_detail(query.advertisement_id)
            .await?;

        let response = AdvertisementFullResponse {
            id: advertisement.id,
            title: advertisement.title,
            description: advertisement.description,
            property: PropertyWithCategoryResponse::from_parts(
                property, category,
            ),
            price: advertisement.price,
            date: advertisement.date.format("%d %B %Y").to_string(),
        };

        entry.set(&response).await?;

        Ok(response)
    }
}

#[derive(Clone)]
pub struct ListAdvertisementsQueryHandler {
    advertisement_dao: AdvertisementDao,
}

impl ListAdvertisementsQueryHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            advertisement_dao: AdvertisementDao::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListAdvertisementsQuery,
    ) -> Result<Vec<AdvertisementShortResponse>, AdvertisementError> {
        let advertisements = self
            .advertisement_dao
            .find_with_pagination(query.limit, query.offset)
            .await?;
        Ok(advertisements.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use advertisement_queries::GetAdvertisementQuery;
    use test_utils::*;

    use super::*;

    #[tokio::test]
    async fn test_get_advertisement_embeds_property() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = GetAdvertisementQueryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let property_id =
            create_test_property(&container, owner_id, None).await.unwrap();
        let advertisement_id =
            create_test_advertisement(&container, property_id)
                .await
                .unwrap();

        let response = handler
            .execute(GetAdvertisementQuery { advertisement_id })
            .await
            .unwrap();
        assert_eq!(response.property.id, property_id);
        assert_eq!(response.title, "Deleon for rent");

        let entry =
            AdvertisementCacheKey.bind_with(cache, &advertisement_id);
        assert!(entry.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_advertisement_not_found() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = GetAdvertisementQueryHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let advertisement_id = uuid::Uuid::now_v7();
        let result = handler
            .execute(GetAdvertisementQuery { advertisement_id })
            .await;

        assert!(matches!(
            result,
            Err(AdvertisementError::NotFound { advertisement_id: id }) if id == advertisement_id
        ));
    }
}
