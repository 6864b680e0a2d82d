use std::sync::Arc;

use category_cache_keys::{CategoryCacheKey, CategoryFullResponse};
use category_dao::CategoryDao;
use category_errors::CategoryError;
use category_queries::{GetCategoryQuery, ListCategoriesQuery};
use category_responses::CategoryShortResponse;
use database_traits::dao::GenericDao;
use property_dao::PropertyDao;
use property_responses::PropertyShortResponse;
use redis_connection::{CacheBackend, CacheTypeBind};
use sql_connection::SqlConnect;
use tracing::instrument;

/// Cache-aside read of one category's full response, children included.
#[derive(Clone)]
pub struct GetCategoryQueryHandler {
    category_dao: CategoryDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl GetCategoryQueryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            category_dao: CategoryDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetCategoryQuery,
    ) -> Result<CategoryFullResponse, CategoryError> {
        let entry = CategoryCacheKey
            .bind_with(self.cache.clone(), &query.category_id);

        if let Some(cached) = entry.try_get().await? {
            tracing::debug!("Cache hit for category {}", query.category_id);
            return Ok(cached);
        }

        tracing::debug!(
            "Cache miss for category {}, fetching from DB",
            query.category_id
        );

        let category =
            self.category_dao.find_by_id(query.category_id).await?;
        let children =
            self.property_dao.find_by_category(category.id).await?;

        let mut properties = Vec::with_capacity(children.len());
        for property in children {
            let images = self.property_dao.images_for(property.id).await?;
            let documents =
                self.property_dao.documents_for(property.id).await?;
            properties.push(PropertyShortResponse::from_parts(
                property, images, documents,
            ));
        }

        let response = CategoryFullResponse {
            id: category.id,
            name: category.name,
            description: category.description,
            properties,
        };

        entry.set(&response).await?;

        Ok(response)
    }
}

#[derive(Clone)]
pub struct ListCategoriesQueryHandler {
    category_dao: CategoryDao,
}

impl ListCategoriesQueryHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            category_dao: CategoryDao::new(db),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListCategoriesQuery,
    ) -> Result<Vec<CategoryShortResponse>, CategoryError> {
        let categories = self
            .category_dao
            .find_with_pagination(query.limit, query.offset)
            .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use category_queries::GetCategoryQuery;
    use test_utils::*;

    use super::*;

    #[tokio::test]
    async fn test_get_category_embeds_children() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = GetCategoryQueryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let category_id = create_test_category(&container).await.unwrap();
        create_test_property(&container, owner_id, Some(category_id))
            .await
            .unwrap();

        let response = handler
            .execute(GetCategoryQuery { category_id })
            .await
            .unwrap();
        assert_eq!(response.name, "Hotels");
        assert_eq!(response.properties.len(), 1);

        let entry = CategoryCacheKey.bind_with(cache, &category_id);
        assert!(entry.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_category_not_found() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = GetCategoryQueryHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let category_id = uuid::Uuid::now_v7();
        let result =
            handler.execute(GetCategoryQuery { category_id }).await;

        assert!(matches!(
            result,
            Err(CategoryError::NotFound { category_id: id }) if id == category_id
        ));
    }
}
