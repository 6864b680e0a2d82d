use std::sync::Arc;

use auth_core::AuthPrincipal;
use category_commands::{
    CreateCategoryCommand, DeleteCategoryCommand, UpdateCategoryCommand,
};
use category_dao::CategoryDao;
use category_errors::CategoryError;
use category_responses::CategoryShortResponse;
use common_errors::AppError;
use database_traits::dao::GenericDao;
use property_dao::PropertyDao;
use redis_connection::CacheBackend;
use sql_connection::SqlConnect;
use tracing::instrument;

use crate::invalidation::invalidate_category_graph;

pub mod invalidation;

/// Categories are platform taxonomy, owned by administrators rather than
/// by a single identity.
#[derive(Clone)]
pub struct CreateCategoryHandler {
    category_dao: CategoryDao,
}

impl CreateCategoryHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            category_dao: CategoryDao::new(db),
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: CreateCategoryCommand,
    ) -> Result<CategoryShortResponse, AppError> {
        principal.require_admin()?;

        let category = self.category_dao.create(command).await?;

        Ok(category.into())
    }
}

#[derive(Clone)]
pub struct UpdateCategoryHandler {
    category_dao: CategoryDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl UpdateCategoryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            category_dao: CategoryDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: UpdateCategoryCommand,
    ) -> Result<CategoryShortResponse, AppError> {
        principal.require_admin()?;

        let category_id = command.category_id;
        let updated = self.category_dao.update(category_id, command).await?;

        let property_ids = self
            .property_dao
            .ids_by_category(category_id)
            .await
            .map_err(CategoryError::from)?;
        invalidate_category_graph(&self.cache, category_id, &property_ids)
            .await
            .map_err(CategoryError::Cache)?;

        Ok(updated.into())
    }
}

#[derive(Clone)]
pub struct DeleteCategoryHandler {
    category_dao: CategoryDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl DeleteCategoryHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            category_dao: CategoryDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: DeleteCategoryCommand,
    ) -> Result<(), AppError> {
        principal.require_admin()?;

        // Children are collected before SET NULL severs the edges
        let property_ids = self
            .property_dao
            .ids_by_category(command.category_id)
            .await
            .map_err(CategoryError::from)?;

        self.category_dao.delete(command.category_id).await?;

        invalidate_category_graph(
            &self.cache,
            command.category_id,
            &property_ids,
        )
        .await
        .map_err(CategoryError::Cache)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth_core::AuthPrincipal;
    use category_cache_keys::{CategoryCacheKey, CategoryFullResponse};
    use identity_models::Authority;
    use property_cache_keys::{PropertyCacheKey, PropertyFullResponse};
    use redis_connection::CacheTypeBind;
    use test_utils::*;
    use uuid::Uuid;

    use super::*;

    fn admin() -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            authority: Authority::Admin,
        }
    }

    fn user() -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::now_v7(),
            email: "user@example.com".to_string(),
            authority: Authority::User,
        }
    }

    fn stale_property(property_id: Uuid) -> PropertyFullResponse {
        PropertyFullResponse {
            id: property_id,
            category: None,
            name: "stale".to_string(),
            address: "stale".to_string(),
            description: "stale".to_string(),
            advertisement: None,
            owner: identity_responses::IdentityShortResponse {
                id: Uuid::now_v7(),
                username: "stale".to_string(),
                email: "stale@example.com".to_string(),
                firstname: "s".to_string(),
                lastname: "s".to_string(),
                patronymic: "s".to_string(),
                image: None,
            },
            tenant: None,
            images: vec![],
            documents: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler =
            CreateCategoryHandler::new(create_sql_connect(&container));

        let denied = handler
            .execute(
                &user(),
                CreateCategoryCommand {
                    name: "Hotels".to_string(),
                    description: "Hotel listings".to_string(),
                },
            )
            .await;
        assert!(matches!(denied, Err(AppError::Unauthorized { .. })));
        assert_eq!(count_rows(&container, "category").await.unwrap(), 0);

        let created = handler
            .execute(
                &admin(),
                CreateCategoryCommand {
                    name: "Hotels".to_string(),
                    description: "Hotel listings".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.name, "Hotels");
    }

    #[tokio::test]
    async fn test_delete_cascade_clears_category_and_children() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = DeleteCategoryHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let category_id = create_test_category(&container).await.unwrap();
        let p1 =
            create_test_property(&container, owner_id, Some(category_id))
                .await
                .unwrap();
        let p2 =
            create_test_property(&container, owner_id, Some(category_id))
                .await
                .unwrap();

        let category_entry =
            CategoryCacheKey.bind_with(cache.clone(), &category_id);
        category_entry
            .set(&CategoryFullResponse {
                id: category_id,
                name: "Hotels".to_string(),
                description: "stale".to_string(),
                properties: vec![],
            })
            .await
            .unwrap();
        let p1_entry = PropertyCacheKey.bind_with(cache.clone(), &p1);
        p1_entry.set(&stale_property(p1)).await.unwrap();
        let p2_entry = PropertyCacheKey.bind_with(cache.clone(), &p2);
        p2_entry.set(&stale_property(p2)).await.unwrap();

        handler
            .execute(&admin(), DeleteCategoryCommand { category_id })
            .await
            .unwrap();

        assert!(!category_entry.exists().await.unwrap());
        assert!(!p1_entry.exists().await.unwrap());
        assert!(!p2_entry.exists().await.unwrap());
        assert_eq!(count_rows(&container, "category").await.unwrap(), 0);
        // Children survive with a severed edge
        assert_eq!(count_rows(&container, "property").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_invalidates_even_when_only_property_cached() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = UpdateCategoryHandler::new(
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

        let property_entry =
            PropertyCacheKey.bind_with(cache.clone(), &property_id);
        property_entry
            .set(&stale_property(property_id))
            .await
            .unwrap();

        handler
            .execute(
                &admin(),
                UpdateCategoryCommand {
                    category_id,
                    name: Some("Apartments".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert!(!property_entry.exists().await.unwrap());
    }
}
