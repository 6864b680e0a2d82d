use std::sync::Arc;

use auth_core::AuthPrincipal;
use common_errors::AppError;
use database_traits::dao::GenericDao;
use property_commands::{
    CreatePropertyCommand, DeletePropertyCommand, UpdatePropertyCommand,
};
use property_dao::{NewProperty, PropertyDao};
use property_errors::PropertyError;
use property_responses::PropertyShortResponse;
use redis_connection::CacheBackend;
use sql_connection::SqlConnect;
use tracing::instrument;

pub use crate::media::{
    RemovePropertyDocumentsHandler, RemovePropertyImagesHandler,
    SetImagePreviewHandler, UploadPropertyDocumentsHandler,
    UploadPropertyImagesHandler,
};
use crate::invalidation::{
    PropertyCacheGraph, invalidate_property_graph,
};

pub mod guard;
pub mod invalidation;
mod media;

#[derive(Clone)]
pub struct CreatePropertyHandler {
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl CreatePropertyHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: CreatePropertyCommand,
    ) -> Result<PropertyShortResponse, AppError> {
        guard::ensure_create_owner(
            &self.property_dao,
            principal,
            command.owner_id,
        )
        .await?;

        let property = self
            .property_dao
            .create(NewProperty {
                category_id: command.category_id,
                name: command.name,
                address: command.address,
                description: command.description,
                owner_id: command.owner_id,
                tenant_id: command.tenant_id,
            })
            .await?;

        // The new row has no cache entry yet, but the parents embedding
        // property lists are stale now
        let graph = PropertyCacheGraph::of_created(&property);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(PropertyShortResponse::from_parts(property, vec![], vec![]))
    }
}

#[derive(Clone)]
pub struct UpdatePropertyHandler {
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl UpdatePropertyHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: UpdatePropertyCommand,
    ) -> Result<(), AppError> {
        let detail = self
            .property_dao
            .find_detail(command.property_id)
            .await?;
        guard::ensure_detail_owner(principal, &detail)?;

        let property_id = command.property_id;
        let updated =
            self.property_dao.update(property_id, command).await?;

        // Clear entries for the old edges and any newly set ones
        let graph =
            PropertyCacheGraph::of(&detail).merge_property(&updated);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct DeletePropertyHandler {
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl DeletePropertyHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: DeletePropertyCommand,
    ) -> Result<(), AppError> {
        let detail = self
            .property_dao
            .find_detail(command.property_id)
            .await?;
        guard::ensure_detail_owner(principal, &detail)?;

        // The graph is computed before the row disappears
        let graph = PropertyCacheGraph::of(&detail);
        self.property_dao.delete(command.property_id).await?;

        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth_core::AuthPrincipal;
    use identity_models::Authority;
    use property_cache_keys::PropertyCacheKey;
    use redis_connection::CacheTypeBind;
    use test_utils::*;
    use uuid::Uuid;

    use super::*;
    use crate::invalidation::PropertyCacheGraph;

    fn principal_for(id: Uuid, email: &str) -> AuthPrincipal {
        AuthPrincipal {
            id,
            email: email.to_string(),
            authority: Authority::User,
        }
    }

    fn create_command(owner_id: Uuid) -> CreatePropertyCommand {
        CreatePropertyCommand {
            category_id: None,
            name: "Deleon".to_string(),
            address: "Russkaya 175/1".to_string(),
            description: "Hotel Deleon".to_string(),
            owner_id,
            tenant_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_owner_before_mutation() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = CreatePropertyHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let intruder_id =
            create_test_identity(&container, "intruder@example.com")
                .await
                .unwrap();

        let result = handler
            .execute(
                &principal_for(intruder_id, "intruder@example.com"),
                create_command(owner_id),
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
        // Guard evaluation is read-only: nothing was inserted
        assert_eq!(count_rows(&container, "property").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_missing_owner_is_not_found() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = CreatePropertyHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let ghost = Uuid::now_v7();
        let result = handler
            .execute(
                &principal_for(ghost, "ghost@example.com"),
                create_command(ghost),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_by_owner_invalidates_property_and_category() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let db = create_sql_connect(&container);
        let handler = UpdatePropertyHandler::new(db.clone(), cache.clone());

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let category_id = create_test_category(&container).await.unwrap();
        let property_id =
            create_test_property(&container, owner_id, Some(category_id))
                .await
                .unwrap();

        // Seed only the property entry; the category entry is absent and
        // its removal must still be a no-op
        let entry = PropertyCacheKey.bind_with(cache.clone(), &property_id);
        entry.set(&stale_property_snapshot(property_id)).await.unwrap();

        handler
            .execute(
                &principal_for(owner_id, "owner@example.com"),
                UpdatePropertyCommand {
                    property_id,
                    category_id: None,
                    name: Some("Renamed".to_string()),
                    address: None,
                    description: None,
                    tenant_id: None,
                },
            )
            .await
            .unwrap();

        assert!(!entry.exists().await.unwrap());
    }

    fn stale_property_snapshot(
        property_id: Uuid,
    ) -> property_cache_keys::PropertyFullResponse {
        property_cache_keys::PropertyFullResponse {
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
    async fn test_delete_rejected_leaves_row() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = DeletePropertyHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let intruder_id =
            create_test_identity(&container, "intruder@example.com")
                .await
                .unwrap();
        let property_id =
            create_test_property(&container, owner_id, None).await.unwrap();

        let result = handler
            .execute(
                &principal_for(intruder_id, "intruder@example.com"),
                DeletePropertyCommand { property_id },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
        assert_eq!(count_rows(&container, "property").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_property_invalidates_parent_entries() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = CreatePropertyHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();

        // Seed the owner's identity snapshot: its embedded property list
        // goes stale the moment a property is created for it
        let owner_entry = identity_cache_keys::IdentityCacheKey
            .bind_with(cache.clone(), &owner_id);
        owner_entry
            .set(&identity_cache_keys::IdentityFullResponse {
                id: owner_id,
                username: "owner".to_string(),
                email: "owner@example.com".to_string(),
                firstname: "Test".to_string(),
                lastname: "Identity".to_string(),
                patronymic: "None".to_string(),
                image: None,
                owner_properties: vec![],
                tenant_properties: vec![],
            })
            .await
            .unwrap();

        let created = handler
            .execute(
                &principal_for(owner_id, "owner@example.com"),
                create_command(owner_id),
            )
            .await
            .unwrap();
        assert_eq!(created.name, "Deleon");

        assert!(!owner_entry.exists().await.unwrap());

        let graph = PropertyCacheGraph::of_created(&property_models::Property {
            id: created.id,
            category_id: None,
            name: created.name.clone(),
            address: created.address.clone(),
            description: created.description.clone(),
            owner_id,
            tenant_id: None,
        });
        assert!(graph.property_id.is_none());
        assert_eq!(graph.identity_ids, vec![owner_id]);
    }
}
