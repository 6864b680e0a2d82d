use std::sync::Arc;

use auth_core::AuthPrincipal;
use common_errors::AppError;
use media_models::UploadedFile;
use media_responses::{DocumentResponse, ImageResponse};
use property_commands::{
    RemovePropertyDocumentsCommand, RemovePropertyImagesCommand,
    SetImagePreviewCommand,
};
use property_dao::PropertyDao;
use property_errors::PropertyError;
use redis_connection::CacheBackend;
use sql_connection::SqlConnect;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    guard,
    invalidation::{PropertyCacheGraph, invalidate_property_graph},
};

macro_rules! media_handler {
    ($name:ident) => {
        #[derive(Clone)]
        pub struct $name {
            property_dao: PropertyDao,
            cache: Arc<CacheBackend>,
        }

        impl $name {
            pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
                Self {
                    property_dao: PropertyDao::new(db),
                    cache,
                }
            }
        }
    };
}

media_handler!(UploadPropertyImagesHandler);
media_handler!(RemovePropertyImagesHandler);
media_handler!(UploadPropertyDocumentsHandler);
media_handler!(RemovePropertyDocumentsHandler);
media_handler!(SetImagePreviewHandler);

impl UploadPropertyImagesHandler {
    #[instrument(skip(self, principal, files))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, property_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<ImageResponse>, AppError> {
        let detail = self.property_dao.find_detail(property_id).await?;
        guard::ensure_detail_owner(principal, &detail)?;

        let infos = self
            .property_dao
            .attach_images(property_id, &files)
            .await?;

        let graph = PropertyCacheGraph::of(&detail);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(infos.into_iter().map(Into::into).collect())
    }
}

impl RemovePropertyImagesHandler {
    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal,
        command: RemovePropertyImagesCommand,
    ) -> Result<(), AppError> {
        let detail = self
            .property_dao
            .find_detail(command.property_id)
            .await?;
        guard::ensure_detail_owner(principal, &detail)?;

        self.property_dao
            .remove_images(command.property_id, &command.image_ids)
            .await?;

        let graph = PropertyCacheGraph::of(&detail);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(())
    }
}

impl UploadPropertyDocumentsHandler {
    #[instrument(skip(self, principal, files))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, property_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<DocumentResponse>, AppError> {
        let detail = self.property_dao.find_detail(property_id).await?;
        guard::ensure_detail_owner(principal, &detail)?;

        let infos = self
            .property_dao
            .attach_documents(property_id, &files)
            .await?;

        let graph = PropertyCacheGraph::of(&detail);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(infos.into_iter().map(Into::into).collect())
    }
}

impl RemovePropertyDocumentsHandler {
    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal,
        command: RemovePropertyDocumentsCommand,
    ) -> Result<(), AppError> {
        let detail = self
            .property_dao
            .find_detail(command.property_id)
            .await?;
        guard::ensure_detail_owner(principal, &detail)?;

        self.property_dao
            .remove_documents(command.property_id, &command.document_ids)
            .await?;

        let graph = PropertyCacheGraph::of(&detail);
        invalidate_property_graph(&self.cache, &graph)
            .await
            .map_err(PropertyError::Cache)?;

        Ok(())
    }
}

impl SetImagePreviewHandler {
    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: SetImagePreviewCommand,
    ) -> Result<(), AppError> {
        let detail = self
            .property_dao
            .find_detail(command.property_id)
            .await?;
        guard::ensure_detail_owner(principal, &detail)?;

        self.property_dao
            .set_image_preview(command.property_id, command.image_id)
            .await?;

        // Preview flags are embedded in the property snapshot
        let graph = PropertyCacheGraph::of(&detail);
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
    use test_utils::*;
    use uuid::Uuid;

    use super::*;

    fn principal_for(id: Uuid, email: &str) -> AuthPrincipal {
        AuthPrincipal {
            id,
            email: email.to_string(),
            authority: Authority::User,
        }
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: "image/png".to_string(),
            data: vec![1],
        }
    }

    #[tokio::test]
    async fn test_preview_swap_flips_exactly_one_flag() {
        let container = TestPostgresContainer::new().await.unwrap();
        let db = create_sql_connect(&container);
        let cache = memory_backend();

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let property_id =
            create_test_property(&container, owner_id, None).await.unwrap();
        let principal = principal_for(owner_id, "owner@example.com");

        let upload =
            UploadPropertyImagesHandler::new(db.clone(), cache.clone());
        let uploaded = upload
            .execute(
                &principal,
                property_id,
                vec![png("i1.png"), png("i2.png")],
            )
            .await
            .unwrap();

        let preview =
            SetImagePreviewHandler::new(db.clone(), cache.clone());
        preview
            .execute(
                &principal,
                property_commands::SetImagePreviewCommand {
                    property_id,
                    image_id: uploaded[0].id,
                },
            )
            .await
            .unwrap();
        preview
            .execute(
                &principal,
                property_commands::SetImagePreviewCommand {
                    property_id,
                    image_id: uploaded[1].id,
                },
            )
            .await
            .unwrap();

        let dao = property_dao::PropertyDao::new(db);
        let images = dao.images_for(property_id).await.unwrap();
        let previews: Vec<_> =
            images.iter().filter(|image| image.preview).collect();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].id, uploaded[1].id);
    }

    #[tokio::test]
    async fn test_upload_rejected_for_non_owner() {
        let container = TestPostgresContainer::new().await.unwrap();
        let db = create_sql_connect(&container);

        let owner_id = create_test_identity(&container, "owner@example.com")
            .await
            .unwrap();
        let intruder_id =
            create_test_identity(&container, "intruder@example.com")
                .await
                .unwrap();
        let property_id =
            create_test_property(&container, owner_id, None).await.unwrap();

        let upload =
            UploadPropertyImagesHandler::new(db, memory_backend());
        let result = upload
            .execute(
                &principal_for(intruder_id, "intruder@example.com"),
                property_id,
                vec![png("i1.png")],
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
        assert_eq!(count_rows(&container, "image").await.unwrap(), 0);
    }
}
