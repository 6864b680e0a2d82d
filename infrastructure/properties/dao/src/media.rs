use media_dao::{map_document_info, map_image_info};
use media_models::{DocumentInfo, ImageInfo, UploadedFile};
use property_errors::PropertyError;
use tokio_postgres::IsolationLevel;
use tracing::instrument;
use uuid::Uuid;

use crate::PropertyDao;

impl PropertyDao {
    #[instrument(skip(self))]
    pub async fn images_for(
        &self, property_id: Uuid,
    ) -> Result<Vec<ImageInfo>, PropertyError> {
        let client = self.db().get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT i.id, i.name, i.content_type, i.preview FROM image \
                 i JOIN property_image pi ON pi.image_id = i.id WHERE \
                 pi.property_id = $1 ORDER BY i.name ASC",
            )
            .await?;
        let rows = client.query(&stmt, &[&property_id]).await?;

        Ok(rows.iter().map(map_image_info).collect())
    }

    #[instrument(skip(self))]
    pub async fn documents_for(
        &self, property_id: Uuid,
    ) -> Result<Vec<DocumentInfo>, PropertyError> {
        let client = self.db().get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT d.id, d.name, d.content_type FROM document d JOIN \
                 property_document pd ON pd.document_id = d.id WHERE \
                 pd.property_id = $1 ORDER BY d.name ASC",
            )
            .await?;
        let rows = client.query(&stmt, &[&property_id]).await?;

        Ok(rows.iter().map(map_document_info).collect())
    }

    /// Stores the uploaded files and links them to the property in one
    /// transaction.
    #[instrument(skip(self, files))]
    pub async fn attach_images(
        &self, property_id: Uuid, files: &[UploadedFile],
    ) -> Result<Vec<ImageInfo>, PropertyError> {
        let mut client = self.db().get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let insert_image = tx
            .prepare(
                "INSERT INTO image (id, name, content_type, data, preview) \
                 VALUES ($1, $2, $3, $4, FALSE) RETURNING id, name, \
                 content_type, preview",
            )
            .await?;
        let insert_link = tx
            .prepare(
                "INSERT INTO property_image (property_id, image_id) VALUES \
                 ($1, $2)",
            )
            .await?;

        let mut infos = Vec::with_capacity(files.len());
        for file in files {
            let id = Uuid::now_v7();
            let rows = tx
                .query(
                    &insert_image,
                    &[&id, &file.name, &file.content_type, &file.data],
                )
                .await?;
            let info = rows
                .first()
                .map(map_image_info)
                .ok_or(PropertyError::ImageNotFound { image_id: id })?;
            tx.execute(&insert_link, &[&property_id, &id]).await?;
            infos.push(info);
        }

        tx.commit().await?;
        Ok(infos)
    }

    /// Unlinks and deletes the requested images; ids not attached to this
    /// property are silently ignored.
    #[instrument(skip(self))]
    pub async fn remove_images(
        &self, property_id: Uuid, image_ids: &[Uuid],
    ) -> Result<u64, PropertyError> {
        let mut client = self.db().get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare(
                "SELECT image_id FROM property_image WHERE property_id = $1 \
                 AND image_id = ANY($2)",
            )
            .await?;
        let linked: Vec<Uuid> = tx
            .query(&stmt, &[&property_id, &image_ids])
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();

        if linked.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let stmt = tx
            .prepare("DELETE FROM image WHERE id = ANY($1)")
            .await?;
        let deleted = tx.execute(&stmt, &[&linked]).await?;

        tx.commit().await?;
        Ok(deleted)
    }

    #[instrument(skip(self, files))]
    pub async fn attach_documents(
        &self, property_id: Uuid, files: &[UploadedFile],
    ) -> Result<Vec<DocumentInfo>, PropertyError> {
        let mut client = self.db().get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let insert_document = tx
            .prepare(
                "INSERT INTO document (id, name, content_type, data) VALUES \
                 ($1, $2, $3, $4) RETURNING id, name, content_type",
            )
            .await?;
        let insert_link = tx
            .prepare(
                "INSERT INTO property_document (property_id, document_id) \
                 VALUES ($1, $2)",
            )
            .await?;

        let mut infos = Vec::with_capacity(files.len());
        for file in files {
            let id = Uuid::now_v7();
            let rows = tx
                .query(
                    &insert_document,
                    &[&id, &file.name, &file.content_type, &file.data],
                )
                .await?;
            if let Some(row) = rows.first() {
                infos.push(map_document_info(row));
            }
            tx.execute(&insert_link, &[&property_id, &id]).await?;
        }

        tx.commit().await?;
        Ok(infos)
    }

    #[instrument(skip(self))]
    pub async fn remove_documents(
        &self, property_id: Uuid, document_ids: &[Uuid],
    ) -> Result<u64, PropertyError> {
        let mut client = self.db().get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare(
                "SELECT document_id FROM property_document WHERE \
                 property_id = $1 AND document_id = ANY($2)",
            )
            .await?;
        let linked: Vec<Uuid> = tx
            .query(&stmt, &[&property_id, &document_ids])
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();

        if linked.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let stmt = tx
            .prepare("DELETE FROM document WHERE id = ANY($1)")
            .await?;
        let deleted = tx.execute(&stmt, &[&linked]).await?;

        tx.commit().await?;
        Ok(deleted)
    }

    /// Makes the given image the property's single preview image, clearing
    /// the flag on every other attached image in the same transaction.
    #[instrument(skip(self))]
    pub async fn set_image_preview(
        &self, property_id: Uuid, image_id: Uuid,
    ) -> Result<(), PropertyError> {
        let mut client = self.db().get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare(
                "SELECT 1 FROM property_image WHERE property_id = $1 AND \
                 image_id = $2",
            )
            .await?;
        if tx.query(&stmt, &[&property_id, &image_id]).await?.is_empty() {
            return Err(PropertyError::ImageNotFound { image_id });
        }

        let stmt = tx
            .prepare(
                "UPDATE image SET preview = FALSE WHERE preview AND id IN \
                 (SELECT image_id FROM property_image WHERE property_id = \
                 $1)",
            )
            .await?;
        tx.execute(&stmt, &[&property_id]).await?;

        let stmt = tx
            .prepare("UPDATE image SET preview = TRUE WHERE id = $1")
            .await?;
        tx.execute(&stmt, &[&image_id]).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use database_traits::dao::GenericDao;
    use media_models::UploadedFile;
    use test_utils::*;

    use crate::{NewProperty, PropertyDao};

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        }
    }

    async fn setup_property(
        container: &TestPostgresContainer,
    ) -> (PropertyDao, uuid::Uuid) {
        let dao = PropertyDao::new(create_sql_connect(container));
        let owner_id = create_test_identity(container, "owner@example.com")
            .await
            .unwrap();
        let property = dao
            .create(NewProperty {
                category_id: None,
                name: "Deleon".to_string(),
                address: "addr".to_string(),
                description: "desc".to_string(),
                owner_id,
                tenant_id: None,
            })
            .await
            .unwrap();
        (dao, property.id)
    }

    #[tokio::test]
    async fn test_attach_and_remove_images() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, property_id) = setup_property(&container).await;

        let infos = dao
            .attach_images(property_id, &[png("a.png"), png("b.png")])
            .await
            .unwrap();
        assert_eq!(infos.len(), 2);

        let listed = dao.images_for(property_id).await.unwrap();
        assert_eq!(listed.len(), 2);

        // An id belonging to another property must be ignored
        let stranger = uuid::Uuid::now_v7();
        let removed = dao
            .remove_images(property_id, &[infos[0].id, stranger])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(dao.images_for(property_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_swap_leaves_single_preview() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, property_id) = setup_property(&container).await;

        let infos = dao
            .attach_images(property_id, &[png("i1.png"), png("i2.png")])
            .await
            .unwrap();

        dao.set_image_preview(property_id, infos[0].id).await.unwrap();
        dao.set_image_preview(property_id, infos[1].id).await.unwrap();

        let listed = dao.images_for(property_id).await.unwrap();
        let previews: Vec<_> =
            listed.iter().filter(|info| info.preview).collect();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].id, infos[1].id);
    }

    #[tokio::test]
    async fn test_attach_documents_round_trip() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, property_id) = setup_property(&container).await;

        let infos = dao
            .attach_documents(
                property_id,
                &[UploadedFile {
                    name: "deed.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    data: vec![9, 9],
                }],
            )
            .await
            .unwrap();
        assert_eq!(infos.len(), 1);

        let removed = dao
            .remove_documents(property_id, &[infos[0].id])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(dao.documents_for(property_id).await.unwrap().is_empty());
    }
}
