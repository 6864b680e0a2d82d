use async_trait::async_trait;
use category_models::Category;
use dao_utils::pagination::{PaginationParams, create_param_refs};
use database_traits::dao::GenericDao;
use property_commands::UpdatePropertyCommand;
use property_errors::PropertyError;
use property_models::Property;
use sql_connection::SqlConnect;
use tokio_postgres::IsolationLevel;
use tracing::instrument;
use uuid::Uuid;

pub use crate::detail::PropertyDetail;

mod detail;
mod media;

const PROPERTY_COLUMNS: &str =
    "id, category_id, name, address, description, owner_id, tenant_id";

/// Row handed to [`PropertyDao::create`] after the ownership guard has
/// already resolved the owner.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub owner_id: Uuid,
    pub tenant_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct PropertyDao {
    db: SqlConnect,
}

impl PropertyDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    pub fn db(&self) -> &SqlConnect { &self.db }

    /// Owner id and email for the guard, in one round trip.
    #[instrument(skip(self))]
    pub async fn owner_of(
        &self, property_id: Uuid,
    ) -> Result<Option<(Uuid, String)>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT i.id, i.email FROM property p JOIN identity i ON \
                 i.id = p.owner_id WHERE p.id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&property_id]).await?;

        Ok(rows.first().map(|row| (row.get(0), row.get(1))))
    }

    /// Email of an identity row, for the create-path guard.
    #[instrument(skip(self))]
    pub async fn identity_email(
        &self, identity_id: Uuid,
    ) -> Result<Option<String>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare("SELECT email FROM identity WHERE id = $1")
            .await?;
        let rows = client.query(&stmt, &[&identity_id]).await?;

        Ok(rows.first().map(|row| row.get(0)))
    }

    #[instrument(skip_all)]
    pub async fn list_with_category(
        &self, limit: Option<u64>, offset: Option<u64>,
    ) -> Result<Vec<(Property, Option<Category>)>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let pagination = PaginationParams::new(limit, offset);
        let (sql, params) = pagination.build_query_parts(
            "SELECT p.id, p.category_id, p.name, p.address, p.description, \
             p.owner_id, p.tenant_id, c.id, c.name, c.description FROM \
             property p LEFT JOIN category c ON c.id = p.category_id",
            "ORDER BY p.name ASC",
        );

        let stmt = client.prepare(&sql).await?;
        let param_refs = create_param_refs(&params);
        let rows = client.query(&stmt, &param_refs).await?;

        Ok(rows
            .iter()
            .map(|row| (self.map_row(row), map_joined_category(row, 7)))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_category(
        &self, category_id: Uuid,
    ) -> Result<Vec<Property>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM property WHERE category_id \
                 = $1 ORDER BY name ASC"
            ))
            .await?;
        let rows = client.query(&stmt, &[&category_id]).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }

    /// Ids of every property whose cached snapshot embeds the category.
    #[instrument(skip(self))]
    pub async fn ids_by_category(
        &self, category_id: Uuid,
    ) -> Result<Vec<Uuid>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare("SELECT id FROM property WHERE category_id = $1")
            .await?;
        let rows = client.query(&stmt, &[&category_id]).await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Ids of every property whose cached snapshot embeds the identity,
    /// as owner or as tenant.
    #[instrument(skip(self))]
    pub async fn ids_for_identity(
        &self, identity_id: Uuid,
    ) -> Result<Vec<Uuid>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT id FROM property WHERE owner_id = $1 OR tenant_id \
                 = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&identity_id]).await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    #[instrument(skip(self))]
    pub async fn owned_by(
        &self, identity_id: Uuid,
    ) -> Result<Vec<(Property, Option<Category>)>, PropertyError> {
        self.linked_to(identity_id, "p.owner_id = $1").await
    }

    #[instrument(skip(self))]
    pub async fn tenanted_by(
        &self, identity_id: Uuid,
    ) -> Result<Vec<(Property, Option<Category>)>, PropertyError> {
        self.linked_to(identity_id, "p.tenant_id = $1").await
    }

    async fn linked_to(
        &self, identity_id: Uuid, filter: &str,
    ) -> Result<Vec<(Property, Option<Category>)>, PropertyError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT p.id, p.category_id, p.name, p.address, \
                 p.description, p.owner_id, p.tenant_id, c.id, c.name, \
                 c.description FROM property p LEFT JOIN category c ON c.id \
                 = p.category_id WHERE {filter} ORDER BY p.name ASC"
            ))
            .await?;
        let rows = client.query(&stmt, &[&identity_id]).await?;

        Ok(rows
            .iter()
            .map(|row| (self.map_row(row), map_joined_category(row, 7)))
            .collect())
    }
}

#[async_trait]
impl GenericDao for PropertyDao {
    type CreateRequest = NewProperty;
    type Error = PropertyError;
    type ID = Uuid;
    type Model = Property;
    type Response = Property;
    type UpdateRequest = UpdatePropertyCommand;

    async fn find_by_id(
        &self, id: Self::ID,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM property WHERE id = $1"
            ))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(PropertyError::NotFound { property_id: id })
    }

    async fn all(&self) -> Result<Vec<Self::Response>, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM property ORDER BY name ASC"
            ))
            .await?;
        let rows = client.query(&stmt, &[]).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }

    async fn create(
        &self, req: Self::CreateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        if let Some(category_id) = req.category_id {
            let stmt = tx
                .prepare("SELECT 1 FROM category WHERE id = $1")
                .await?;
            if tx.query(&stmt, &[&category_id]).await?.is_empty() {
                return Err(PropertyError::CategoryNotFound { category_id });
            }
        }

        if let Some(tenant_id) = req.tenant_id {
            let stmt =
                tx.prepare("SELECT 1 FROM identity WHERE id = $1").await?;
            if tx.query(&stmt, &[&tenant_id]).await?.is_empty() {
                return Err(PropertyError::TenantNotFound { tenant_id });
            }
        }

        let id = Uuid::now_v7();
        let stmt = tx
            .prepare(&format!(
                "INSERT INTO property (id, category_id, name, address, \
                 description, owner_id, tenant_id) VALUES ($1, $2, $3, $4, \
                 $5, $6, $7) RETURNING {PROPERTY_COLUMNS}"
            ))
            .await?;
        let rows = tx
            .query(
                &stmt,
                &[
                    &id,
                    &req.category_id,
                    &req.name,
                    &req.address,
                    &req.description,
                    &req.owner_id,
                    &req.tenant_id,
                ],
            )
            .await?;

        let property = rows
            .first()
            .map(|row| self.map_row(row))
            .ok_or(PropertyError::NotFound { property_id: id })?;

        tx.commit().await?;
        Ok(property)
    }

    async fn update(
        &self, id: Self::ID, req: Self::UpdateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM property WHERE id = $1"
            ))
            .await?;
        let rows = tx.query(&stmt, &[&id]).await?;
        let current = rows
            .first()
            .map(|row| self.map_row(row))
            .ok_or(PropertyError::NotFound { property_id: id })?;

        // A provided id that resolves replaces the edge; anything else
        // keeps the current one (matching the partial-update contract).
        let category_id = match req.category_id {
            Some(category_id) => {
                let stmt = tx
                    .prepare("SELECT 1 FROM category WHERE id = $1")
                    .await?;
                if tx.query(&stmt, &[&category_id]).await?.is_empty() {
                    current.category_id
                }
                else {
                    Some(category_id)
                }
            }
            None => current.category_id,
        };

        let tenant_id = match req.tenant_id {
            Some(tenant_id) => {
                let stmt = tx
                    .prepare("SELECT 1 FROM identity WHERE id = $1")
                    .await?;
                if tx.query(&stmt, &[&tenant_id]).await?.is_empty() {
                    current.tenant_id
                }
                else {
                    Some(tenant_id)
                }
            }
            None => current.tenant_id,
        };

        let name = req.name.unwrap_or(current.name);
        let address = req.address.unwrap_or(current.address);
        let description = req.description.unwrap_or(current.description);

        let stmt = tx
            .prepare(&format!(
                "UPDATE property SET category_id = $1, name = $2, address \
                 = $3, description = $4, tenant_id = $5 WHERE id = $6 \
                 RETURNING {PROPERTY_COLUMNS}"
            ))
            .await?;
        let rows = tx
            .query(
                &stmt,
                &[&category_id, &name, &address, &description, &tenant_id, &id],
            )
            .await?;

        let property = rows
            .first()
            .map(|row| self.map_row(row))
            .ok_or(PropertyError::NotFound { property_id: id })?;

        tx.commit().await?;
        Ok(property)
    }

    /// Deletes the property and its now-orphaned media blobs in one
    /// transaction; the advertisement and join rows go with the cascade.
    async fn delete(&self, id: Self::ID) -> Result<(), Self::Error> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare(
                "SELECT image_id FROM property_image WHERE property_id = $1",
            )
            .await?;
        let image_ids: Vec<Uuid> = tx
            .query(&stmt, &[&id])
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();

        let stmt = tx
            .prepare(
                "SELECT document_id FROM property_document WHERE \
                 property_id = $1",
            )
            .await?;
        let document_ids: Vec<Uuid> = tx
            .query(&stmt, &[&id])
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();

        let stmt =
            tx.prepare("DELETE FROM property WHERE id = $1").await?;
        let deleted = tx.execute(&stmt, &[&id]).await?;

        if deleted == 0 {
            return Err(PropertyError::NotFound { property_id: id });
        }

        if !image_ids.is_empty() {
            let stmt = tx
                .prepare("DELETE FROM image WHERE id = ANY($1)")
                .await?;
            tx.execute(&stmt, &[&image_ids]).await?;
        }

        if !document_ids.is_empty() {
            let stmt = tx
                .prepare("DELETE FROM document WHERE id = ANY($1)")
                .await?;
            tx.execute(&stmt, &[&document_ids]).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    fn map_row(&self, row: &tokio_postgres::Row) -> Self::Model {
        Property {
            id: row.get(0),
            category_id: row.get(1),
            name: row.get(2),
            address: row.get(3),
            description: row.get(4),
            owner_id: row.get(5),
            tenant_id: row.get(6),
        }
    }
}

/// Maps a LEFT JOINed category projection starting at `offset`.
pub fn map_joined_category(
    row: &tokio_postgres::Row, offset: usize,
) -> Option<Category> {
    let id: Option<Uuid> = row.get(offset);
    id.map(|id| {
        Category {
            id,
            name: row.get(offset + 1),
            description: row.get(offset + 2),
        }
    })
}

#[cfg(test)]
mod tests {
    use database_traits::dao::GenericDao;
    use property_commands::UpdatePropertyCommand;
    use test_utils::*;

    use crate::{NewProperty, PropertyDao, PropertyError};

    #[tokio::test]
    async fn test_create_and_find_property() {
        let container = TestPostgresContainer::new().await.unwrap();
        let db = create_sql_connect(&container);
        let dao = PropertyDao::new(db);

        let owner_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        let category_id = create_test_category(&container).await.unwrap();

        let created = dao
            .create(NewProperty {
                category_id: Some(category_id),
                name: "Deleon".to_string(),
                address: "Novosibirsk, Russkaya 175/1".to_string(),
                description: "Hotel Deleon".to_string(),
                owner_id,
                tenant_id: None,
            })
            .await
            .unwrap();

        let found = dao.find_by_id(created.id).await.unwrap();
        assert_eq!(found.name, "Deleon");
        assert_eq!(found.owner_id, owner_id);
        assert_eq!(found.category_id, Some(category_id));
    }

    #[tokio::test]
    async fn test_create_with_missing_category_fails() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = PropertyDao::new(create_sql_connect(&container));

        let owner_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        let missing = uuid::Uuid::now_v7();

        let result = dao
            .create(NewProperty {
                category_id: Some(missing),
                name: "Deleon".to_string(),
                address: "addr".to_string(),
                description: "desc".to_string(),
                owner_id,
                tenant_id: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(PropertyError::CategoryNotFound { category_id }) if category_id == missing
        ));
    }

    #[tokio::test]
    async fn test_update_with_unknown_category_keeps_current() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = PropertyDao::new(create_sql_connect(&container));

        let owner_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        let category_id = create_test_category(&container).await.unwrap();

        let created = dao
            .create(NewProperty {
                category_id: Some(category_id),
                name: "Deleon".to_string(),
                address: "addr".to_string(),
                description: "desc".to_string(),
                owner_id,
                tenant_id: None,
            })
            .await
            .unwrap();

        let updated = dao
            .update(
                created.id,
                UpdatePropertyCommand {
                    property_id: created.id,
                    category_id: Some(uuid::Uuid::now_v7()),
                    name: Some("Renamed".to_string()),
                    address: None,
                    description: None,
                    tenant_id: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.category_id, Some(category_id));
        assert_eq!(updated.address, "addr");
    }

    #[tokio::test]
    async fn test_ids_for_identity_covers_owner_and_tenant() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = PropertyDao::new(create_sql_connect(&container));

        let owner_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        let tenant_id =
            create_test_identity(&container, "tenant@example.com")
                .await
                .unwrap();

        let owned = dao
            .create(NewProperty {
                category_id: None,
                name: "Owned".to_string(),
                address: "a1".to_string(),
                description: "d1".to_string(),
                owner_id,
                tenant_id: None,
            })
            .await
            .unwrap();
        let rented = dao
            .create(NewProperty {
                category_id: None,
                name: "Rented".to_string(),
                address: "a2".to_string(),
                description: "d2".to_string(),
                owner_id,
                tenant_id: Some(tenant_id),
            })
            .await
            .unwrap();

        let for_owner = dao.ids_for_identity(owner_id).await.unwrap();
        assert_eq!(for_owner.len(), 2);

        let for_tenant = dao.ids_for_identity(tenant_id).await.unwrap();
        assert_eq!(for_tenant, vec![rented.id]);

        let owned_only = dao.owned_by(owner_id).await.unwrap();
        assert_eq!(owned_only.len(), 2);
        assert!(owned_only.iter().any(|(p, _)| p.id == owned.id));

        let tenanted = dao.tenanted_by(tenant_id).await.unwrap();
        assert_eq!(tenanted.len(), 1);
    }
}
