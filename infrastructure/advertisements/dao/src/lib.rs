use advertisement_commands::UpdateAdvertisementCommand;
use advertisement_errors::AdvertisementError;
use advertisement_models::Advertisement;
use async_trait::async_trait;
use category_models::Category;
use chrono::NaiveDate;
use database_traits::dao::GenericDao;
use property_models::Property;
use sql_connection::SqlConnect;
use tokio_postgres::IsolationLevel;
use tracing::instrument;
use uuid::Uuid;

const ADVERTISEMENT_COLUMNS: &str =
    "id, title, description, property_id, price, date";

#[derive(Debug, Clone)]
pub struct NewAdvertisement {
    pub title: String,
    pub description: String,
    pub property_id: Uuid,
    pub price: f64,
    pub date: NaiveDate,
}

/// Row ids touched by a successful rental, for the invalidation fan-out.
#[derive(Debug, Clone)]
pub struct RentOutcome {
    pub advertisement_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
}

#[derive(Clone)]
pub struct AdvertisementDao {
    db: SqlConnect,
}

impl AdvertisementDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    /// Owner id and email of the advertised property, for the guard.
    #[instrument(skip(self))]
    pub async fn owner_of(
        &self, advertisement_id: Uuid,
    ) -> Result<Option<(Uuid, String)>, AdvertisementError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT i.id, i.email FROM advertisement a JOIN property p \
                 ON p.id = a.property_id JOIN identity i ON i.id = \
                 p.owner_id WHERE a.id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&advertisement_id]).await?;

        Ok(rows.first().map(|row| (row.get(0), row.get(1))))
    }

    /// Owner id and email of a property, for the create-path guard.
    #[instrument(skip(self))]
    pub async fn property_owner_of(
        &self, property_id: Uuid,
    ) -> Result<Option<(Uuid, String)>, AdvertisementError> {
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

    /// Email of an identity row, for the rent-path guard.
    #[instrument(skip(self))]
    pub async fn identity_email(
        &self, identity_id: Uuid,
    ) -> Result<Option<String>, AdvertisementError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare("SELECT email FROM identity WHERE id = $1")
            .await?;
        let rows = client.query(&stmt, &[&identity_id]).await?;

        Ok(rows.first().map(|row| row.get(0)))
    }

    /// Advertisement plus the advertised property and its category.
    #[instrument(skip(self))]
    pub async fn find_detail(
        &self, id: Uuid,
    ) -> Result<(Advertisement, Property, Option<Category>), AdvertisementError>
    {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT a.id, a.title, a.description, a.property_id, \
                 a.price, a.date, p.id, p.category_id, p.name, p.address, \
                 p.description, p.owner_id, p.tenant_id, c.id, c.name, \
                 c.description FROM advertisement a JOIN property p ON p.id \
                 = a.property_id LEFT JOIN category c ON c.id = \
                 p.category_id WHERE a.id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| {
                let advertisement = self.map_row(row);
                let property = Property {
                    id: row.get(6),
                    category_id: row.get(7),
                    name: row.get(8),
                    address: row.get(9),
                    description: row.get(10),
                    owner_id: row.get(11),
                    tenant_id: row.get(12),
                };
                let category_id: Option<Uuid> = row.get(13);
                let category = category_id.map(|category_id| {
                    Category {
                        id: category_id,
                        name: row.get(14),
                        description: row.get(15),
                    }
                });
                (advertisement, property, category)
            })
            .ok_or(AdvertisementError::NotFound {
                advertisement_id: id,
            })
    }

    #[instrument(skip(self))]
    pub async fn find_by_property(
        &self, property_id: Uuid,
    ) -> Result<Option<Advertisement>, AdvertisementError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {ADVERTISEMENT_COLUMNS} FROM advertisement WHERE \
                 property_id = $1"
            ))
            .await?;
        let rows = client.query(&stmt, &[&property_id]).await?;

        Ok(rows.first().map(|row| self.map_row(row)))
    }

    #[instrument(skip_all)]
    pub async fn find_with_pagination(
        &self, limit: Option<u64>, offset: Option<u64>,
    ) -> Result<Vec<Advertisement>, AdvertisementError> {
        let client = self.db.get_read_client().await?;
        let pagination = dao_utils::pagination::PaginationParams::new(
            limit, offset,
        );
        let (sql, params) = pagination.build_query_parts(
            &format!(
                "SELECT {ADVERTISEMENT_COLUMNS} FROM advertisement"
            ),
            "ORDER BY date DESC, title ASC",
        );

        let stmt = client.prepare(&sql).await?;
        let param_refs =
            dao_utils::pagination::create_param_refs(&params);
        let rows = client.query(&stmt, &param_refs).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }

    /// Assigns the advertised property to the tenant. Both the tenant row
    /// and the advertisement row are locked `FOR UPDATE`, so of two
    /// concurrent rentals the first to lock wins and the second overwrites
    /// after it; there is deliberately no already-rented check.
    #[instrument(skip(self))]
    pub async fn rent(
        &self, tenant_id: Uuid, advertisement_id: Uuid,
    ) -> Result<RentOutcome, AdvertisementError> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare("SELECT id FROM identity WHERE id = $1 FOR UPDATE")
            .await?;
        if tx.query(&stmt, &[&tenant_id]).await?.is_empty() {
            return Err(AdvertisementError::TenantNotFound { tenant_id });
        }

        let stmt = tx
            .prepare(
                "SELECT property_id FROM advertisement WHERE id = $1 FOR \
                 UPDATE",
            )
            .await?;
        let rows = tx.query(&stmt, &[&advertisement_id]).await?;
        let property_id: Uuid = rows
            .first()
            .map(|row| row.get(0))
            .ok_or(AdvertisementError::NotFound { advertisement_id })?;

        let stmt = tx
            .prepare("UPDATE property SET tenant_id = $1 WHERE id = $2")
            .await?;
        tx.execute(&stmt, &[&tenant_id, &property_id]).await?;

        tx.commit().await?;

        Ok(RentOutcome {
            advertisement_id,
            property_id,
            tenant_id,
        })
    }
}

#[async_trait]
impl GenericDao for AdvertisementDao {
    type CreateRequest = NewAdvertisement;
    type Error = AdvertisementError;
    type ID = Uuid;
    type Model = Advertisement;
    type Response = Advertisement;
    type UpdateRequest = UpdateAdvertisementCommand;

    async fn find_by_id(
        &self, id: Self::ID,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {ADVERTISEMENT_COLUMNS} FROM advertisement WHERE id \
                 = $1"
            ))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first().map(|row| self.map_row(row)).ok_or(
            AdvertisementError::NotFound {
                advertisement_id: id,
            },
        )
    }

    async fn all(&self) -> Result<Vec<Self::Response>, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {ADVERTISEMENT_COLUMNS} FROM advertisement ORDER BY \
                 date DESC, title ASC"
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

        let stmt =
            tx.prepare("SELECT 1 FROM property WHERE id = $1").await?;
        if tx.query(&stmt, &[&req.property_id]).await?.is_empty() {
            return Err(AdvertisementError::PropertyNotFound {
                property_id: req.property_id,
            });
        }

        let id = Uuid::now_v7();
        let stmt = tx
            .prepare(&format!(
                "INSERT INTO advertisement (id, title, description, \
                 property_id, price, date) VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {ADVERTISEMENT_COLUMNS}"
            ))
            .await?;
        let rows = tx
            .query(
                &stmt,
                &[
                    &id,
                    &req.title,
                    &req.description,
                    &req.property_id,
                    &req.price,
                    &req.date,
                ],
            )
            .await?;

        let advertisement = rows.first().map(|row| self.map_row(row)).ok_or(
            AdvertisementError::NotFound {
                advertisement_id: id,
            },
        )?;

        tx.commit().await?;
        Ok(advertisement)
    }

    async fn update(
        &self, id: Self::ID, req: Self::UpdateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare(&format!(
                "UPDATE advertisement SET title = COALESCE($1, title), \
                 description = COALESCE($2, description), price = \
                 COALESCE($3, price), date = COALESCE($4, date) WHERE id = \
                 $5 RETURNING {ADVERTISEMENT_COLUMNS}"
            ))
            .await?;
        let rows = client
            .query(
                &stmt,
                &[&req.title, &req.description, &req.price, &req.date, &id],
            )
            .await?;

        rows.first().map(|row| self.map_row(row)).ok_or(
            AdvertisementError::NotFound {
                advertisement_id: id,
            },
        )
    }

    async fn delete(&self, id: Self::ID) -> Result<(), Self::Error> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("DELETE FROM advertisement WHERE id = $1")
            .await?;
        let deleted = client.execute(&stmt, &[&id]).await?;

        if deleted == 0 {
            return Err(AdvertisementError::NotFound {
                advertisement_id: id,
            });
        }

        Ok(())
    }

    fn map_row(&self, row: &tokio_postgres::Row) -> Self::Model {
        Advertisement {
            id: row.get(0),
            title: row.get(1),
            description: row.get(2),
            property_id: row.get(3),
            price: row.get(4),
            date: row.get(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use database_traits::dao::GenericDao;
    use test_utils::*;

    use crate::{AdvertisementDao, AdvertisementError, NewAdvertisement};

    async fn setup(
        container: &TestPostgresContainer,
    ) -> (AdvertisementDao, uuid::Uuid, uuid::Uuid) {
        let dao = AdvertisementDao::new(create_sql_connect(container));
        let owner_id = create_test_identity(container, "owner@example.com")
            .await
            .unwrap();
        let property_id =
            create_test_property(container, owner_id, None).await.unwrap();
        (dao, owner_id, property_id)
    }

    fn listing(property_id: uuid::Uuid) -> NewAdvertisement {
        NewAdvertisement {
            title: "Deleon for rent".to_string(),
            description: "Every detail about renting the Deleon".to_string(),
            property_id,
            price: 340500.50,
            date: chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, _owner_id, property_id) = setup(&container).await;

        let created = dao.create(listing(property_id)).await.unwrap();
        let (advertisement, property, category) =
            dao.find_detail(created.id).await.unwrap();

        assert_eq!(advertisement.id, created.id);
        assert_eq!(property.id, property_id);
        assert!(category.is_none());
    }

    #[tokio::test]
    async fn test_create_for_missing_property_fails() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, ..) = setup(&container).await;

        let missing = uuid::Uuid::now_v7();
        let result = dao.create(listing(missing)).await;
        assert!(matches!(
            result,
            Err(AdvertisementError::PropertyNotFound { property_id }) if property_id == missing
        ));
    }

    #[tokio::test]
    async fn test_rent_assigns_tenant() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, _owner_id, property_id) = setup(&container).await;
        let tenant_id =
            create_test_identity(&container, "tenant@example.com")
                .await
                .unwrap();

        let advertisement = dao.create(listing(property_id)).await.unwrap();
        let outcome =
            dao.rent(tenant_id, advertisement.id).await.unwrap();

        assert_eq!(outcome.property_id, property_id);
        assert_eq!(outcome.tenant_id, tenant_id);

        let (_, property, _) = dao.find_detail(advertisement.id).await.unwrap();
        assert_eq!(property.tenant_id, Some(tenant_id));
    }

    #[tokio::test]
    async fn test_rent_with_missing_tenant_fails() {
        let container = TestPostgresContainer::new().await.unwrap();
        let (dao, _owner_id, property_id) = setup(&container).await;

        let advertisement = dao.create(listing(property_id)).await.unwrap();
        let missing = uuid::Uuid::now_v7();
        let result = dao.rent(missing, advertisement.id).await;

        assert!(matches!(
            result,
            Err(AdvertisementError::TenantNotFound { tenant_id }) if tenant_id == missing
        ));
    }
}
