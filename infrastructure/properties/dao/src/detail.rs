use advertisement_models::Advertisement;
use category_models::Category;
use database_traits::dao::GenericDao;
use identity_models::{Authority, Identity};
use media_models::{DocumentInfo, ImageInfo};
use property_errors::PropertyError;
use property_models::Property;
use tracing::instrument;
use uuid::Uuid;

use crate::PropertyDao;

/// Everything the property full response embeds, loaded relationally.
#[derive(Debug, Clone)]
pub struct PropertyDetail {
    pub property: Property,
    pub category: Option<Category>,
    pub owner: Identity,
    pub owner_image: Option<ImageInfo>,
    pub tenant: Option<Identity>,
    pub tenant_image: Option<ImageInfo>,
    pub advertisement: Option<Advertisement>,
    pub images: Vec<ImageInfo>,
    pub documents: Vec<DocumentInfo>,
}

impl PropertyDao {
    #[instrument(skip(self))]
    pub async fn find_detail(
        &self, id: Uuid,
    ) -> Result<PropertyDetail, PropertyError> {
        let property = self.find_by_id(id).await?;
        let client = self.db().get_read_client().await?;

        let category = match property.category_id {
            Some(category_id) => {
                let stmt = client
                    .prepare(
                        "SELECT id, name, description FROM category WHERE \
                         id = $1",
                    )
                    .await?;
                let rows = client.query(&stmt, &[&category_id]).await?;
                rows.first().map(|row| {
                    Category {
                        id: row.get(0),
                        name: row.get(1),
                        description: row.get(2),
                    }
                })
            }
            None => None,
        };

        let identity_stmt = client
            .prepare(
                "SELECT i.id, i.authority, i.username, i.password, i.email, \
                 i.enabled, i.firstname, i.lastname, i.patronymic, \
                 i.image_id, img.id, img.name, img.content_type, \
                 img.preview FROM identity i LEFT JOIN image img ON img.id \
                 = i.image_id WHERE i.id = $1",
            )
            .await?;

        let rows = client
            .query(&identity_stmt, &[&property.owner_id])
            .await?;
        let (owner, owner_image) = rows
            .first()
            .map(|row| (map_identity_row(row), map_identity_image(row)))
            .ok_or(PropertyError::OwnerNotFound {
                owner_id: property.owner_id,
            })?;

        let (tenant, tenant_image) = match property.tenant_id {
            Some(tenant_id) => {
                let rows =
                    client.query(&identity_stmt, &[&tenant_id]).await?;
                rows.first()
                    .map(|row| {
                        (
                            Some(map_identity_row(row)),
                            map_identity_image(row),
                        )
                    })
                    .unwrap_or((None, None))
            }
            None => (None, None),
        };

        let stmt = client
            .prepare(
                "SELECT id, title, description, property_id, price, date \
                 FROM advertisement WHERE property_id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;
        let advertisement = rows.first().map(|row| {
            Advertisement {
                id: row.get(0),
                title: row.get(1),
                description: row.get(2),
                property_id: row.get(3),
                price: row.get(4),
                date: row.get(5),
            }
        });

        let images = self.images_for(id).await?;
        let documents = self.documents_for(id).await?;

        Ok(PropertyDetail {
            property,
            category,
            owner,
            owner_image,
            tenant,
            tenant_image,
            advertisement,
            images,
            documents,
        })
    }
}

fn map_identity_row(row: &tokio_postgres::Row) -> Identity {
    let authority: String = row.get(1);
    Identity {
        id: row.get(0),
        authority: Authority::from_str_or_user(&authority),
        username: row.get(2),
        password_hash: row.get(3),
        email: row.get(4),
        enabled: row.get(5),
        firstname: row.get(6),
        lastname: row.get(7),
        patronymic: row.get(8),
        image_id: row.get(9),
    }
}

fn map_identity_image(row: &tokio_postgres::Row) -> Option<ImageInfo> {
    let id: Option<Uuid> = row.get(10);
    id.map(|id| {
        ImageInfo {
            id,
            name: row.get(11),
            content_type: row.get(12),
            preview: row.get(13),
        }
    })
}
