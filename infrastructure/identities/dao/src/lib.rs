use async_trait::async_trait;
use dao_utils::pagination::{PaginationParams, create_param_refs};
use database_traits::dao::GenericDao;
use identity_commands::UpdateIdentityCommand;
use identity_errors::IdentityError;
use identity_models::{Authority, Identity};
use media_models::{ImageInfo, UploadedFile};
use sql_connection::SqlConnect;
use tokio_postgres::{IsolationLevel, error::SqlState};
use tracing::instrument;
use uuid::Uuid;

const IDENTITY_COLUMNS: &str = "id, authority, username, password, email, \
                                enabled, firstname, lastname, patronymic, \
                                image_id";

/// Fully materialized row handed to [`IdentityDao::create`]; the password
/// arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub authority: Authority,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub enabled: bool,
    pub firstname: String,
    pub lastname: String,
    pub patronymic: String,
}

#[derive(Clone)]
pub struct IdentityDao {
    db: SqlConnect,
}

impl IdentityDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    pub fn db(&self) -> &SqlConnect { &self.db }

    #[instrument(skip(self))]
    pub async fn find_by_email(
        &self, email: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {IDENTITY_COLUMNS} FROM identity WHERE email = $1"
            ))
            .await?;
        let rows = client.query(&stmt, &[&email]).await?;

        Ok(rows.first().map(|row| self.map_row(row)))
    }

    /// Identity plus its profile image metadata in one round trip.
    #[instrument(skip(self))]
    pub async fn find_with_image(
        &self, id: Uuid,
    ) -> Result<(Identity, Option<ImageInfo>), IdentityError> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(
                "SELECT i.id, i.authority, i.username, i.password, i.email, \
                 i.enabled, i.firstname, i.lastname, i.patronymic, \
                 i.image_id, img.id, img.name, img.content_type, \
                 img.preview FROM identity i LEFT JOIN image img ON img.id \
                 = i.image_id WHERE i.id = $1",
            )
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| (self.map_row(row), map_joined_image(row, 10)))
            .ok_or(IdentityError::NotFound { identity_id: id })
    }

    #[instrument(skip_all)]
    pub async fn find_with_pagination(
        &self, limit: Option<u64>, offset: Option<u64>,
    ) -> Result<Vec<(Identity, Option<ImageInfo>)>, IdentityError> {
        let client = self.db.get_read_client().await?;
        let pagination = PaginationParams::new(limit, offset);
        let (sql, params) = pagination.build_query_parts(
            "SELECT i.id, i.authority, i.username, i.password, i.email, \
             i.enabled, i.firstname, i.lastname, i.patronymic, i.image_id, \
             img.id, img.name, img.content_type, img.preview FROM identity \
             i LEFT JOIN image img ON img.id = i.image_id",
            "ORDER BY i.username ASC",
        );

        let stmt = client.prepare(&sql).await?;
        let param_refs = create_param_refs(&params);
        let rows = client.query(&stmt, &param_refs).await?;

        Ok(rows
            .iter()
            .map(|row| (self.map_row(row), map_joined_image(row, 10)))
            .collect())
    }

    #[instrument(skip(self, password_hash))]
    pub async fn update_password(
        &self, id: Uuid, password_hash: &str,
    ) -> Result<(), IdentityError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("UPDATE identity SET password = $1 WHERE id = $2")
            .await?;
        let updated = client.execute(&stmt, &[&password_hash, &id]).await?;

        if updated == 0 {
            return Err(IdentityError::NotFound { identity_id: id });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self, id: Uuid, enabled: bool,
    ) -> Result<(), IdentityError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("UPDATE identity SET enabled = $1 WHERE id = $2")
            .await?;
        let updated = client.execute(&stmt, &[&enabled, &id]).await?;

        if updated == 0 {
            return Err(IdentityError::NotFound { identity_id: id });
        }

        Ok(())
    }

    /// Stores the uploaded file as the identity's profile image, replacing
    /// (and deleting) the previous one in the same transaction.
    #[instrument(skip(self, file))]
    pub async fn attach_image(
        &self, id: Uuid, file: &UploadedFile,
    ) -> Result<ImageInfo, IdentityError> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare("SELECT image_id FROM identity WHERE id = $1")
            .await?;
        let rows = tx.query(&stmt, &[&id]).await?;
        let old_image_id: Option<Uuid> = rows
            .first()
            .map(|row| row.get(0))
            .ok_or(IdentityError::NotFound { identity_id: id })?;

        let image_id = Uuid::now_v7();
        let stmt = tx
            .prepare(
                "INSERT INTO image (id, name, content_type, data, preview) \
                 VALUES ($1, $2, $3, $4, TRUE) RETURNING id, name, \
                 content_type, preview",
            )
            .await?;
        let rows = tx
            .query(
                &stmt,
                &[&image_id, &file.name, &file.content_type, &file.data],
            )
            .await?;
        let info = rows
            .first()
            .map(media_dao::map_image_info)
            .ok_or(IdentityError::ImageNotFound)?;

        let stmt = tx
            .prepare("UPDATE identity SET image_id = $1 WHERE id = $2")
            .await?;
        tx.execute(&stmt, &[&image_id, &id]).await?;

        if let Some(old_id) = old_image_id {
            let stmt =
                tx.prepare("DELETE FROM image WHERE id = $1").await?;
            tx.execute(&stmt, &[&old_id]).await?;
        }

        tx.commit().await?;
        Ok(info)
    }

    /// Detaches and deletes the identity's profile image.
    #[instrument(skip(self))]
    pub async fn remove_image(&self, id: Uuid) -> Result<(), IdentityError> {
        let mut client = self.db.get_client().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;

        let stmt = tx
            .prepare("SELECT image_id FROM identity WHERE id = $1")
            .await?;
        let rows = tx.query(&stmt, &[&id]).await?;
        let image_id: Option<Uuid> = rows
            .first()
            .map(|row| row.get(0))
            .ok_or(IdentityError::NotFound { identity_id: id })?;

        let Some(image_id) = image_id else {
            return Err(IdentityError::ImageNotFound);
        };

        let stmt = tx
            .prepare("UPDATE identity SET image_id = NULL WHERE id = $1")
            .await?;
        tx.execute(&stmt, &[&id]).await?;

        let stmt = tx.prepare("DELETE FROM image WHERE id = $1").await?;
        tx.execute(&stmt, &[&image_id]).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl GenericDao for IdentityDao {
    type CreateRequest = NewIdentity;
    type Error = IdentityError;
    type ID = Uuid;
    type Model = Identity;
    type Response = Identity;
    type UpdateRequest = UpdateIdentityCommand;

    async fn find_by_id(
        &self, id: Self::ID,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {IDENTITY_COLUMNS} FROM identity WHERE id = $1"
            ))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(IdentityError::NotFound { identity_id: id })
    }

    async fn all(&self) -> Result<Vec<Self::Response>, Self::Error> {
        let client = self.db.get_read_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {IDENTITY_COLUMNS} FROM identity ORDER BY username \
                 ASC"
            ))
            .await?;
        let rows = client.query(&stmt, &[]).await?;

        Ok(rows.iter().map(|row| self.map_row(row)).collect())
    }

    async fn create(
        &self, req: Self::CreateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_client().await?;
        let id = Uuid::now_v7();

        let stmt = client
            .prepare(&format!(
                "INSERT INTO identity (id, authority, username, password, \
                 email, enabled, firstname, lastname, patronymic) VALUES \
                 ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING \
                 {IDENTITY_COLUMNS}"
            ))
            .await?;
        let rows = client
            .query(
                &stmt,
                &[
                    &id,
                    &req.authority.as_str(),
                    &req.username,
                    &req.password_hash,
                    &req.email,
                    &req.enabled,
                    &req.firstname,
                    &req.lastname,
                    &req.patronymic,
                ],
            )
            .await
            .map_err(unique_violation_to_exists)?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(IdentityError::NotFound { identity_id: id })
    }

    async fn update(
        &self, id: Self::ID, req: Self::UpdateRequest,
    ) -> Result<Self::Response, Self::Error> {
        let client = self.db.get_client().await?;
        let authority = req.authority.map(|a| a.as_str());

        let stmt = client
            .prepare(&format!(
                "UPDATE identity SET authority = COALESCE($1, authority), \
                 username = COALESCE($2, username), email = COALESCE($3, \
                 email), firstname = COALESCE($4, firstname), lastname = \
                 COALESCE($5, lastname), patronymic = COALESCE($6, \
                 patronymic) WHERE id = $7 RETURNING {IDENTITY_COLUMNS}"
            ))
            .await?;
        let rows = client
            .query(
                &stmt,
                &[
                    &authority,
                    &req.username,
                    &req.email,
                    &req.firstname,
                    &req.lastname,
                    &req.patronymic,
                    &id,
                ],
            )
            .await
            .map_err(unique_violation_to_exists)?;

        rows.first()
            .map(|row| self.map_row(row))
            .ok_or(IdentityError::NotFound { identity_id: id })
    }

    async fn delete(&self, id: Self::ID) -> Result<(), Self::Error> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare("DELETE FROM identity WHERE id = $1")
            .await?;
        let deleted = client.execute(&stmt, &[&id]).await?;

        if deleted == 0 {
            return Err(IdentityError::NotFound { identity_id: id });
        }

        Ok(())
    }

    fn map_row(&self, row: &tokio_postgres::Row) -> Self::Model {
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
}

fn unique_violation_to_exists(err: tokio_postgres::Error) -> IdentityError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        IdentityError::AlreadyExists
    }
    else {
        IdentityError::Database(err)
    }
}

/// Maps a LEFT JOINed image projection starting at `offset`; a NULL id
/// means the identity has no image.
pub fn map_joined_image(
    row: &tokio_postgres::Row, offset: usize,
) -> Option<ImageInfo> {
    let id: Option<Uuid> = row.get(offset);
    id.map(|id| {
        ImageInfo {
            id,
            name: row.get(offset + 1),
            content_type: row.get(offset + 2),
            preview: row.get(offset + 3),
        }
    })
}

#[cfg(test)]
mod tests {
    use database_traits::dao::GenericDao;
    use identity_commands::UpdateIdentityCommand;
    use identity_models::Authority;
    use test_utils::*;

    use crate::{IdentityDao, IdentityError, NewIdentity};

    fn new_identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            authority: Authority::User,
            username: username.to_string(),
            password_hash: auth_core::hash_password("secret").unwrap(),
            email: email.to_string(),
            enabled: true,
            firstname: "Test".to_string(),
            lastname: "Identity".to_string(),
            patronymic: "None".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_identity() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = IdentityDao::new(create_sql_connect(&container));

        let created = dao
            .create(new_identity("owner", "owner@example.com"))
            .await
            .unwrap();
        assert_eq!(created.email, "owner@example.com");
        assert!(created.enabled);

        let found = dao.find_by_id(created.id).await.unwrap();
        assert_eq!(found.username, "owner");
        assert_eq!(found.authority, Authority::User);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_fails() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = IdentityDao::new(create_sql_connect(&container));

        dao.create(new_identity("first", "dup@example.com"))
            .await
            .unwrap();
        let result =
            dao.create(new_identity("second", "dup@example.com")).await;

        assert!(matches!(result, Err(IdentityError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = IdentityDao::new(create_sql_connect(&container));

        dao.create(new_identity("by-email", "by-email@example.com"))
            .await
            .unwrap();

        let found = dao.find_by_email("by-email@example.com").await.unwrap();
        assert!(found.is_some());
        assert!(dao.find_by_email("nope@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = IdentityDao::new(create_sql_connect(&container));

        let created = dao
            .create(new_identity("before", "update@example.com"))
            .await
            .unwrap();

        let updated = dao
            .update(
                created.id,
                UpdateIdentityCommand {
                    identity_id: created.id,
                    authority: None,
                    username: Some("after".to_string()),
                    email: None,
                    firstname: None,
                    lastname: None,
                    patronymic: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "after");
        assert_eq!(updated.email, "update@example.com");
        assert_eq!(updated.firstname, "Test");
    }

    #[tokio::test]
    async fn test_delete_missing_identity() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = IdentityDao::new(create_sql_connect(&container));

        let id = uuid::Uuid::now_v7();
        let result = dao.delete(id).await;
        assert!(
            matches!(result, Err(IdentityError::NotFound { identity_id }) if identity_id == id)
        );
    }
}
