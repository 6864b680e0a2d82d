use std::sync::Arc;

use auth_core::AuthPrincipal;
use common_errors::AppError;
use database_traits::dao::GenericDao;
use identity_commands::{
    ChangePasswordCommand, ChangeStatusCommand, CreateIdentityCommand,
    DeleteIdentityCommand, UpdateIdentityCommand,
};
use identity_dao::{IdentityDao, NewIdentity};
use identity_errors::IdentityError;
use identity_responses::IdentityShortResponse;
use media_models::UploadedFile;
use media_responses::ImageResponse;
use property_dao::PropertyDao;
use redis_connection::CacheBackend;
use sql_connection::SqlConnect;
use tracing::instrument;
use uuid::Uuid;

use crate::invalidation::invalidate_identity_graph;

pub mod guard;
pub mod invalidation;

/// Public registration; no guard and no cache interaction (a new identity
/// is embedded nowhere yet).
#[derive(Clone)]
pub struct CreateIdentityHandler {
    identity_dao: IdentityDao,
}

impl CreateIdentityHandler {
    pub fn new(db: SqlConnect) -> Self {
        Self {
            identity_dao: IdentityDao::new(db),
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(
        &self, command: CreateIdentityCommand,
    ) -> Result<IdentityShortResponse, AppError> {
        if command.password.is_empty() {
            return Err(IdentityError::EmptyPassword.into());
        }

        let password_hash = auth_core::hash_password(&command.password)
            .map_err(|_| IdentityError::PasswordHash)?;

        let identity = self
            .identity_dao
            .create(NewIdentity {
                authority: command.authority,
                username: command.username,
                password_hash,
                email: command.email,
                enabled: command.enabled.unwrap_or(true),
                firstname: command.firstname,
                lastname: command.lastname,
                patronymic: command.patronymic,
            })
            .await?;

        Ok(IdentityShortResponse::from_parts(identity, None))
    }
}

#[derive(Clone)]
pub struct UpdateIdentityHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl UpdateIdentityHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: UpdateIdentityCommand,
    ) -> Result<(), AppError> {
        guard::ensure_self(
            &self.identity_dao,
            principal,
            command.identity_id,
        )
        .await?;

        let identity_id = command.identity_id;
        self.identity_dao.update(identity_id, command).await?;

        let property_ids = self
            .property_dao
            .ids_for_identity(identity_id)
            .await
            .map_err(IdentityError::from)?;
        invalidate_identity_graph(&self.cache, identity_id, &property_ids)
            .await
            .map_err(IdentityError::Cache)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct DeleteIdentityHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl DeleteIdentityHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: DeleteIdentityCommand,
    ) -> Result<(), AppError> {
        guard::ensure_self(
            &self.identity_dao,
            principal,
            command.identity_id,
        )
        .await?;

        // Embedding properties are collected before the cascade removes
        // the ownership edges
        let property_ids = self
            .property_dao
            .ids_for_identity(command.identity_id)
            .await
            .map_err(IdentityError::from)?;

        self.identity_dao.delete(command.identity_id).await?;

        invalidate_identity_graph(
            &self.cache,
            command.identity_id,
            &property_ids,
        )
        .await
        .map_err(IdentityError::Cache)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct ChangePasswordHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl ChangePasswordHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: ChangePasswordCommand,
    ) -> Result<(), AppError> {
        if command.password.is_empty() {
            return Err(IdentityError::EmptyPassword.into());
        }

        let identity = guard::ensure_self(
            &self.identity_dao,
            principal,
            command.identity_id,
        )
        .await?;

        if auth_core::verify_password(
            &command.password,
            &identity.password_hash,
        ) {
            return Err(IdentityError::PasswordMatched.into());
        }

        let password_hash = auth_core::hash_password(&command.password)
            .map_err(|_| IdentityError::PasswordHash)?;
        self.identity_dao
            .update_password(command.identity_id, &password_hash)
            .await?;

        self.invalidate(command.identity_id).await?;

        Ok(())
    }

    async fn invalidate(&self, identity_id: Uuid) -> Result<(), AppError> {
        let property_ids = self
            .property_dao
            .ids_for_identity(identity_id)
            .await
            .map_err(IdentityError::from)?;
        invalidate_identity_graph(&self.cache, identity_id, &property_ids)
            .await
            .map_err(IdentityError::Cache)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ChangeStatusHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl ChangeStatusHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    /// Admin-only enable/disable toggle.
    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, command: ChangeStatusCommand,
    ) -> Result<(), AppError> {
        principal.require_admin()?;

        let identity =
            self.identity_dao.find_by_id(command.identity_id).await?;

        if identity.enabled == command.enabled {
            return Err(IdentityError::StatusMatched.into());
        }

        self.identity_dao
            .update_status(command.identity_id, command.enabled)
            .await?;

        let property_ids = self
            .property_dao
            .ids_for_identity(command.identity_id)
            .await
            .map_err(IdentityError::from)?;
        invalidate_identity_graph(
            &self.cache,
            command.identity_id,
            &property_ids,
        )
        .await
        .map_err(IdentityError::Cache)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct UploadIdentityImageHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl UploadIdentityImageHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal, file))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, identity_id: Uuid,
        file: UploadedFile,
    ) -> Result<ImageResponse, AppError> {
        guard::ensure_self(&self.identity_dao, principal, identity_id)
            .await?;

        let info =
            self.identity_dao.attach_image(identity_id, &file).await?;

        let property_ids = self
            .property_dao
            .ids_for_identity(identity_id)
            .await
            .map_err(IdentityError::from)?;
        invalidate_identity_graph(&self.cache, identity_id, &property_ids)
            .await
            .map_err(IdentityError::Cache)?;

        Ok(info.into())
    }
}

#[derive(Clone)]
pub struct RemoveIdentityImageHandler {
    identity_dao: IdentityDao,
    property_dao: PropertyDao,
    cache: Arc<CacheBackend>,
}

impl RemoveIdentityImageHandler {
    pub fn new(db: SqlConnect, cache: Arc<CacheBackend>) -> Self {
        Self {
            identity_dao: IdentityDao::new(db.clone()),
            property_dao: PropertyDao::new(db),
            cache,
        }
    }

    #[instrument(skip(self, principal))]
    pub async fn execute(
        &self, principal: &AuthPrincipal, identity_id: Uuid,
    ) -> Result<(), AppError> {
        guard::ensure_self(&self.identity_dao, principal, identity_id)
            .await?;

        self.identity_dao.remove_image(identity_id).await?;

        let property_ids = self
            .property_dao
            .ids_for_identity(identity_id)
            .await
            .map_err(IdentityError::from)?;
        invalidate_identity_graph(&self.cache, identity_id, &property_ids)
            .await
            .map_err(IdentityError::Cache)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth_core::AuthPrincipal;
    use identity_cache_keys::IdentityCacheKey;
    use identity_models::Authority;
    use property_cache_keys::PropertyCacheKey;
    use redis_connection::CacheTypeBind;
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

    fn admin_principal() -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            authority: Authority::Admin,
        }
    }

    #[tokio::test]
    async fn test_create_identity_hashes_password() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler =
            CreateIdentityHandler::new(create_sql_connect(&container));

        let created = handler
            .execute(CreateIdentityCommand {
                authority: Authority::User,
                username: "burgasvv".to_string(),
                password: "burgasvv".to_string(),
                email: "burgasvv@example.com".to_string(),
                enabled: None,
                firstname: "Slava".to_string(),
                lastname: "Burgas".to_string(),
                patronymic: "V".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.email, "burgasvv@example.com");
    }

    #[tokio::test]
    async fn test_create_identity_rejects_empty_password() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler =
            CreateIdentityHandler::new(create_sql_connect(&container));

        let result = handler
            .execute(CreateIdentityCommand {
                authority: Authority::User,
                username: "nopass".to_string(),
                password: String::new(),
                email: "nopass@example.com".to_string(),
                enabled: None,
                firstname: "No".to_string(),
                lastname: "Pass".to_string(),
                patronymic: "X".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest { .. })));
        assert_eq!(count_rows(&container, "identity").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_other_identity() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = UpdateIdentityHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let target_id =
            create_test_identity(&container, "target@example.com")
                .await
                .unwrap();
        let intruder_id =
            create_test_identity(&container, "intruder@example.com")
                .await
                .unwrap();

        let result = handler
            .execute(
                &principal_for(intruder_id, "intruder@example.com"),
                UpdateIdentityCommand {
                    identity_id: target_id,
                    authority: None,
                    username: Some("hijacked".to_string()),
                    email: None,
                    firstname: None,
                    lastname: None,
                    patronymic: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_change_password_same_password_conflicts() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = ChangePasswordHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let identity_id =
            create_test_identity(&container, "self@example.com")
                .await
                .unwrap();

        // Seed the identity's cache entry: a conflicting change must not
        // invalidate anything
        let entry = IdentityCacheKey.bind_with(cache.clone(), &identity_id);
        entry
            .set(&identity_cache_keys::IdentityFullResponse {
                id: identity_id,
                username: "self".to_string(),
                email: "self@example.com".to_string(),
                firstname: "Test".to_string(),
                lastname: "Identity".to_string(),
                patronymic: "None".to_string(),
                image: None,
                owner_properties: vec![],
                tenant_properties: vec![],
            })
            .await
            .unwrap();

        // Seed password is "secret"
        let result = handler
            .execute(
                &principal_for(identity_id, "self@example.com"),
                ChangePasswordCommand {
                    identity_id,
                    password: "secret".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
        assert!(entry.exists().await.unwrap());

        // A genuinely new password goes through and clears the entry
        handler
            .execute(
                &principal_for(identity_id, "self@example.com"),
                ChangePasswordCommand {
                    identity_id,
                    password: "rotated".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(!entry.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_change_status_requires_admin() {
        let container = TestPostgresContainer::new().await.unwrap();
        let handler = ChangeStatusHandler::new(
            create_sql_connect(&container),
            memory_backend(),
        );

        let identity_id =
            create_test_identity(&container, "user@example.com")
                .await
                .unwrap();

        let denied = handler
            .execute(
                &principal_for(identity_id, "user@example.com"),
                ChangeStatusCommand {
                    identity_id,
                    enabled: false,
                },
            )
            .await;
        assert!(matches!(denied, Err(AppError::Unauthorized { .. })));

        handler
            .execute(
                &admin_principal(),
                ChangeStatusCommand {
                    identity_id,
                    enabled: false,
                },
            )
            .await
            .unwrap();

        // Toggling to the value already set is a conflict
        let conflict = handler
            .execute(
                &admin_principal(),
                ChangeStatusCommand {
                    identity_id,
                    enabled: false,
                },
            )
            .await;
        assert!(matches!(conflict, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_fans_out_to_owned_properties() {
        let container = TestPostgresContainer::new().await.unwrap();
        let cache = memory_backend();
        let handler = DeleteIdentityHandler::new(
            create_sql_connect(&container),
            cache.clone(),
        );

        let identity_id =
            create_test_identity(&container, "owner@example.com")
                .await
                .unwrap();
        let property_id =
            create_test_property(&container, identity_id, None)
                .await
                .unwrap();

        let property_entry =
            PropertyCacheKey.bind_with(cache.clone(), &property_id);
        // Seed a stale property snapshot embedding the identity
        seed_property_entry(&property_entry, property_id).await;

        handler
            .execute(
                &principal_for(identity_id, "owner@example.com"),
                DeleteIdentityCommand { identity_id },
            )
            .await
            .unwrap();

        assert!(!property_entry.exists().await.unwrap());
        assert_eq!(count_rows(&container, "identity").await.unwrap(), 0);
    }

    async fn seed_property_entry(
        entry: &redis_connection::CacheEntry<
            property_cache_keys::PropertyFullResponse,
        >,
        property_id: Uuid,
    ) {
        entry
            .set(&property_cache_keys::PropertyFullResponse {
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
            })
            .await
            .unwrap();
    }
}
