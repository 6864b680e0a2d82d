use identity_models::Authority;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateIdentityCommand {
    pub authority: Authority,
    pub username: String,
    pub password: String,
    pub email: String,
    pub enabled: Option<bool>,
    pub firstname: String,
    pub lastname: String,
    pub patronymic: String,
}

/// Partial profile update; absent fields keep their current value.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateIdentityCommand {
    #[serde(skip)]
    pub identity_id: Uuid,
    pub authority: Option<Authority>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub patronymic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteIdentityCommand {
    pub identity_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordCommand {
    #[serde(skip)]
    pub identity_id: Uuid,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeStatusCommand {
    #[serde(skip)]
    pub identity_id: Uuid,
    pub enabled: bool,
}
