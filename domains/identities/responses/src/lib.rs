use identity_models::Identity;
use media_models::ImageInfo;
use media_responses::ImageResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// List/embedding shape for an identity. The password hash never leaves
/// the DAO layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityShortResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub patronymic: String,
    pub image: Option<ImageResponse>,
}

impl IdentityShortResponse {
    pub fn from_parts(identity: Identity, image: Option<ImageInfo>) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            firstname: identity.firstname,
            lastname: identity.lastname,
            patronymic: identity.patronymic,
            image: image.map(ImageResponse::from),
        }
    }
}
