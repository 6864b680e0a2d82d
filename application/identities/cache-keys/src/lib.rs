use media_responses::ImageResponse;
use property_responses::PropertyWithCategoryResponse;
use redis_connection::cache_key;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized snapshot served by `GET /identities/{id}` and stored in
/// the cache. Any mutation of an embedded property must delete this entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityFullResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub patronymic: String,
    pub image: Option<ImageResponse>,
    pub owner_properties: Vec<PropertyWithCategoryResponse>,
    pub tenant_properties: Vec<PropertyWithCategoryResponse>,
}

cache_key!(IdentityCacheKey::<IdentityFullResponse> => "identityFullResponse::{}"[id: Uuid]);
