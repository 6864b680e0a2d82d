use advertisement_responses::AdvertisementShortResponse;
use category_responses::CategoryShortResponse;
use identity_responses::IdentityShortResponse;
use media_responses::{DocumentResponse, ImageResponse};
use redis_connection::cache_key;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized snapshot served by `GET /properties/{id}` and stored in
/// the cache. Embeds the category, advertisement, owner and tenant, so a
/// mutation of any of them deletes this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyFullResponse {
    pub id: Uuid,
    pub category: Option<CategoryShortResponse>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub advertisement: Option<AdvertisementShortResponse>,
    pub owner: IdentityShortResponse,
    pub tenant: Option<IdentityShortResponse>,
    pub images: Vec<ImageResponse>,
    pub documents: Vec<DocumentResponse>,
}

cache_key!(PropertyCacheKey::<PropertyFullResponse> => "propertyFullResponse::{}"[id: Uuid]);
