use property_responses::PropertyWithCategoryResponse;
use redis_connection::cache_key;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized snapshot served by `GET /advertisements/{id}` and stored
/// in the cache; embeds the advertised property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvertisementFullResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub property: PropertyWithCategoryResponse,
    pub price: f64,
    /// Listing date rendered as `%d %B %Y`.
    pub date: String,
}

cache_key!(AdvertisementCacheKey::<AdvertisementFullResponse> => "advertisementFullResponse::{}"[id: Uuid]);
