use property_responses::PropertyShortResponse;
use redis_connection::cache_key;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized snapshot served by `GET /categories/{id}` and stored in
/// the cache; embeds every child property, so child mutations delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryFullResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub properties: Vec<PropertyShortResponse>,
}

cache_key!(CategoryCacheKey::<CategoryFullResponse> => "categoryFullResponse::{}"[id: Uuid]);
