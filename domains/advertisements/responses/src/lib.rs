use advertisement_models::Advertisement;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvertisementShortResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Listing date rendered as `%d %B %Y`, e.g. "07 August 2026".
    pub date: String,
}

impl From<Advertisement> for AdvertisementShortResponse {
    fn from(advertisement: Advertisement) -> Self {
        Self {
            id: advertisement.id,
            title: advertisement.title,
            description: advertisement.description,
            price: advertisement.price,
            date: advertisement.date.format("%d %B %Y").to_string(),
        }
    }
}
