use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdvertisementCommand {
    pub title: String,
    pub description: String,
    pub property_id: Uuid,
    pub price: f64,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAdvertisementCommand {
    #[serde(skip)]
    pub advertisement_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAdvertisementCommand {
    pub advertisement_id: Uuid,
}

/// Rent the advertised property to the given tenant identity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RentPropertyCommand {
    pub tenant_id: Uuid,
    pub advertisement_id: Uuid,
}
