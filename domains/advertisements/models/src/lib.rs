use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub property_id: Uuid,
    pub price: f64,
    pub date: NaiveDate,
}
