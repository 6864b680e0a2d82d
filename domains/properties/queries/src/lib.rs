use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GetPropertyQuery {
    pub property_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListPropertiesQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
