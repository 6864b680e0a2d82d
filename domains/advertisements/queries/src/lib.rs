use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GetAdvertisementQuery {
    pub advertisement_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListAdvertisementsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
