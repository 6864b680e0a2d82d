use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GetIdentityQuery {
    pub identity_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListIdentitiesQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
