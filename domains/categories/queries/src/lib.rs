use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GetCategoryQuery {
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListCategoriesQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
