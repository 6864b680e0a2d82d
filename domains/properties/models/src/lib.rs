use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property row. The owner is mandatory; category and tenant edges are
/// optional and severed with `SET NULL` on the referenced side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub owner_id: Uuid,
    pub tenant_id: Option<Uuid>,
}
