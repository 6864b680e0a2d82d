use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePropertyCommand {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub owner_id: Uuid,
    pub tenant_id: Option<Uuid>,
}

/// Partial update; absent fields keep their current value. The owner edge
/// is fixed at creation time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePropertyCommand {
    #[serde(skip)]
    pub property_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePropertyCommand {
    pub property_id: Uuid,
}

/// Detach (and delete) the listed images from a property.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemovePropertyImagesCommand {
    #[serde(skip)]
    pub property_id: Uuid,
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemovePropertyDocumentsCommand {
    #[serde(skip)]
    pub property_id: Uuid,
    pub document_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetImagePreviewCommand {
    pub property_id: Uuid,
    pub image_id: Uuid,
}
