use category_models::Category;
use category_responses::CategoryShortResponse;
use media_models::{DocumentInfo, ImageInfo};
use media_responses::{DocumentResponse, ImageResponse};
use property_models::Property;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// List shape for a property: media attached, relations omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PropertyShortResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub description: String,
    pub images: Vec<ImageResponse>,
    pub documents: Vec<DocumentResponse>,
}

impl PropertyShortResponse {
    pub fn from_parts(
        property: Property, images: Vec<ImageInfo>,
        documents: Vec<DocumentInfo>,
    ) -> Self {
        Self {
            id: property.id,
            name: property.name,
            address: property.address,
            description: property.description,
            images: images.into_iter().map(ImageResponse::from).collect(),
            documents: documents
                .into_iter()
                .map(DocumentResponse::from)
                .collect(),
        }
    }
}

/// Embedding shape used by identity and advertisement full responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PropertyWithCategoryResponse {
    pub id: Uuid,
    pub category: Option<CategoryShortResponse>,
    pub name: String,
    pub address: String,
    pub description: String,
}

impl PropertyWithCategoryResponse {
    pub fn from_parts(property: Property, category: Option<Category>) -> Self {
        Self {
            id: property.id,
            category: category.map(CategoryShortResponse::from),
            name: property.name,
            address: property.address,
            description: property.description,
        }
    }
}
