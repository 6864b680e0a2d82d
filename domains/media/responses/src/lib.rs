use media_models::{DocumentInfo, ImageInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub preview: bool,
}

impl From<ImageInfo> for ImageResponse {
    fn from(info: ImageInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            content_type: info.content_type,
            preview: info.preview,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
}

impl From<DocumentInfo> for DocumentResponse {
    fn from(info: DocumentInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            content_type: info.content_type,
        }
    }
}
