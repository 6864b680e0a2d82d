use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored image row, blob included. Only the byte-serving endpoint loads
/// this; everything else works on [`ImageInfo`].
#[derive(Debug, Clone)]
pub struct Image {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub preview: bool,
}

/// Blob-less projection of an image row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub preview: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
}

/// One file received through a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
