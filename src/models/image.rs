use actix_web::web::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
}

/// One validated file part of an upload request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    /// Lowercase extension sniffed from the bytes, without the dot.
    pub extension: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn storage_key(&self) -> String {
        format!("{}.{}", uuid::Uuid::new_v4().simple(), self.extension)
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImagesResponse {
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
