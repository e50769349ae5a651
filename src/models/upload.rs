use serde::{Deserialize, Serialize};

use super::image::ImageUpload;
use crate::errors::AppError;

/// Which multipart field the client used; it decides the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    /// `image`, exactly one file.
    Single,
    /// `images`, repeated.
    Multiple,
}

impl UploadField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(UploadField::Single),
            "images" => Some(UploadField::Multiple),
            _ => None,
        }
    }

    pub fn missing_files_message(self) -> &'static str {
        match self {
            UploadField::Single => "No file uploaded",
            UploadField::Multiple => "No files uploaded",
        }
    }
}

#[derive(Debug)]
pub struct UploadForm {
    pub field: UploadField,
    pub files: Vec<ImageUpload>,
}

impl UploadForm {
    /// An upload request without any file is the client's fault.
    pub fn require_files(self) -> Result<Self, AppError> {
        if self.files.is_empty() {
            return Err(AppError::BadRequest(self.field.missing_files_message().to_string()));
        }
        Ok(self)
    }
}

/// Result of storing one file of a batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FileOutcome {
    Stored {
        #[serde(rename = "fileName")]
        file_name: String,
        url: String,
    },
    Failed {
        #[serde(rename = "fileName")]
        file_name: String,
        error: String,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Stored { file_name, .. } | FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            FileOutcome::Stored { url, .. } => Some(url),
            FileOutcome::Failed { .. } => None,
        }
    }
}

/// JSON envelope of `POST /api/upload`. Absent members are omitted.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<FileOutcome>>,
}

impl UploadResponse {
    pub fn failed_files(&self) -> Vec<&str> {
        self.results
            .iter()
            .flatten()
            .filter(|outcome| outcome.url().is_none())
            .map(FileOutcome::file_name)
            .collect()
    }
}
