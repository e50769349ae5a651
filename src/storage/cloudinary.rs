use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use url::Url;

use super::{BoxError, ImageStore, StorageError};
use crate::config::CloudinarySettings;
use crate::models::image::{ImageUpload, StoredImage};

const SEARCH_PAGE_SIZE: u32 = 500;

/// Managed media store speaking the Cloudinary upload and search APIs.
pub struct CloudinaryStore {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

#[derive(Deserialize)]
struct UploadReply {
    secure_url: String,
}

#[derive(Deserialize)]
struct SearchReply {
    #[serde(default)]
    resources: Vec<SearchResource>,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct SearchResource {
    secure_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    expression: String,
    sort_by: serde_json::Value,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<&'a str>,
}

impl CloudinaryStore {
    pub fn new(settings: CloudinarySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BoxError> {
        // `join` drops the last segment of a base without a trailing slash.
        let mut base = Url::parse(&self.settings.api_base)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join(&format!("v1_1/{}/{}", self.settings.cloud_name, path))?)
    }

    /// Signs the given parameters the way Cloudinary expects: sorted
    /// `key=value` pairs joined by `&`, secret appended, SHA-256 hex.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.settings.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, BoxError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let context = format!("original_filename={}", escape_context(&image.file_name));
        let signature = self.sign(&[
            ("context", context.as_str()),
            ("folder", self.settings.folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = Part::bytes(image.bytes.to_vec())
            .file_name(image.storage_key())
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.settings.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.settings.folder.clone())
            .text("context", context)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("image/upload")?)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("upload responded {}", status).into());
        }

        Ok(response.json::<UploadReply>().await?.secure_url)
    }

    async fn search_page(&self, cursor: Option<&str>) -> Result<SearchReply, BoxError> {
        let request = SearchRequest {
            expression: search_expression(&self.settings.folder),
            sort_by: json!([{ "created_at": "desc" }]),
            max_results: SEARCH_PAGE_SIZE,
            next_cursor: cursor,
        };

        let response = self
            .client
            .post(self.endpoint("resources/search")?)
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("search responded {}", status).into());
        }

        Ok(response.json::<SearchReply>().await?)
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, StorageError> {
        let url = self.upload(image).await.map_err(StorageError::Write)?;
        log::debug!("Stored {} at {}", image.file_name, url);
        Ok(StoredImage { url })
    }

    async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let mut images = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .search_page(cursor.as_deref())
                .await
                .map_err(StorageError::Read)?;
            images.extend(page.resources.into_iter().map(|r| StoredImage { url: r.secure_url }));
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        Ok(images)
    }

    fn download_url(&self, url: &str) -> String {
        if url.contains("/upload/fl_attachment/") {
            return url.to_string();
        }
        url.replacen("/upload/", "/upload/fl_attachment/", 1)
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

/// Images directly inside `folder`; the folder name is quoted so spaces and
/// `:` survive the search syntax.
fn search_expression(folder: &str) -> String {
    let quoted = folder.replace('\\', "\\\\").replace('"', "\\\"");
    format!("resource_type:image AND folder=\"{}\"", quoted)
}

/// Context values are `key=value` pairs split on `|`; both must be escaped.
fn escape_context(value: &str) -> String {
    value.replace('\\', "\\\\").replace('=', "\\=").replace('|', "\\|")
}
