use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendConfig, Config};
use crate::models::image::{ImageUpload, StoredImage};
use crate::utils;

pub mod cloudinary;
pub mod local;
pub mod s3;

pub use cloudinary::CloudinaryStore;
pub use local::LocalStore;
pub use s3::S3Store;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Extensions the dashboard treats as images, lowercase.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage write failed: {0}")]
    Write(#[source] BoxError),

    #[error("storage read failed: {0}")]
    Read(#[source] BoxError),
}

/// A medium that holds uploaded images and serves them at public URLs.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist one image under a collision-free key and return its public URL.
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, StorageError>;

    /// Every stored image, most recent first.
    async fn list(&self) -> Result<Vec<StoredImage>, StorageError>;

    /// URL that makes the browser download instead of display.
    fn download_url(&self, url: &str) -> String {
        url.to_string()
    }

    fn name(&self) -> &'static str;
}

pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Builds the store selected by configuration. Called once at startup.
pub async fn build_store(config: &Config) -> Arc<dyn ImageStore> {
    match &config.backend {
        BackendConfig::Local(settings) => Arc::new(LocalStore::new(
            settings.upload_dir.clone(),
            settings.public_base_url.clone(),
        )),
        BackendConfig::Cloudinary(settings) => Arc::new(CloudinaryStore::new(settings.clone())),
        BackendConfig::S3(settings) => {
            let client = utils::s3::create_s3_client(settings).await;
            Arc::new(S3Store::new(client, settings))
        }
    }
}
