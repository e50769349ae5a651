use std::fmt;
use std::path::PathBuf;

use validator::Validate;

use crate::utils::validation::validate_settings;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
const DEFAULT_PUBLIC_BASE_URL: &str = "/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
const DEFAULT_FOLDER: &str = "uploads";
const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub max_upload_bytes: usize,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone)]
pub enum BackendConfig {
    Local(LocalSettings),
    Cloudinary(CloudinarySettings),
    S3(S3Settings),
}

#[derive(Debug, Clone, Validate)]
pub struct LocalSettings {
    pub upload_dir: PathBuf,
    #[validate(length(min = 1))]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Validate)]
pub struct CloudinarySettings {
    #[validate(length(min = 1))]
    pub cloud_name: String,
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub api_secret: String,
    #[validate(length(min = 1))]
    pub folder: String,
    #[validate(url)]
    pub api_base: String,
}

#[derive(Debug, Clone, Validate)]
pub struct S3Settings {
    #[validate(length(min = 3, max = 63))]
    pub bucket: String,
    #[validate(length(min = 1))]
    pub access_key_id: String,
    #[validate(length(min = 1))]
    pub secret_access_key: String,
    #[validate(length(min = 1))]
    pub region: String,
    #[validate(url)]
    pub endpoint_url: Option<String>,
    pub prefix: String,
    #[validate(url)]
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every setting through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "MAX_UPLOAD_BYTES",
                    reason: format!("expected a positive integer, got {:?}", raw),
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let backend_name = get("STORAGE_BACKEND").unwrap_or_else(|| "local".to_string());
        let backend = match backend_name.to_lowercase().as_str() {
            "local" => {
                let settings = LocalSettings {
                    upload_dir: PathBuf::from(
                        get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
                    ),
                    public_base_url: get("PUBLIC_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
                };
                validate_settings("PUBLIC_BASE_URL", &settings)?;
                BackendConfig::Local(settings)
            }
            "cloudinary" => {
                let settings = CloudinarySettings {
                    cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                    api_key: required("CLOUDINARY_API_KEY")?,
                    api_secret: required("CLOUDINARY_API_SECRET")?,
                    folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
                    api_base: get("CLOUDINARY_API_BASE")
                        .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
                };
                validate_settings("CLOUDINARY_*", &settings)?;
                BackendConfig::Cloudinary(settings)
            }
            "s3" => {
                let bucket = required("AWS_S3_BUCKET")?;
                let public_base_url = get("S3_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", bucket));
                let settings = S3Settings {
                    access_key_id: required("AWS_ACCESS_KEY_ID")?,
                    secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                    region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
                    endpoint_url: get("AWS_ENDPOINT_URL"),
                    prefix: get("S3_PREFIX")
                        .map(|p| p.trim_matches('/').to_string())
                        .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
                    public_base_url,
                    bucket,
                };
                validate_settings("AWS_*", &settings)?;
                BackendConfig::S3(settings)
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    reason: format!("unknown backend {:?}, expected local, cloudinary or s3", other),
                })
            }
        };

        Ok(Config {
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            max_upload_bytes,
            backend,
        })
    }

    /// Directory to serve at `/uploads`, when files live on local disk.
    pub fn local_upload_dir(&self) -> Option<&PathBuf> {
        match &self.backend {
            BackendConfig::Local(settings) => Some(&settings.upload_dir),
            _ => None,
        }
    }
}
