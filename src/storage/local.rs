use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;

use super::{is_image_name, join_url, ImageStore, StorageError};
use crate::models::image::{ImageUpload, StoredImage};

/// Images kept as plain files in one directory, served under `base_url`.
pub struct LocalStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalStore {
    pub fn new(dir: PathBuf, base_url: String) -> Self {
        Self { dir, base_url }
    }
}

#[async_trait]
impl ImageStore for LocalStore {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| StorageError::Write(err.into()))?;

        let key = image.storage_key();
        fs::write(self.dir.join(&key), &image.bytes)
            .await
            .map_err(|err| StorageError::Write(err.into()))?;

        log::debug!("Stored {} as {}", image.file_name, key);
        Ok(StoredImage {
            url: join_url(&self.base_url, &key),
        })
    }

    async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing uploaded yet.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::Read(err.into())),
        };

        let mut found: Vec<(SystemTime, String)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| StorageError::Read(err.into()))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_image_name(&name) {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|err| StorageError::Read(err.into()))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((modified, name));
        }

        found.sort_by(|(a_time, a_name), (b_time, b_name)| {
            b_time.cmp(a_time).then_with(|| a_name.cmp(b_name))
        });

        Ok(found
            .into_iter()
            .map(|(_, name)| StoredImage {
                url: join_url(&self.base_url, &name),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
