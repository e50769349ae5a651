use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{is_image_name, join_url, ImageStore, StorageError};
use crate::config::S3Settings;
use crate::models::image::{ImageUpload, StoredImage};

/// Managed store on an S3-compatible bucket; objects must be publicly readable
/// under `public_base_url`.
pub struct S3Store {
    client: S3Client,
    bucket: String,
    prefix: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: S3Client, settings: &S3Settings) -> Self {
        Self {
            client,
            bucket: settings.bucket.clone(),
            prefix: settings.prefix.clone(),
            public_base_url: settings.public_base_url.clone(),
        }
    }

    fn object_key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

#[async_trait]
impl ImageStore for S3Store {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, StorageError> {
        let storage_key = image.storage_key();
        let key = self.object_key(&storage_key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&image.content_type)
            .metadata("original-filename", &image.file_name)
            // Browsers ignore `download` on cross-origin links; the header still works.
            .content_disposition(attachment_disposition(&image.file_name, &storage_key))
            .body(image.bytes.to_vec().into())
            .send()
            .await
            .map_err(|err| StorageError::Write(err.into()))?;

        log::debug!("Stored {} as s3://{}/{}", image.file_name, self.bucket, key);
        Ok(StoredImage {
            url: join_url(&self.public_base_url, &key),
        })
    }

    async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let prefix = self.object_key("");
        let mut found: Vec<((i64, u32), String)> = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| StorageError::Read(err.into()))?;

            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                if !is_image_name(key) {
                    continue;
                }
                let modified = object
                    .last_modified()
                    .map(|at| (at.secs(), at.subsec_nanos()))
                    .unwrap_or_default();
                found.push((modified, key.to_string()));
            }

            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        found.sort_by(|(a_time, a_key), (b_time, b_key)| b_time.cmp(a_time).then_with(|| a_key.cmp(b_key)));

        Ok(found
            .into_iter()
            .map(|(_, key)| StoredImage {
                url: join_url(&self.public_base_url, &key),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

/// `attachment` with a header-safe filename, falling back to the storage key.
fn attachment_disposition(file_name: &str, fallback: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    let safe = safe.trim();
    let name = if safe.is_empty() { fallback } else { safe };
    format!("attachment; filename=\"{}\"", name)
}
