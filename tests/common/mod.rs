#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use tokio::sync::Barrier;

use image_dashboard::models::image::{ImageUpload, StoredImage};
use image_dashboard::storage::{ImageStore, StorageError};
use image_dashboard::{views, AppState};

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRcat";
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', b'd', b'o', b'g'];

const BOUNDARY: &str = "----dashboard-test-boundary";

pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(field: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Self {
        Part {
            field,
            file_name: Some(file_name),
            content_type: Some(content_type),
            bytes,
        }
    }
}

/// Encodes parts as `multipart/form-data`, returning the content type and body.
pub fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.field);
        if let Some(name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// In-memory store whose failures are scripted per file name.
#[derive(Default)]
pub struct MemoryStore {
    pub stored: Mutex<Vec<String>>,
    pub failing_names: Vec<String>,
    pub list_fails: bool,
    pub rendezvous: Option<Barrier>,
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, StorageError> {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        if self.failing_names.contains(&image.file_name) {
            return Err(StorageError::Write("disk full".into()));
        }
        let url = format!("https://cdn.test/upload/{}", image.file_name);
        self.stored.lock().unwrap().push(url.clone());
        Ok(StoredImage { url })
    }

    async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        if self.list_fails {
            return Err(StorageError::Read("connection refused".into()));
        }
        let stored = self.stored.lock().unwrap();
        Ok(stored.iter().rev().map(|url| StoredImage { url: url.clone() }).collect())
    }

    fn download_url(&self, url: &str) -> String {
        url.replacen("/upload/", "/upload/fl_attachment/", 1)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub fn state(store: Arc<dyn ImageStore>) -> web::Data<AppState> {
    web::Data::new(AppState {
        store,
        templates: views::templates().unwrap(),
        max_upload_bytes: 1024,
    })
}
