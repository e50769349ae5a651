use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures_util::future::join_all;

use crate::models::image::ImageUpload;
use crate::models::upload::{FileOutcome, UploadField, UploadResponse};
use crate::storage::ImageStore;
use crate::utils::multipart::read_upload_form;
use crate::AppState;

const STORE_FAILED: &str = "storage write failed";

pub async fn upload_images(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let form = read_upload_form(payload, state.max_upload_bytes)
        .await?
        .require_files()?;

    let outcomes = store_all(state.store.as_ref(), &form.files).await;
    let (status, body) = summarize(form.field, outcomes);

    Ok(HttpResponse::build(status).json(body))
}

/// Stores every file concurrently and waits for all of them, keeping input order.
pub async fn store_all(store: &dyn ImageStore, files: &[ImageUpload]) -> Vec<FileOutcome> {
    let pending = files.iter().map(|file| async move {
        match store.store(file).await {
            Ok(stored) => FileOutcome::Stored {
                file_name: file.file_name.clone(),
                url: stored.url,
            },
            Err(err) => {
                log::error!("Storing {} in the {} store failed: {}", file.file_name, store.name(), err);
                FileOutcome::Failed {
                    file_name: file.file_name.clone(),
                    error: STORE_FAILED.to_string(),
                }
            }
        }
    });

    join_all(pending).await
}

/// Folds per-file outcomes into the response status and envelope.
///
/// A single `image` upload keeps the `{ message, filePath }` shape. Batches
/// answer 200 when every file landed, 207 with per-file `results` when only
/// some did, and 500 when none did.
pub fn summarize(field: UploadField, outcomes: Vec<FileOutcome>) -> (StatusCode, UploadResponse) {
    let urls: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| outcome.url().map(str::to_owned))
        .collect();
    let failed = outcomes.len() - urls.len();

    match field {
        UploadField::Single if failed == 0 && urls.len() == 1 => (
            StatusCode::OK,
            UploadResponse {
                message: Some("File uploaded successfully".to_string()),
                file_path: urls.into_iter().next(),
                ..Default::default()
            },
        ),
        _ if failed == 0 => (
            StatusCode::OK,
            UploadResponse {
                message: Some("Files uploaded successfully".to_string()),
                urls: Some(urls),
                ..Default::default()
            },
        ),
        UploadField::Single if urls.is_empty() => (
            StatusCode::INTERNAL_SERVER_ERROR,
            UploadResponse {
                error: Some("Upload failed".to_string()),
                ..Default::default()
            },
        ),
        _ if urls.is_empty() => (
            StatusCode::INTERNAL_SERVER_ERROR,
            UploadResponse {
                error: Some("Upload failed".to_string()),
                results: Some(outcomes),
                ..Default::default()
            },
        ),
        _ => (
            StatusCode::MULTI_STATUS,
            UploadResponse {
                message: Some(format!("{} of {} files failed to upload", failed, outcomes.len())),
                urls: Some(urls),
                results: Some(outcomes),
                ..Default::default()
            },
        ),
    }
}
