use actix_multipart::Multipart;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::upload::{store_all, summarize};
use crate::utils::multipart::read_upload_form;
use crate::views::gallery::{gallery_items, render_gallery, ViewMode};
use crate::views::upload::{render_upload, UploadStatus};
use crate::AppState;

#[derive(Deserialize)]
pub struct GalleryQuery {
    view: Option<String>,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/dashboard/images"))
        .finish()
}

pub async fn gallery_page(
    state: web::Data<AppState>,
    query: web::Query<GalleryQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let mode = ViewMode::from_query(query.view.as_deref());

    let (images, notice) = match state.store.list().await {
        Ok(images) => (images, None),
        Err(err) => {
            log::error!("Listing the {} store failed: {}", state.store.name(), err);
            (Vec::new(), Some("Could not read files"))
        }
    };
    let items = gallery_items(state.store.as_ref(), images);

    let html = render_gallery(&state.templates, &items, mode, notice).map_err(render_failed)?;
    Ok(html_response(StatusCode::OK, html))
}

pub async fn upload_page(state: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    let html = render_upload(&state.templates, &UploadStatus::Idle).map_err(render_failed)?;
    Ok(html_response(StatusCode::OK, html))
}

/// Form fallback of `POST /api/upload`: same pipeline, answered with the page.
pub async fn submit_upload_page(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let form = read_upload_form(payload, state.max_upload_bytes)
        .await
        .and_then(|form| form.require_files());

    let (status_code, status) = match form {
        Ok(form) => {
            let outcomes = store_all(state.store.as_ref(), &form.files).await;
            let (code, body) = summarize(form.field, outcomes);
            (code, UploadStatus::from_reply(code, &body))
        }
        Err(err) => (err.status_code(), UploadStatus::from_error(&err)),
    };

    let html = render_upload(&state.templates, &status).map_err(render_failed)?;
    Ok(html_response(status_code, html))
}

fn html_response(status: StatusCode, html: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html)
}

fn render_failed(err: tera::Error) -> AppError {
    log::error!("Template rendering failed: {:?}", err);
    AppError::InternalServerError("Could not render page".to_string())
}
