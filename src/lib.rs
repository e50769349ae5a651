pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod utils;
pub mod views;

use std::sync::Arc;

use actix_web::web;
use tera::Tera;

use crate::storage::ImageStore;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn ImageStore>,
    pub templates: Tera,
    pub max_upload_bytes: usize,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/images").route(web::get().to(handlers::images::list_images)))
        .service(web::resource("/api/upload").route(web::post().to(handlers::upload::upload_images)))
        .service(web::resource("/").route(web::get().to(handlers::pages::index)))
        .service(web::resource("/dashboard/images").route(web::get().to(handlers::pages::gallery_page)))
        .service(
            web::resource("/dashboard/upload")
                .route(web::get().to(handlers::pages::upload_page))
                .route(web::post().to(handlers::pages::submit_upload_page)),
        );
}
