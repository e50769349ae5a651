use actix_web::{web, HttpResponse};

use crate::models::image::ImagesResponse;
use crate::AppState;

pub async fn list_images(state: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    match state.store.list().await {
        Ok(images) => Ok(HttpResponse::Ok().json(ImagesResponse {
            images: images.into_iter().map(|image| image.url).collect(),
            error: None,
        })),
        Err(err) => {
            log::error!("Listing the {} store failed: {}", state.store.name(), err);
            Ok(HttpResponse::InternalServerError().json(ImagesResponse {
                images: Vec::new(),
                error: Some("Could not read files".to_string()),
            }))
        }
    }
}
