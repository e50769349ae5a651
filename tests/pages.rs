mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};

use common::{multipart, state, MemoryStore, Part, PNG};
use image_dashboard::configure;

fn body_text(bytes: actix_web::web::Bytes) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn root_redirects_to_gallery() {
    let app = test::init_service(App::new().app_data(state(Arc::new(MemoryStore::default()))).configure(configure)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard/images");
}

#[actix_web::test]
async fn gallery_lists_fresh_images_on_every_visit() {
    let app = test::init_service(App::new().app_data(state(Arc::new(MemoryStore::default()))).configure(configure)).await;

    let before = body_text(test::call_and_read_body(&app, test::TestRequest::get().uri("/dashboard/images").to_request()).await);
    assert!(before.contains("No images uploaded yet."));

    let (content_type, body) = multipart(&[Part::file("images", "cat.png", "image/png", PNG)]);
    let upload = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, upload).await.status(), StatusCode::OK);

    let after = body_text(
        test::call_and_read_body(&app, test::TestRequest::get().uri("/dashboard/images?view=list").to_request()).await,
    );
    assert!(after.contains(r#"class="gallery list""#));
    assert!(after.contains("cat.png"));
    // Tera escapes `/` inside attributes.
    assert!(after.contains("upload&#x2F;fl_attachment&#x2F;cat.png"));
    assert!(!after.contains("No images uploaded yet."));
}

#[actix_web::test]
async fn gallery_degrades_when_listing_fails() {
    let store = MemoryStore {
        list_fails: true,
        ..Default::default()
    };
    let app = test::init_service(App::new().app_data(state(Arc::new(store))).configure(configure)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/dashboard/images").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(test::read_body(resp).await);
    assert!(html.contains("Could not read files"));
    assert!(html.contains("No images uploaded yet."));
}

#[actix_web::test]
async fn upload_form_reports_status() {
    let store = MemoryStore {
        failing_names: vec!["dog.png".to_string()],
        ..Default::default()
    };
    let app = test::init_service(App::new().app_data(state(Arc::new(store))).configure(configure)).await;

    let idle = body_text(test::call_and_read_body(&app, test::TestRequest::get().uri("/dashboard/upload").to_request()).await);
    assert!(idle.contains(r#"class="status idle""#));

    let (content_type, body) = multipart(&[Part::file("images", "cat.png", "image/png", PNG)]);
    let ok = test::TestRequest::post()
        .uri("/dashboard/upload")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let html = body_text(test::call_and_read_body(&app, ok).await);
    assert!(html.contains(r#"class="status success""#));
    assert!(html.contains("Files uploaded successfully"));

    let (content_type, body) = multipart(&[
        Part::file("images", "cat.png", "image/png", PNG),
        Part::file("images", "dog.png", "image/png", PNG),
    ]);
    let partial = test::TestRequest::post()
        .uri("/dashboard/upload")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, partial).await;
    assert_eq!(resp.status(), StatusCode::MULTI_STATUS);
    let html = body_text(test::read_body(resp).await);
    assert!(html.contains(r#"class="status failure""#));
    assert!(html.contains("1 of 2 files failed to upload: dog.png"));

    let (content_type, body) = multipart(&[]);
    let empty = test::TestRequest::post()
        .uri("/dashboard/upload")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, empty).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_text(test::read_body(resp).await);
    assert!(html.contains("No files uploaded"));
}
