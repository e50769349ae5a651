use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use image_dashboard::config::Config;
use image_dashboard::{configure, storage, views, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    // Missing credentials are a deployment error, not something to serve around.
    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    })?;
    let templates = views::templates().map_err(|err| {
        error!("Failed to compile page templates: {:?}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    })?;

    let store = storage::build_store(&config).await;
    let state = web::Data::new(AppState {
        store,
        templates,
        max_upload_bytes: config.max_upload_bytes,
    });
    let served_dir = config.local_upload_dir().cloned();
    if let Some(dir) = &served_dir {
        // Files::new needs the directory to exist before the first upload.
        tokio::fs::create_dir_all(dir).await?;
    }

    info!(
        "Starting server at {} with the {} store",
        config.bind_address,
        state.store.name()
    );

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure);
        if let Some(dir) = &served_dir {
            app = app.service(Files::new("/uploads", dir.clone()));
        }
        app
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
