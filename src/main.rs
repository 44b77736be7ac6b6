mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{
    error,
    http::header,
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::utils::error::AppError;
use crate::utils::upload::{DOCUMENT_RESUME, PROFILE_PICTURE, VIDEO_RESUME};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    log::info!("🚀 Starting ASAP server...");
    log::info!("📊 Database: {}", config.mongo_db);
    if !config.use_transactions {
        log::warn!("⚠️  MongoDB transactions disabled; basic info writes run sequentially");
    }

    // Initialize MongoDB connection
    let db = match database::MongoDB::connect(&config.mongo_url, &config.mongo_db).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    log::info!("✅ MongoDB connected successfully");

    for policy in [&PROFILE_PICTURE, &DOCUMENT_RESUME, &VIDEO_RESUME] {
        tokio::fs::create_dir_all(config.upload_dir.join(policy.subdir)).await?;
    }
    log::info!("📁 Upload directory: {}", config.upload_dir.display());

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_address);

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);

    // Start HTTP server
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);
        for origin in &config_data.cors_origins {
            cors = cors.allowed_origin(origin);
        }

        // Body and path errors answer in the same shape as AppError
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            log::warn!("❌ Rejected JSON body: {}", err);
            error::Error::from(AppError::BadRequest(err.to_string()))
        });
        let path_config = web::PathConfig::default().error_handler(|err, _req| {
            error::Error::from(AppError::BadRequest(err.to_string()))
        });

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(json_config)
            .app_data(path_config)
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Compress::default())
            .wrap(Logger::new("%a %{Origin}i \"%r\" %s %b %Dms"))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Uploaded pictures and files
            .service(Files::new("/upload", config_data.upload_dir.clone()))
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
