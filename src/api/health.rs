use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
    /// "up" when MongoDB answers a ping
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status; `degraded` when the database is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<MongoDB>) -> impl Responder {
    let database_up = match db.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️  Health check: database ping failed: {}", e);
            false
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if database_up { "healthy" } else { "degraded" }.to_string(),
        service: "asap-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        database: if database_up { "up" } else { "down" }.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use mongodb::{options::ClientOptions, Client};
    use std::time::Duration;

    #[actix_web::test]
    async fn test_unreachable_database_reports_degraded() {
        // nothing listens on port 1; keep the selection timeout short
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1").await.unwrap();
        options.server_selection_timeout = Some(Duration::from_millis(200));
        let db = MongoDB::from_client(Client::with_options(options).unwrap(), "asap_test");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "down");
        assert_eq!(body["service"], "asap-server");
    }
}
