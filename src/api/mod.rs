pub mod auth;
pub mod basic_info;
pub mod career;
pub mod education;
pub mod health;
pub mod portfolio;
pub mod resumes;
pub mod skills;
pub mod swagger;
pub mod work_experience;

use actix_web::web;
use mongodb::bson::oid::ObjectId;

use crate::middleware::AuthMiddleware;
use crate::utils::error::AppError;

/// Parses a path id, answering 400 "Invalid <entity> ID" when malformed.
pub fn parse_id(raw: &str, entity: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::invalid_id(entity))
}

/// Registers every `/api` route. Login, registration and logout are public;
/// every other resource is wrapped in [`AuthMiddleware`] on its own, so paths
/// that match nothing still answer 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Auth: public
            .route("/reg", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::get().to(auth::logout))
            // Auth: account
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(auth::get_me)),
            )
            .service(
                web::resource("/update-profile")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(auth::update_profile)),
            )
            // Basic info
            .service(
                web::resource("/basic-info")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(basic_info::get_basic_info))
                    .route(web::put().to(basic_info::update_basic_info)),
            )
            // Career objective
            .service(
                web::resource("/career")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(career::get_career))
                    .route(web::put().to(career::update_career)),
            )
            // Education
            .service(
                web::resource("/edu")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(education::add_education))
                    .route(web::get().to(education::get_education)),
            )
            .service(
                web::resource("/edu/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(education::update_education))
                    .route(web::delete().to(education::delete_education)),
            )
            // Key skills
            .service(
                web::resource("/skill")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(skills::get_skills))
                    .route(web::post().to(skills::add_skill))
                    .route(web::put().to(skills::replace_skills)),
            )
            .service(
                web::resource("/skill/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::delete().to(skills::delete_skill)),
            )
            // Portfolio
            .service(
                web::resource("/portfolio")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(portfolio::get_portfolio))
                    .route(web::put().to(portfolio::update_portfolio)),
            )
            // Work experience
            .service(
                web::resource("/work")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(work_experience::get_work_experience))
                    .route(web::post().to(work_experience::add_work_experience)),
            )
            .service(
                web::resource("/work/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(work_experience::update_work_experience))
                    .route(web::delete().to(work_experience::delete_work_experience)),
            )
            // Resumes and video resumes
            .service(
                web::resource("/resumes")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(resumes::get_resumes)),
            )
            .service(
                web::resource("/resumes/download/{kind}/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(resumes::download_resume)),
            )
            .service(
                web::resource("/resumes/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::delete().to(resumes::delete_video_resume)),
            )
            .service(
                web::resource("/document")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(resumes::upload_resume)),
            )
            .service(
                web::resource("/document/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(resumes::update_resume))
                    .route(web::delete().to(resumes::delete_resume)),
            )
            .service(
                web::resource("/video")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(resumes::upload_video_resume)),
            )
            .service(
                web::resource("/video/{id}")
                    .wrap(AuthMiddleware)
                    .route(web::delete().to(resumes::delete_video_resume)),
            ),
    );
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::AppConfig;
    use std::path::Path;

    pub const TEST_SECRET: &str = "test-secret";

    /// Config for in-process apps; uploads land in `upload_dir`.
    pub fn config(upload_dir: &Path) -> AppConfig {
        let upload = upload_dir.to_string_lossy().into_owned();
        AppConfig::from_lookup(move |key| match key {
            "MONGO_URL" => Some("mongodb://127.0.0.1:27017/asap_test".to_string()),
            "JWT_SEC" => Some(TEST_SECRET.to_string()),
            "UPLOAD_DIR" => Some(upload.clone()),
            _ => None,
        })
        .expect("test config is complete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::lazy_db;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_unknown_api_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        // known resources still demand a token
        for uri in ["/api/career", "/api/skill", "/api/work", "/api/resumes"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::UNAUTHORIZED,
                "{}",
                uri
            );
        }
    }

    #[actix_web::test]
    async fn test_parse_id() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex(), "skill").unwrap(), id);

        let err = parse_id("123", "education").unwrap_err();
        assert_eq!(err.to_string(), "Invalid education ID");
    }
}
