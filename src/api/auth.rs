use actix_multipart::Multipart;
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    web, Either, HttpResponse,
};
use serde_json::json;
use std::collections::HashMap;

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::TOKEN_COOKIE,
    models::{AuthUser, LoginRequest, ProfileUpdate, RegisterRequest, UserResponse},
    services::auth_service,
    utils::{
        error::AppError,
        imaging::process_profile_picture,
        upload::{
            profile_path_from_url, read_text_form, read_upload_form, remove_stored_file,
            PROFILE_PICTURE,
        },
    },
};

fn token_cookie(token: String, days: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::days(days))
        .finish()
}

fn register_request_from_form(mut fields: HashMap<String, String>) -> RegisterRequest {
    RegisterRequest {
        f_name: fields.remove("f_name"),
        l_name: fields.remove("l_name"),
        email: fields.remove("email"),
        phone: fields.remove("phone"),
        password: fields.remove("password"),
    }
}

fn expired_token_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").http_only(true).finish();
    cookie.make_removal();
    cookie
}

/// Accepts `multipart/form-data` text fields, as the web client sends them,
/// or the same fields as JSON.
#[utoipa::path(
    post,
    path = "/api/reg",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email is already registered")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    body: Either<web::Json<RegisterRequest>, Multipart>,
) -> Result<HttpResponse, AppError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => register_request_from_form(read_text_form(form).await?),
    };
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /api/reg - email: {}", email);

    let user = auth_service::register(&db, &request).await.map_err(|e| {
        log::warn!("❌ Registration failed: {} - {}", email, e);
        e
    })?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Registered Successfully!",
        "user": {
            "_id": user.id.map(|id| id.to_hex()),
            "email": user.email,
        }
    })))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; also sets the token cookie"),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /api/login - email: {}", email);

    let (token, user) =
        auth_service::login(&db, &request, &config.jwt_secret, config.jwt_expires_secs)
            .await
            .map_err(|e| {
                log::warn!("❌ Login failed: {} - {}", email, e);
                e
            })?;

    log::info!("✅ Login successful: {}", user.email);

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(token.clone(), config.cookie_expires_days))
        .json(json!({
            "success": true,
            "token": token,
            "user": UserResponse::from(user),
        })))
}

#[utoipa::path(
    get,
    path = "/api/logout",
    tag = "Auth",
    responses((status = 200, description = "Token cookie cleared"))
)]
pub async fn logout() -> HttpResponse {
    log::info!("👋 GET /api/logout");

    HttpResponse::Ok().cookie(expired_token_cookie()).json(json!({
        "success": true,
        "message": "Logged out successfully!"
    }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(auth: web::ReqData<AuthUser>) -> HttpResponse {
    log::info!("👤 GET /api/me - user: {}", auth.id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "user": UserResponse::from(auth.into_inner().user),
    }))
}

/// Multipart: `f_name`, `l_name`, `email`, `phone` and an optional `profile` image.
#[utoipa::path(
    put,
    path = "/api/update-profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid field or file"),
        (status = 409, description = "Email is already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️  PUT /api/update-profile - user: {}", auth.id);

    let form = read_upload_form(payload, &config.upload_dir, &PROFILE_PICTURE).await?;

    let picture = match form.file.clone() {
        Some(file) => Some(process_profile_picture(file).await),
        None => None,
    };

    let update = ProfileUpdate {
        f_name: form.text("f_name"),
        l_name: form.text("l_name"),
        email: form.text("email"),
        phone: form.text("phone"),
        profile: picture.as_ref().map(|p| {
            format!("{}/upload/{}/{}", config.backend_url, PROFILE_PICTURE.subdir, p.file_name)
        }),
    };

    let (user, replaced) = match auth_service::update_profile(&db, &auth.id, &update).await {
        Ok(result) => result,
        Err(e) => {
            log::warn!("❌ Profile update failed for {}: {}", auth.id, e);
            if let Some(p) = &picture {
                remove_stored_file(&config.upload_dir, &p.path).await;
            }
            return Err(e);
        }
    };

    if let Some(old_url) = replaced {
        if let Some(old_path) = profile_path_from_url(&config.upload_dir, &old_url) {
            remove_stored_file(&config.upload_dir, &old_path).await;
        }
    }

    log::info!("✅ Profile updated: {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully!",
        "user": UserResponse::from(user),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing;
    use crate::database::testing::lazy_db;
    use crate::utils::upload::testing as multipart;
    use actix_web::{
        http::{header, StatusCode},
        test, App,
    };

    #[actix_web::test]
    async fn test_register_requires_fields() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/reg")
            .set_json(json!({ "email": "asha@example.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please enter all required fields");
    }

    #[actix_web::test]
    async fn test_register_reads_multipart_fields() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/reg")
            .insert_header((header::CONTENT_TYPE, multipart::content_type()))
            .set_payload(multipart::body(&[multipart::text("email", "asha@example.com")]))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please enter all required fields");
    }

    #[actix_web::test]
    async fn test_register_form_fields_map_to_request() {
        let fields = HashMap::from([
            ("f_name".to_string(), "Asha".to_string()),
            ("email".to_string(), "asha@example.com".to_string()),
            ("password".to_string(), "hunter22".to_string()),
            ("ignored".to_string(), "x".to_string()),
        ]);

        let request = register_request_from_form(fields);
        assert_eq!(request.f_name.as_deref(), Some("Asha"));
        assert_eq!(request.l_name, None);
        assert_eq!(request.email.as_deref(), Some("asha@example.com"));
        assert_eq!(request.password.as_deref(), Some("hunter22"));
    }

    #[actix_web::test]
    async fn test_login_requires_email_and_password() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "asha@example.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Please enter email and password");
    }

    #[actix_web::test]
    async fn test_logout_clears_cookie() {
        let app = test::init_service(App::new().route("/api/logout", web::get().to(logout))).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/logout").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .expect("token cookie is set");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[actix_web::test]
    async fn test_token_cookie_is_http_only() {
        let cookie = token_cookie("abc".into(), 30);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(30)));
    }

    #[actix_web::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_register_login_me() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(crate::api::configure),
        )
        .await;

        let email = format!("{}@example.com", mongodb::bson::oid::ObjectId::new().to_hex());
        let req = test::TestRequest::post()
            .uri("/api/reg")
            .set_json(json!({ "f_name": "Asha", "l_name": "Nair", "email": email, "password": "hunter22" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": email, "password": "hunter22" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let token = body["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["email"], email);
        assert!(body["user"].get("password").is_none());
    }
}
