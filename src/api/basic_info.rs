use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    config::AppConfig,
    database::MongoDB,
    models::{AuthUser, BasicInfoData, UpdateBasicInfoRequest},
    services::basic_info_service,
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/api/basic-info",
    tag = "Basic Info",
    responses(
        (status = 200, description = "Account contact plus basic info (null until first saved)", body = BasicInfoData)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_basic_info(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /api/basic-info - user: {}", auth.id);

    let data = basic_info_service::get_basic_info(&db, &auth.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": data,
    })))
}

#[utoipa::path(
    put,
    path = "/api/basic-info",
    tag = "Basic Info",
    request_body = UpdateBasicInfoRequest,
    responses(
        (status = 200, description = "Basic info saved", body = BasicInfoData),
        (status = 400, description = "Missing or invalid fields")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_basic_info(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<UpdateBasicInfoRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 PUT /api/basic-info - user: {}", auth.id);

    let data =
        basic_info_service::update_basic_info(&db, &auth.id, &request, config.use_transactions)
            .await
            .map_err(|e| {
                log::warn!("❌ Basic info update failed for {}: {}", auth.id, e);
                e
            })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Basic information updated successfully!",
        "data": data,
    })))
}
