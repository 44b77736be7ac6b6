use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    api::parse_id,
    database::MongoDB,
    models::{AuthUser, WorkExperienceRequest, WorkExperienceResponse},
    services::work_experience_service,
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/api/work",
    tag = "Work Experience",
    responses((status = 200, description = "Work history, newest first", body = Vec<WorkExperienceResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn get_work_experience(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("💼 GET /api/work - user: {}", auth.id);

    let rows = work_experience_service::list_work_experience(&db, &auth.id).await?;
    let data: Vec<WorkExperienceResponse> =
        rows.into_iter().map(WorkExperienceResponse::from).collect();

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}

#[utoipa::path(
    post,
    path = "/api/work",
    tag = "Work Experience",
    request_body = WorkExperienceRequest,
    responses(
        (status = 201, description = "Work experience added", body = WorkExperienceResponse),
        (status = 400, description = "Missing fields or invalid dates")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_work_experience(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<WorkExperienceRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("💼 POST /api/work - user: {}", auth.id);

    let row = work_experience_service::add_work_experience(&db, &auth.id, &request).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": WorkExperienceResponse::from(row),
    })))
}

#[utoipa::path(
    put,
    path = "/api/work/{id}",
    tag = "Work Experience",
    params(("id" = String, Path, description = "Work experience id")),
    request_body = WorkExperienceRequest,
    responses(
        (status = 200, description = "Work experience updated", body = WorkExperienceResponse),
        (status = 404, description = "Work experience not found or unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_work_experience(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    request: web::Json<WorkExperienceRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "work experience")?;
    log::info!("💼 PUT /api/work/{} - user: {}", id, auth.id);

    let row =
        work_experience_service::update_work_experience(&db, &auth.id, &id, &request).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": WorkExperienceResponse::from(row),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/work/{id}",
    tag = "Work Experience",
    params(("id" = String, Path, description = "Work experience id")),
    responses(
        (status = 200, description = "Work experience deleted"),
        (status = 404, description = "Work experience not found or unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_work_experience(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "work experience")?;
    log::info!("🗑️  DELETE /api/work/{} - user: {}", id, auth.id);

    work_experience_service::delete_work_experience(&db, &auth.id, &id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Work experience deleted successfully",
    })))
}
