use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    api::parse_id,
    database::MongoDB,
    models::{AuthUser, EducationRequest, EducationResponse},
    services::education_service,
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/edu",
    tag = "Education",
    request_body = EducationRequest,
    responses(
        (status = 201, description = "Education added", body = EducationResponse),
        (status = 400, description = "Missing fields or end year before start year")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_education(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<EducationRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎓 POST /api/edu - user: {}", auth.id);

    let education = education_service::add_education(&db, &auth.id, &request).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Education added successfully",
        "education": EducationResponse::from(education),
    })))
}

#[utoipa::path(
    get,
    path = "/api/edu",
    tag = "Education",
    responses(
        (status = 200, description = "Education rows, latest start year first", body = Vec<EducationResponse>),
        (status = 404, description = "No education records found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_education(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎓 GET /api/edu - user: {}", auth.id);

    let rows = education_service::list_education(&db, &auth.id).await?;
    let education: Vec<EducationResponse> = rows.into_iter().map(EducationResponse::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "education": education,
    })))
}

#[utoipa::path(
    put,
    path = "/api/edu/{id}",
    tag = "Education",
    params(("id" = String, Path, description = "Education id")),
    request_body = EducationRequest,
    responses(
        (status = 200, description = "Education updated", body = EducationResponse),
        (status = 403, description = "Row belongs to another user"),
        (status = 404, description = "Education not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_education(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    request: web::Json<EducationRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "education")?;
    log::info!("🎓 PUT /api/edu/{} - user: {}", id, auth.id);

    let education = education_service::update_education(&db, &auth.id, &id, &request).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Education updated successfully",
        "education": EducationResponse::from(education),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/edu/{id}",
    tag = "Education",
    params(("id" = String, Path, description = "Education id")),
    responses(
        (status = 200, description = "Education deleted"),
        (status = 403, description = "Row belongs to another user"),
        (status = 404, description = "Education not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_education(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "education")?;
    log::info!("🗑️  DELETE /api/edu/{} - user: {}", id, auth.id);

    education_service::delete_education(&db, &auth.id, &id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Education deleted successfully",
    })))
}
