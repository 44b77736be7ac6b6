use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{AuthUser, CareerObjectiveResponse, UpdateCareerRequest},
    services::career_service,
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/api/career",
    tag = "Career",
    responses((status = 200, description = "Career objective, created with defaults on first read", body = CareerObjectiveResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_career(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎯 GET /api/career - user: {}", auth.id);

    let career = career_service::get_career(&db, &auth.id).await?;

    Ok(HttpResponse::Ok().json(CareerObjectiveResponse::from(career)))
}

#[utoipa::path(
    put,
    path = "/api/career",
    tag = "Career",
    request_body = UpdateCareerRequest,
    responses((status = 200, description = "Career objective saved", body = CareerObjectiveResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_career(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<UpdateCareerRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎯 PUT /api/career - user: {}", auth.id);

    let career = career_service::update_career(&db, &auth.id, &request).await?;

    Ok(HttpResponse::Ok().json(CareerObjectiveResponse::from(career)))
}
