use actix_web::{web, HttpResponse};

use crate::{
    api::parse_id,
    database::MongoDB,
    models::{AddSkillRequest, AuthUser, ReplaceSkillsRequest, Skill, SkillResponse},
    services::skill_service,
    utils::error::AppError,
};

// Skill routes answer with the bare list.
fn skills_json(skills: Vec<Skill>) -> HttpResponse {
    let body: Vec<SkillResponse> = skills.into_iter().map(SkillResponse::from).collect();
    HttpResponse::Ok().json(body)
}

#[utoipa::path(
    get,
    path = "/api/skill",
    tag = "Skills",
    responses((status = 200, description = "The user's skills", body = Vec<SkillResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn get_skills(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏷️  GET /api/skill - user: {}", auth.id);
    Ok(skills_json(skill_service::get_skills(&db, &auth.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/skill",
    tag = "Skills",
    request_body = AddSkillRequest,
    responses(
        (status = 200, description = "Skill appended", body = Vec<SkillResponse>),
        (status = 400, description = "Skill name is required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_skill(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<AddSkillRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏷️  POST /api/skill - user: {}", auth.id);
    let request = request.into_inner();
    Ok(skills_json(skill_service::add_skill(&db, &auth.id, request.skill_name).await?))
}

#[utoipa::path(
    put,
    path = "/api/skill",
    tag = "Skills",
    request_body = ReplaceSkillsRequest,
    responses(
        (status = 200, description = "Skill list replaced", body = Vec<SkillResponse>),
        (status = 400, description = "Skills must be an array")
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_skills(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<ReplaceSkillsRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🏷️  PUT /api/skill - user: {}", auth.id);
    Ok(skills_json(
        skill_service::replace_skills(&db, &auth.id, request.skills.as_ref()).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/skill/{id}",
    tag = "Skills",
    params(("id" = String, Path, description = "Skill id")),
    responses(
        (status = 200, description = "Skill removed", body = Vec<SkillResponse>),
        (status = 400, description = "Invalid skill ID"),
        (status = 404, description = "Skill not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_skill(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "skill")?;
    log::info!("🗑️  DELETE /api/skill/{} - user: {}", id, auth.id);
    Ok(skills_json(skill_service::delete_skill(&db, &auth.id, &id).await?))
}
