use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    database::MongoDB,
    models::{AuthUser, PortfolioResponse, UpdatePortfolioRequest},
    services::portfolio_service,
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/api/portfolio",
    tag = "Portfolio",
    responses(
        (status = 200, description = "The user's portfolio links", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_portfolio(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔗 GET /api/portfolio - user: {}", auth.id);

    let portfolio = portfolio_service::get_portfolio(&db, &auth.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "portfolio": PortfolioResponse::from(portfolio),
    })))
}

#[utoipa::path(
    put,
    path = "/api/portfolio",
    tag = "Portfolio",
    request_body = UpdatePortfolioRequest,
    responses(
        (status = 200, description = "Portfolio saved", body = PortfolioResponse),
        (status = 400, description = "A URL failed validation")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_portfolio(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    request: web::Json<UpdatePortfolioRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔗 PUT /api/portfolio - user: {}", auth.id);

    let portfolio = portfolio_service::update_portfolio(&db, &auth.id, &request)
        .await
        .map_err(|e| {
            log::warn!("❌ Portfolio update rejected for {}: {}", auth.id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "portfolio": PortfolioResponse::from(portfolio),
    })))
}
