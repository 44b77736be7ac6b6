use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::config::AppConfig;
use crate::database::MongoDB;
use crate::models::AuthUser;
use crate::services::auth_service;
use crate::utils::error::AppError;

pub const TOKEN_COOKIE: &str = "token";

/// Guards a scope: resolves the caller from a Bearer header or the `token`
/// cookie and stores an [`AuthUser`] in the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

/// Bearer header first, then the cookie set at login.
pub fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

async fn authenticate(req: &ServiceRequest) -> Result<AuthUser, AppError> {
    let token = extract_token(req)
        .ok_or_else(|| AppError::Unauthorized("Authentication failed. Please log in.".to_string()))?;

    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Internal("AppConfig not registered".to_string()))?;
    let db = req
        .app_data::<web::Data<MongoDB>>()
        .ok_or_else(|| AppError::Internal("MongoDB not registered".to_string()))?;

    let claims = auth_service::verify_token(&token, &config.jwt_secret)?;
    let user_id = ObjectId::parse_str(&claims.id).map_err(|_| {
        AppError::Unauthorized("Authentication failed. Please log in again.".to_string())
    })?;

    let user = auth_service::find_user(db, &user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found. Please log in again.".to_string()))?;

    Ok(AuthUser { id: user_id, user })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(&req).await {
                Ok(auth_user) => {
                    req.extensions_mut().insert(auth_user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                    let response = e.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
