use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse,
};
use serde_json::json;

use crate::{
    api::parse_id,
    config::AppConfig,
    database::MongoDB,
    models::{AuthUser, ResumeKind, ResumeListing, ResumeResponse, VideoResumeResponse},
    services::resume_service,
    utils::{
        error::AppError,
        upload::{read_upload_form, remove_stored_file, StoredFile, UploadPolicy, DOCUMENT_RESUME, VIDEO_RESUME},
    },
};

async fn receive_file(
    payload: Multipart,
    config: &AppConfig,
    policy: &UploadPolicy,
) -> Result<StoredFile, AppError> {
    read_upload_form(payload, &config.upload_dir, policy)
        .await?
        .require_file()
}

#[utoipa::path(
    get,
    path = "/api/resumes",
    tag = "Resumes",
    responses((status = 200, description = "Documents and videos, newest first", body = ResumeListing)),
    security(("bearer_auth" = []))
)]
pub async fn get_resumes(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    log::info!("📂 GET /api/resumes - user: {}", auth.id);

    let (documents, videos) = resume_service::list_resumes(&db, &auth.id).await?;
    let listing = ResumeListing {
        documents: documents.into_iter().map(ResumeResponse::from).collect(),
        videos: videos.into_iter().map(VideoResumeResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": listing })))
}

/// Multipart field `resume`: PDF or Word, up to 5 MB.
#[utoipa::path(
    post,
    path = "/api/document",
    tag = "Resumes",
    responses(
        (status = 201, description = "Resume stored", body = ResumeResponse),
        (status = 400, description = "No file, wrong type or too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_resume(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    log::info!("📄 POST /api/document - user: {}", auth.id);

    let file = receive_file(payload, &config, &DOCUMENT_RESUME).await?;

    let resume = match resume_service::create_resume(&db, &auth.id, &file).await {
        Ok(resume) => resume,
        Err(e) => {
            remove_stored_file(&config.upload_dir, &file.path).await;
            return Err(e);
        }
    };

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": ResumeResponse::from(resume),
    })))
}

#[utoipa::path(
    put,
    path = "/api/document/{id}",
    tag = "Resumes",
    params(("id" = String, Path, description = "Resume id")),
    responses(
        (status = 200, description = "Resume file replaced", body = ResumeResponse),
        (status = 404, description = "Resume not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_resume(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "resume")?;
    log::info!("📄 PUT /api/document/{} - user: {}", id, auth.id);

    let file = receive_file(payload, &config, &DOCUMENT_RESUME).await?;

    let resume =
        match resume_service::replace_resume(&db, &config.upload_dir, &auth.id, &id, &file).await {
            Ok(resume) => resume,
            Err(e) => {
                remove_stored_file(&config.upload_dir, &file.path).await;
                return Err(e);
            }
        };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": ResumeResponse::from(resume),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/document/{id}",
    tag = "Resumes",
    params(("id" = String, Path, description = "Resume id")),
    responses(
        (status = 200, description = "Resume deleted"),
        (status = 404, description = "Resume not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_resume(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "resume")?;
    log::info!("🗑️  DELETE /api/document/{} - user: {}", id, auth.id);

    resume_service::delete_resume(&db, &config.upload_dir, &auth.id, &id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Resume deleted successfully",
    })))
}

/// Multipart field `video`: mp4, mpeg, quicktime, avi or webm, up to 100 MB.
#[utoipa::path(
    post,
    path = "/api/video",
    tag = "Resumes",
    responses(
        (status = 201, description = "Video resume stored", body = VideoResumeResponse),
        (status = 400, description = "No file, wrong type or too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video_resume(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    log::info!("🎬 POST /api/video - user: {}", auth.id);

    let file = receive_file(payload, &config, &VIDEO_RESUME).await?;

    let video = match resume_service::create_video_resume(&db, &auth.id, &file).await {
        Ok(video) => video,
        Err(e) => {
            remove_stored_file(&config.upload_dir, &file.path).await;
            return Err(e);
        }
    };

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": VideoResumeResponse::from(video),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/video/{id}",
    tag = "Resumes",
    params(("id" = String, Path, description = "Video resume id")),
    responses(
        (status = 200, description = "Video resume deleted"),
        (status = 404, description = "Video resume not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_video_resume(
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path, "video resume")?;
    log::info!("🗑️  DELETE video resume {} - user: {}", id, auth.id);

    resume_service::delete_video_resume(&db, &config.upload_dir, &auth.id, &id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Video resume deleted successfully",
    })))
}

#[utoipa::path(
    get,
    path = "/api/resumes/download/{kind}/{id}",
    tag = "Resumes",
    params(
        ("kind" = String, Path, description = "`document` or `video`"),
        ("id" = String, Path, description = "Row id")
    ),
    responses(
        (status = 200, description = "The file as an attachment"),
        (status = 400, description = "Unknown kind or malformed id"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_resume(
    req: HttpRequest,
    auth: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (kind, id) = path.into_inner();
    let kind = ResumeKind::parse(&kind)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid file type: {}", kind)))?;
    let id = parse_id(&id, "file")?;
    log::info!("⬇️  GET /api/resumes/download/{}/{} - user: {}", kind.as_str(), id, auth.id);

    let (file_name, file_path) = resume_service::find_download(&db, &auth.id, kind, &id).await?;

    let file = NamedFile::open_async(&file_path).await.map_err(|e| {
        log::error!("❌ Download error for {}: {}", file_path.display(), e);
        AppError::NotFound("File not found on server".to_string())
    })?;

    Ok(file
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .into_response(&req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{self, TEST_SECRET};
    use crate::database::testing::lazy_db;
    use crate::services::auth_service::generate_jwt;
    use actix_web::{http::StatusCode, test, App};
    use mongodb::bson::oid::ObjectId;

    #[actix_web::test]
    async fn test_download_requires_auth() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(lazy_db().await))
                .configure(crate::api::configure),
        )
        .await;

        let uri = format!("/api/resumes/download/document/{}", ObjectId::new().to_hex());
        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_unknown_download_kind_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let db = lazy_db().await;
        let user_id = ObjectId::new();
        db.collection::<mongodb::bson::Document>(crate::database::USERS)
            .insert_one(mongodb::bson::doc! {
                "_id": user_id, "f_name": "A", "l_name": "B", "email": format!("{}@t.io", user_id)
            })
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config(dir.path())))
                .app_data(web::Data::new(db))
                .configure(crate::api::configure),
        )
        .await;

        let token = generate_jwt(&user_id, TEST_SECRET, 3600).unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/api/resumes/download/audio/{}", ObjectId::new().to_hex()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
