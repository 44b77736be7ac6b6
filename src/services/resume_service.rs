use crate::{
    database::{MongoDB, RESUMES, VIDEO_RESUMES},
    models::{Resume, ResumeKind, VideoResume, DOCUMENT_TYPES, VIDEO_TYPES},
    utils::{
        error::AppError,
        upload::{remove_stored_file, StoredFile},
    },
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use std::path::{Path, PathBuf};

/// Short type tag stored in `fileType`. Falls back to the MIME type when the
/// client's file name has no usable extension.
pub fn file_type_for(kind: ResumeKind, file: &StoredFile) -> String {
    let ext = file.extension();
    let known = match kind {
        ResumeKind::Document => DOCUMENT_TYPES,
        ResumeKind::Video => VIDEO_TYPES,
    };
    if known.contains(&ext.as_str()) {
        return ext;
    }

    let from_mime = match file.content_type.as_str() {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "video/mp4" => "mp4",
        "video/mpeg" => "mpeg",
        "video/quicktime" => "mov",
        "video/avi" => "avi",
        "video/webm" => "webm",
        _ => "",
    };
    if from_mime.is_empty() {
        ext
    } else {
        from_mime.to_string()
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub async fn list_resumes(
    db: &MongoDB,
    user_id: &ObjectId,
) -> Result<(Vec<Resume>, Vec<VideoResume>), AppError> {
    let documents: Vec<Resume> = db
        .collection::<Resume>(RESUMES)
        .find(doc! { "userId": user_id })
        .sort(doc! { "uploadedAt": -1 })
        .await?
        .try_collect()
        .await?;

    let videos: Vec<VideoResume> = db
        .collection::<VideoResume>(VIDEO_RESUMES)
        .find(doc! { "userId": user_id })
        .sort(doc! { "uploadedAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok((documents, videos))
}

pub async fn create_resume(
    db: &MongoDB,
    user_id: &ObjectId,
    file: &StoredFile,
) -> Result<Resume, AppError> {
    let mut resume = Resume {
        id: None,
        user_id: *user_id,
        file_name: file.original_name.clone(),
        file_type: file_type_for(ResumeKind::Document, file),
        file_size: file.size as i64,
        file_path: path_string(&file.path),
        uploaded_at: BsonDateTime::now(),
        last_updated: None,
    };

    let result = db.collection::<Resume>(RESUMES).insert_one(&resume).await?;
    resume.id = result.inserted_id.as_object_id();

    log::info!("📄 Resume '{}' stored for user {}", resume.file_name, user_id);
    Ok(resume)
}

/// Swaps the file behind an existing resume. The previous file is removed
/// once the row points at the new one.
pub async fn replace_resume(
    db: &MongoDB,
    upload_root: &Path,
    user_id: &ObjectId,
    id: &ObjectId,
    file: &StoredFile,
) -> Result<Resume, AppError> {
    let collection = db.collection::<Resume>(RESUMES);
    let filter = doc! { "_id": id, "userId": user_id };

    let current = collection
        .find_one(filter.clone())
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    let now = BsonDateTime::now();
    let updated = collection
        .find_one_and_update(
            filter,
            doc! { "$set": {
                "fileName": file.original_name.clone(),
                "fileType": file_type_for(ResumeKind::Document, file),
                "fileSize": file.size as i64,
                "filePath": path_string(&file.path),
                "lastUpdated": now,
            }},
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    remove_stored_file(upload_root, Path::new(&current.file_path)).await;
    Ok(updated)
}

pub async fn delete_resume(
    db: &MongoDB,
    upload_root: &Path,
    user_id: &ObjectId,
    id: &ObjectId,
) -> Result<(), AppError> {
    let resume = db
        .collection::<Resume>(RESUMES)
        .find_one_and_delete(doc! { "_id": id, "userId": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    remove_stored_file(upload_root, Path::new(&resume.file_path)).await;
    Ok(())
}

pub async fn create_video_resume(
    db: &MongoDB,
    user_id: &ObjectId,
    file: &StoredFile,
) -> Result<VideoResume, AppError> {
    let mut video = VideoResume {
        id: None,
        user_id: *user_id,
        file_name: file.original_name.clone(),
        file_type: file_type_for(ResumeKind::Video, file),
        file_size: file.size as i64,
        file_path: path_string(&file.path),
        duration: 0.0,
        uploaded_at: BsonDateTime::now(),
    };

    let result = db
        .collection::<VideoResume>(VIDEO_RESUMES)
        .insert_one(&video)
        .await?;
    video.id = result.inserted_id.as_object_id();

    log::info!("🎬 Video resume '{}' stored for user {}", video.file_name, user_id);
    Ok(video)
}

pub async fn delete_video_resume(
    db: &MongoDB,
    upload_root: &Path,
    user_id: &ObjectId,
    id: &ObjectId,
) -> Result<(), AppError> {
    let video = db
        .collection::<VideoResume>(VIDEO_RESUMES)
        .find_one_and_delete(doc! { "_id": id, "userId": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Video resume not found".to_string()))?;

    remove_stored_file(upload_root, Path::new(&video.file_path)).await;
    Ok(())
}

/// Resolves a download to the client-facing file name and the path on disk.
pub async fn find_download(
    db: &MongoDB,
    user_id: &ObjectId,
    kind: ResumeKind,
    id: &ObjectId,
) -> Result<(String, PathBuf), AppError> {
    let filter = doc! { "_id": id, "userId": user_id };
    let not_found = || AppError::NotFound("File not found".to_string());

    let (file_name, file_path) = match kind {
        ResumeKind::Document => {
            let row = db
                .collection::<Resume>(RESUMES)
                .find_one(filter)
                .await?
                .ok_or_else(not_found)?;
            (row.file_name, row.file_path)
        }
        ResumeKind::Video => {
            let row = db
                .collection::<VideoResume>(VIDEO_RESUMES)
                .find_one(filter)
                .await?
                .ok_or_else(not_found)?;
            (row.file_name, row.file_path)
        }
    };

    let path = PathBuf::from(file_path);
    if tokio::fs::metadata(&path).await.is_err() {
        log::warn!("⚠️  Download target missing on disk: {}", path.display());
        return Err(AppError::NotFound("File not found on server".to_string()));
    }

    Ok((file_name, path))
}
