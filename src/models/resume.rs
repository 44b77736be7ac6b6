use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::{to_iso, to_iso_opt};

pub const DOCUMENT_TYPES: &[&str] = &["pdf", "doc", "docx"];
pub const VIDEO_TYPES: &[&str] = &["mp4", "mkv", "avi", "mov", "mpeg", "mpg", "webm"];

/// The two upload kinds, as they appear in download URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Document,
    Video,
}

impl ResumeKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "document" => Some(ResumeKind::Document),
            "video" => Some(ResumeKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeKind::Document => "document",
            ResumeKind::Video => "video",
        }
    }

    pub fn download_url(&self, id: &str) -> String {
        format!("/api/resumes/download/{}/{}", self.as_str(), id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub uploaded_at: BsonDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<BsonDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResume {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    #[serde(default)]
    pub duration: f64,
    pub uploaded_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub uploaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub download_url: String,
}

impl From<Resume> for ResumeResponse {
    fn from(r: Resume) -> Self {
        let id = r.id.map(|id| id.to_hex()).unwrap_or_default();
        ResumeResponse {
            download_url: ResumeKind::Document.download_url(&id),
            id,
            user_id: r.user_id.to_hex(),
            file_name: r.file_name,
            file_type: r.file_type,
            file_size: r.file_size,
            file_path: r.file_path,
            uploaded_at: to_iso(r.uploaded_at),
            last_updated: to_iso_opt(r.last_updated),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResumeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub duration: f64,
    pub uploaded_at: String,
    pub download_url: String,
}

impl From<VideoResume> for VideoResumeResponse {
    fn from(v: VideoResume) -> Self {
        let id = v.id.map(|id| id.to_hex()).unwrap_or_default();
        VideoResumeResponse {
            download_url: ResumeKind::Video.download_url(&id),
            id,
            user_id: v.user_id.to_hex(),
            file_name: v.file_name,
            file_type: v.file_type,
            file_size: v.file_size,
            file_path: v.file_path,
            duration: v.duration,
            uploaded_at: to_iso(v.uploaded_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ResumeListing {
    pub documents: Vec<ResumeResponse>,
    pub videos: Vec<VideoResumeResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ResumeKind::parse("document"), Some(ResumeKind::Document));
        assert_eq!(ResumeKind::parse("video"), Some(ResumeKind::Video));
        assert_eq!(ResumeKind::parse("audio"), None);
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            ResumeKind::Video.download_url("65a1b2c3d4e5f60718293a4b"),
            "/api/resumes/download/video/65a1b2c3d4e5f60718293a4b"
        );
    }

    #[test]
    fn test_response_carries_download_url() {
        let id = ObjectId::new();
        let resume = Resume {
            id: Some(id),
            user_id: ObjectId::new(),
            file_name: "cv.pdf".into(),
            file_type: "pdf".into(),
            file_size: 1024,
            file_path: "upload/resume/cv1700.pdf".into(),
            uploaded_at: BsonDateTime::now(),
            last_updated: None,
        };

        let json = serde_json::to_value(ResumeResponse::from(resume)).unwrap();
        assert_eq!(json["downloadUrl"], format!("/api/resumes/download/document/{}", id.to_hex()));
        assert_eq!(json["fileName"], "cv.pdf");
        assert!(json.get("lastUpdated").is_none());
    }
}
