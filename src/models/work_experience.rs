use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::{to_iso, to_iso_opt};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub company: String,
    pub start_date: BsonDateTime,
    #[serde(default)]
    pub end_date: Option<BsonDateTime>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// Body for add and edit; on edit only the present fields change.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<bool>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub projects: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<WorkExperience> for WorkExperienceResponse {
    fn from(w: WorkExperience) -> Self {
        WorkExperienceResponse {
            id: w.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: w.user_id.to_hex(),
            title: w.title,
            company: w.company,
            start_date: to_iso(w.start_date),
            end_date: to_iso_opt(w.end_date),
            is_current: w.is_current,
            location: w.location,
            description: w.description,
            projects: w.projects,
            created_at: to_iso_opt(w.created_at),
            updated_at: to_iso_opt(w.updated_at),
        }
    }
}
