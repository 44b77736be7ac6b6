use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso_opt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// Used for both add and edit. On edit, empty strings and zero years keep
/// the stored value.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequest {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Education> for EducationResponse {
    fn from(edu: Education) -> Self {
        EducationResponse {
            id: edu.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: edu.user_id.to_hex(),
            degree: edu.degree,
            institution: edu.institution,
            location: edu.location,
            start_year: edu.start_year,
            end_year: edu.end_year,
            created_at: to_iso_opt(edu.created_at),
            updated_at: to_iso_opt(edu.updated_at),
        }
    }
}
