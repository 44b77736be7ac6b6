use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso_opt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub behance: String,
    #[serde(default)]
    pub personal_website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    pub github: Option<String>,
    pub behance: Option<String>,
    pub personal_website: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub github: String,
    pub behance: String,
    pub personal_website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(p: Portfolio) -> Self {
        PortfolioResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: p.user_id.to_hex(),
            github: p.github,
            behance: p.behance,
            personal_website: p.personal_website,
            created_at: to_iso_opt(p.created_at),
            updated_at: to_iso_opt(p.updated_at),
        }
    }
}
