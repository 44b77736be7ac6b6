use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso;

/// One `keyskills` document per user holding the whole skill list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySkills {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default)]
    pub skills: Vec<Skill>,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub added_at: BsonDateTime,
}

impl Skill {
    pub fn new(name: &str) -> Self {
        Skill {
            id: ObjectId::new(),
            name: name.trim().to_string(),
            added_at: BsonDateTime::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddSkillRequest {
    pub skill_name: Option<String>,
}

/// `skills` is kept loose so a non-array can be answered with a proper message.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ReplaceSkillsRequest {
    #[schema(value_type = Vec<String>)]
    pub skills: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub added_at: String,
}

impl From<Skill> for SkillResponse {
    fn from(skill: Skill) -> Self {
        SkillResponse {
            id: skill.id.to_hex(),
            name: skill.name,
            added_at: to_iso(skill.added_at),
        }
    }
}
