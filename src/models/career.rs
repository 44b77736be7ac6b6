use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso;

pub const DEFAULT_MAIN_HEADING: &str = "Career Objective";
pub const DEFAULT_SUB_HEADING: &str = "For Entry Level Position";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerObjective {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default = "default_main_heading")]
    pub main_heading: String,
    #[serde(default = "default_sub_heading")]
    pub sub_heading: String,
    #[serde(default)]
    pub description: String,
    pub updated_at: BsonDateTime,
}

fn default_main_heading() -> String {
    DEFAULT_MAIN_HEADING.to_string()
}

fn default_sub_heading() -> String {
    DEFAULT_SUB_HEADING.to_string()
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCareerRequest {
    pub main_heading: Option<String>,
    pub sub_heading: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerObjectiveResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub main_heading: String,
    pub sub_heading: String,
    pub description: String,
    pub updated_at: String,
}

impl From<CareerObjective> for CareerObjectiveResponse {
    fn from(career: CareerObjective) -> Self {
        CareerObjectiveResponse {
            id: career.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: career.user_id.to_hex(),
            main_heading: career.main_heading,
            sub_heading: career.sub_heading,
            description: career.description,
            updated_at: to_iso(career.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let user_id = ObjectId::new();
        let stored = doc! {
            "_id": ObjectId::new(),
            "userId": user_id,
            "updatedAt": BsonDateTime::now(),
        };

        let career: CareerObjective = bson::from_document(stored).unwrap();
        assert_eq!(career.main_heading, DEFAULT_MAIN_HEADING);
        assert_eq!(career.sub_heading, DEFAULT_SUB_HEADING);
        assert_eq!(career.description, "");
        assert_eq!(career.user_id, user_id);
    }

    #[test]
    fn test_response_is_camel_case() {
        let career = CareerObjective {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            main_heading: default_main_heading(),
            sub_heading: default_sub_heading(),
            description: String::new(),
            updated_at: BsonDateTime::now(),
        };
        let json = serde_json::to_value(CareerObjectiveResponse::from(career)).unwrap();
        assert_eq!(json["mainHeading"], DEFAULT_MAIN_HEADING);
        assert!(json.get("userId").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
