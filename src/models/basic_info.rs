use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::models::user::UserContact;
use crate::utils::time::{to_iso, to_iso_opt};

pub const GENDERS: &[&str] = &["Male", "Female", "Non-Binary"];

/// Per-user profile document in `basicinfos`, one per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub dob: BsonDateTime,
    pub gender: String,
    pub aadhar: String,
    pub address: String,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub parent_name: String,
    pub parent_number: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// Body of `PUT /api/basic-info`. The account's contact fields ride along so
/// both documents change together.
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
pub struct UpdateBasicInfoRequest {
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub aadhar: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
    pub parent_name: Option<String>,
    pub parent_number: Option<String>,
    pub f_name: Option<String>,
    pub l_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct BasicInfoResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub dob: String,
    pub gender: String,
    pub aadhar: String,
    pub address: String,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub parent_name: String,
    pub parent_number: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<BasicInfo> for BasicInfoResponse {
    fn from(info: BasicInfo) -> Self {
        BasicInfoResponse {
            id: info.id.map(|id| id.to_hex()).unwrap_or_default(),
            user: info.user.to_hex(),
            dob: to_iso(info.dob),
            gender: info.gender,
            aadhar: info.aadhar,
            address: info.address,
            state: info.state,
            district: info.district,
            pincode: info.pincode,
            parent_name: info.parent_name,
            parent_number: info.parent_number,
            created_at: to_iso_opt(info.created_at),
            updated_at: to_iso_opt(info.updated_at),
        }
    }
}

/// Account contact merged with the (possibly missing) basic info.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct BasicInfoData {
    pub user: UserContact,
    #[serde(rename = "basicInfo")]
    pub basic_info: Option<BasicInfoResponse>,
}
