use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso_opt;

/// Account document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub f_name: String,
    pub l_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// bcrypt hash; never leaves the service layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub f_name: Option<String>,
    pub l_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile fields accepted by `PUT /api/update-profile`; blank means "keep".
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub f_name: Option<String>,
    pub l_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub f_name: String,
    pub l_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            f_name: user.f_name,
            l_name: user.l_name,
            email: user.email,
            phone: user.phone,
            profile: user.profile,
            created_at: to_iso_opt(user.created_at),
            updated_at: to_iso_opt(user.updated_at),
        }
    }
}

/// The slice of the account shown next to basic info.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserContact {
    pub f_name: String,
    pub l_name: String,
    pub phone: Option<String>,
    pub email: String,
}

impl From<&User> for UserContact {
    fn from(user: &User) -> Self {
        UserContact {
            f_name: user.f_name.clone(),
            l_name: user.l_name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
        }
    }
}

/// The authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub user: User,
}
