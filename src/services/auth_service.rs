use crate::{
    database::{MongoDB, USERS},
    models::{LoginRequest, ProfileUpdate, RegisterRequest, User},
    utils::{
        error::{is_duplicate_key, AppError},
        validation::{is_email, non_blank, Violations},
    },
};
use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

pub const BCRYPT_COST: u32 = 10;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 30;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String, // user _id as hex
    pub iat: usize,
    pub exp: usize,
}

pub fn generate_jwt(user_id: &ObjectId, secret: &str, expires_secs: i64) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now
        .checked_add(expires_secs)
        .and_then(|exp| usize::try_from(exp).ok())
        .ok_or_else(|| AppError::Internal(format!("Token lifetime out of range: {}s", expires_secs)))?;
    let claims = Claims {
        id: user_id.to_hex(),
        iat: usize::try_from(now).unwrap_or_default(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Expired tokens get their own message so the
/// client can tell the user to log in again.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired. Please log in again.".to_string())
            }
            _ => AppError::Unauthorized("Authentication failed. Please log in again.".to_string()),
        })
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn password_matches(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_names(v: &mut Violations, f_name: Option<&str>, l_name: Option<&str>) {
    if let Some(f) = f_name {
        v.check(f.chars().count() <= MAX_NAME_LEN, "First name cannot exceed 30 characters");
    }
    if let Some(l) = l_name {
        v.check(l.chars().count() <= MAX_NAME_LEN, "Last name cannot exceed 30 characters");
    }
}

/// Validates a registration and returns the account to insert (password not yet hashed).
pub fn validate_registration(request: &RegisterRequest) -> Result<User, AppError> {
    let f_name = non_blank(request.f_name.clone());
    let l_name = non_blank(request.l_name.clone());
    let email = non_blank(request.email.clone()).map(|e| normalize_email(&e));
    let password = request.password.clone().filter(|p| !p.is_empty());

    let (f_name, l_name, email, password) = match (f_name, l_name, email, password) {
        (Some(f), Some(l), Some(e), Some(p)) => (f, l, e, p),
        _ => return Err(AppError::BadRequest("Please enter all required fields".to_string())),
    };

    let mut v = Violations::new();
    check_names(&mut v, Some(&f_name), Some(&l_name));
    v.check(is_email(&email), "Please enter a valid email address");
    v.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        "Password must be at least 6 characters",
    );
    v.into_result()?;

    let now = BsonDateTime::now();
    Ok(User {
        id: None,
        f_name,
        l_name,
        email,
        phone: non_blank(request.phone.clone()),
        profile: None,
        password: Some(password),
        created_at: Some(now),
        updated_at: Some(now),
    })
}

// User registration
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<User, AppError> {
    let mut user = validate_registration(request)?;
    let collection = db.collection::<User>(USERS);

    if collection
        .find_one(doc! { "email": &user.email })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let plain = user.password.take().unwrap_or_default();
    user.password = Some(hash_password(plain).await?);

    let result = collection.insert_one(&user).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::Conflict("Email is already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    user.id = result.inserted_id.as_object_id();
    user.password = None;

    log::info!("✅ User registered successfully: {}", user.email);
    Ok(user)
}

// User login
pub async fn login(
    db: &MongoDB,
    request: &LoginRequest,
    secret: &str,
    expires_secs: i64,
) -> Result<(String, User), AppError> {
    let email = non_blank(request.email.clone()).map(|e| normalize_email(&e));
    let password = request.password.clone().filter(|p| !p.is_empty());

    let (email, password) = match (email, password) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(AppError::BadRequest("Please enter email and password".to_string())),
    };

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let mut user = db
        .collection::<User>(USERS)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(invalid)?;

    let stored_hash = user.password.take().ok_or_else(invalid)?;
    if !password_matches(password, stored_hash).await? {
        return Err(invalid());
    }

    let user_id = user.id.ok_or_else(|| AppError::Internal("User has no _id".to_string()))?;
    let token = generate_jwt(&user_id, secret, expires_secs)?;

    Ok((token, user))
}

/// Loads an account without its password hash.
pub async fn find_user(db: &MongoDB, user_id: &ObjectId) -> Result<Option<User>, AppError> {
    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user_id })
        .projection(doc! { "password": 0 })
        .await?;
    Ok(user)
}

/// Builds the `$set` document for a profile update; blank fields keep their value.
pub fn profile_changes(update: &ProfileUpdate) -> Result<Document, AppError> {
    let f_name = non_blank(update.f_name.clone());
    let l_name = non_blank(update.l_name.clone());
    let email = non_blank(update.email.clone()).map(|e| normalize_email(&e));
    let phone = non_blank(update.phone.clone());

    let mut v = Violations::new();
    check_names(&mut v, f_name.as_deref(), l_name.as_deref());
    if let Some(e) = &email {
        v.check(is_email(e), "Please enter a valid email address");
    }
    v.into_result()?;

    let mut set = Document::new();
    if let Some(f) = f_name {
        set.insert("f_name", f);
    }
    if let Some(l) = l_name {
        set.insert("l_name", l);
    }
    if let Some(e) = email {
        set.insert("email", e);
    }
    if let Some(p) = phone {
        set.insert("phone", p);
    }
    if let Some(profile) = &update.profile {
        set.insert("profile", profile.clone());
    }
    set.insert("updatedAt", BsonDateTime::now());

    Ok(set)
}

/// Applies a profile update. Returns the updated account and, when the
/// picture was replaced, the previous picture URL so its file can go.
pub async fn update_profile(
    db: &MongoDB,
    user_id: &ObjectId,
    update: &ProfileUpdate,
) -> Result<(User, Option<String>), AppError> {
    let set = profile_changes(update)?;

    let current = find_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Ok(new_email) = set.get_str("email") {
        if new_email != current.email {
            let taken = db
                .collection::<User>(USERS)
                .find_one(doc! { "email": new_email, "_id": { "$ne": user_id } })
                .await?
                .is_some();
            if taken {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
        }
    }

    let updated = db
        .collection::<User>(USERS)
        .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": set })
        .return_document(mongodb::options::ReturnDocument::After)
        .projection(doc! { "password": 0 })
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict("Email is already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let replaced_profile = match (&update.profile, current.profile) {
        (Some(new), Some(old)) if *new != old => Some(old),
        _ => None,
    };

    Ok((updated, replaced_profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn registration() -> RegisterRequest {
        RegisterRequest {
            f_name: Some(" Asha ".into()),
            l_name: Some("Nair".into()),
            email: Some("Asha@Example.com ".into()),
            phone: Some("".into()),
            password: Some("hunter22".into()),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let id = ObjectId::new();
        let token = generate_jwt(&id, SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.id, id.to_hex());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_has_its_own_message() {
        let id = ObjectId::new();
        // well past the default 60s leeway
        let token = generate_jwt(&id, SECRET, -3600).unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert_eq!(err.to_string(), "Token has expired. Please log in again.");
    }

    #[test]
    fn test_token_lifetime_overflow_is_an_error() {
        let err = generate_jwt(&ObjectId::new(), SECRET, i64::MAX).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_jwt(&ObjectId::new(), SECRET, 3600).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed. Please log in again.");
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }

    #[test]
    fn test_registration_normalizes_fields() {
        let user = validate_registration(&registration()).unwrap();
        assert_eq!(user.f_name, "Asha");
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.phone, None);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_registration_requires_fields() {
        let mut req = registration();
        req.password = None;
        let err = validate_registration(&req).unwrap_err();
        assert_eq!(err.to_string(), "Please enter all required fields");
    }

    #[test]
    fn test_registration_rules() {
        let mut req = registration();
        req.f_name = Some("A".repeat(31));
        req.email = Some("not-an-email".into());
        req.password = Some("123".into());

        let err = validate_registration(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "First name cannot exceed 30 characters, Please enter a valid email address, Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_profile_changes_skip_blank_fields() {
        let update = ProfileUpdate {
            f_name: Some("".into()),
            l_name: Some("Menon".into()),
            email: None,
            phone: Some(" 9876543210 ".into()),
            profile: Some("http://localhost:5002/upload/user/resized-1_me.png".into()),
        };

        let set = profile_changes(&update).unwrap();
        assert!(!set.contains_key("f_name"));
        assert_eq!(set.get_str("l_name").unwrap(), "Menon");
        assert_eq!(set.get_str("phone").unwrap(), "9876543210");
        assert!(set.contains_key("profile"));
        assert!(set.contains_key("updatedAt"));
    }

    #[test]
    fn test_profile_changes_validate_email() {
        let update = ProfileUpdate {
            email: Some("broken@".into()),
            ..Default::default()
        };
        assert!(profile_changes(&update).is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hashed = hash_password("hunter22".into()).await.unwrap();
        assert!(password_matches("hunter22".into(), hashed.clone()).await.unwrap());
        assert!(!password_matches("hunter23".into(), hashed).await.unwrap());
    }
}
