use crate::{
    database::{MongoDB, BASIC_INFOS, USERS},
    models::{BasicInfo, BasicInfoData, BasicInfoResponse, UpdateBasicInfoRequest, User, UserContact, GENDERS},
    services::auth_service::MAX_NAME_LEN,
    utils::{
        error::AppError,
        time::parse_date,
        validation::{is_aadhar, is_phone, is_pincode, non_blank, Violations},
    },
};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use mongodb::ClientSession;

/// The two `$set` documents produced by one `PUT /api/basic-info`.
#[derive(Debug, Default)]
pub struct BasicInfoChanges {
    pub info: Document,
    pub user: Document,
}

/// Validates the request against the stored state. A first save needs every
/// field; later saves only touch what was sent.
pub fn plan_changes(
    request: &UpdateBasicInfoRequest,
    creating: bool,
) -> Result<BasicInfoChanges, AppError> {
    let mut v = Violations::new();
    let mut info = Document::new();

    let dob = non_blank(request.dob.clone());
    let gender = non_blank(request.gender.clone());
    let aadhar = non_blank(request.aadhar.clone());
    let address = non_blank(request.address.clone());
    let state = non_blank(request.state.clone());
    let district = non_blank(request.district.clone());
    let pincode = non_blank(request.pincode.clone());
    let parent_name = non_blank(request.parent_name.clone());
    let parent_number = non_blank(request.parent_number.clone());

    if creating {
        v.require(dob.as_deref(), "Please enter date of birth");
        v.require(gender.as_deref(), "Please select gender");
        v.require(aadhar.as_deref(), "Please enter Aadhar number");
        v.require(address.as_deref(), "Please enter address");
        v.require(state.as_deref(), "Please select state");
        v.require(district.as_deref(), "Please select district");
        v.require(pincode.as_deref(), "Please enter pincode");
        v.require(parent_name.as_deref(), "Please enter parent/guardian name");
        v.require(parent_number.as_deref(), "Please enter parent/guardian number");
    }

    if let Some(raw) = dob {
        match parse_date(&raw) {
            Some(date) => {
                info.insert("dob", date);
            }
            None => v.push(format!("{} is not a valid date!", raw)),
        }
    }
    if let Some(g) = gender {
        v.check(
            GENDERS.contains(&g.as_str()),
            format!("`{}` is not a valid enum value for path `gender`.", g),
        );
        info.insert("gender", g);
    }
    if let Some(a) = aadhar {
        v.check(is_aadhar(&a), format!("{} is not a valid Aadhar number!", a));
        info.insert("aadhar", a);
    }
    if let Some(p) = pincode {
        v.check(is_pincode(&p), format!("{} is not a valid pincode!", p));
        info.insert("pincode", p);
    }
    if let Some(n) = parent_number {
        v.check(is_phone(&n), format!("{} is not a valid phone number!", n));
        info.insert("parent_number", n);
    }
    for (key, value) in [
        ("address", address),
        ("state", state),
        ("district", district),
        ("parent_name", parent_name),
    ] {
        if let Some(value) = value {
            info.insert(key, value);
        }
    }

    let mut user = Document::new();
    if let Some(f) = non_blank(request.f_name.clone()) {
        v.check(f.chars().count() <= MAX_NAME_LEN, "First name cannot exceed 30 characters");
        user.insert("f_name", f);
    }
    if let Some(l) = non_blank(request.l_name.clone()) {
        v.check(l.chars().count() <= MAX_NAME_LEN, "Last name cannot exceed 30 characters");
        user.insert("l_name", l);
    }
    if let Some(p) = non_blank(request.phone.clone()) {
        user.insert("phone", p);
    }

    v.into_result()?;

    let now = BsonDateTime::now();
    info.insert("updatedAt", now);
    if !user.is_empty() {
        user.insert("updatedAt", now);
    }

    Ok(BasicInfoChanges { info, user })
}

pub async fn get_basic_info(db: &MongoDB, user_id: &ObjectId) -> Result<BasicInfoData, AppError> {
    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user_id })
        .projection(doc! { "password": 0 })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let basic_info = db
        .collection::<BasicInfo>(BASIC_INFOS)
        .find_one(doc! { "user": user_id })
        .await?;

    Ok(BasicInfoData {
        user: UserContact::from(&user),
        basic_info: basic_info.map(BasicInfoResponse::from),
    })
}

// Every statement takes the session when one is given.
async fn apply_changes(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &UpdateBasicInfoRequest,
    mut session: Option<&mut ClientSession>,
) -> Result<BasicInfoData, AppError> {
    let users = db.collection::<User>(USERS);
    let infos = db.collection::<BasicInfo>(BASIC_INFOS);

    let mut find_existing = infos.find_one(doc! { "user": user_id });
    if let Some(s) = session.as_deref_mut() {
        find_existing = find_existing.session(s);
    }
    let existing = find_existing.await?;

    let changes = plan_changes(request, existing.is_none())?;

    let mut find_user = users
        .find_one(doc! { "_id": user_id })
        .projection(doc! { "password": 0 });
    if let Some(s) = session.as_deref_mut() {
        find_user = find_user.session(s);
    }
    let mut user = find_user
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !changes.user.is_empty() {
        let mut update_user = users
            .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": changes.user })
            .projection(doc! { "password": 0 })
            .return_document(ReturnDocument::After);
        if let Some(s) = session.as_deref_mut() {
            update_user = update_user.session(s);
        }
        user = update_user
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    }

    let mut upsert_info = infos
        .find_one_and_update(
            doc! { "user": user_id },
            doc! {
                "$set": changes.info,
                "$setOnInsert": { "createdAt": BsonDateTime::now() },
            },
        )
        .upsert(true)
        .return_document(ReturnDocument::After);
    if let Some(s) = session.as_deref_mut() {
        upsert_info = upsert_info.session(s);
    }
    let info = upsert_info
        .await?
        .ok_or_else(|| AppError::Internal("Basic info upsert returned nothing".to_string()))?;

    Ok(BasicInfoData {
        user: UserContact::from(&user),
        basic_info: Some(BasicInfoResponse::from(info)),
    })
}

/// Saves the basic info and the account contact fields together. With
/// `transactional` both writes commit or neither does.
pub async fn update_basic_info(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &UpdateBasicInfoRequest,
    transactional: bool,
) -> Result<BasicInfoData, AppError> {
    if !transactional {
        return apply_changes(db, user_id, request, None).await;
    }

    let mut session = db.client().start_session().await?;
    session.start_transaction().await?;

    match apply_changes(db, user_id, request, Some(&mut session)).await {
        Ok(data) => {
            session.commit_transaction().await?;
            log::info!("✅ Basic info committed for user {}", user_id);
            Ok(data)
        }
        Err(e) => {
            if let Err(abort_err) = session.abort_transaction().await {
                log::error!("❌ Failed to abort basic info transaction: {}", abort_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> UpdateBasicInfoRequest {
        UpdateBasicInfoRequest {
            dob: Some("2001-04-09".into()),
            gender: Some("Female".into()),
            aadhar: Some("123412341234".into()),
            address: Some("12 MG Road".into()),
            state: Some("Kerala".into()),
            district: Some("Ernakulam".into()),
            pincode: Some("682001".into()),
            parent_name: Some("Ravi Nair".into()),
            parent_number: Some("9876543210".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_save_requires_every_field() {
        let err = plan_changes(&UpdateBasicInfoRequest::default(), true).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Please enter date of birth, Please select gender"));
        assert!(message.ends_with("Please enter parent/guardian number"));
    }

    #[test]
    fn test_full_request_builds_both_documents() {
        let mut request = full_request();
        request.f_name = Some("Asha".into());

        let changes = plan_changes(&request, true).unwrap();
        assert!(changes.info.get_datetime("dob").is_ok());
        assert_eq!(changes.info.get_str("pincode").unwrap(), "682001");
        assert_eq!(changes.user.get_str("f_name").unwrap(), "Asha");
        assert!(changes.user.contains_key("updatedAt"));
    }

    #[test]
    fn test_partial_update_only_sets_sent_fields() {
        let request = UpdateBasicInfoRequest {
            state: Some("Goa".into()),
            ..Default::default()
        };

        let changes = plan_changes(&request, false).unwrap();
        assert_eq!(changes.info.get_str("state").unwrap(), "Goa");
        assert!(!changes.info.contains_key("aadhar"));
        assert!(changes.user.is_empty());
    }

    #[test]
    fn test_format_messages_are_joined() {
        let mut request = full_request();
        request.aadhar = Some("1234".into());
        request.pincode = Some("68200".into());
        request.parent_number = Some("98765".into());

        let err = plan_changes(&request, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1234 is not a valid Aadhar number!, 68200 is not a valid pincode!, 98765 is not a valid phone number!"
        );
    }

    #[test]
    fn test_gender_must_be_known() {
        let request = UpdateBasicInfoRequest {
            gender: Some("Other".into()),
            ..Default::default()
        };
        assert!(plan_changes(&request, false).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_update_then_read() {
        let db = crate::database::testing::lazy_db().await;
        let user_id = ObjectId::new();
        db.collection::<Document>(USERS)
            .insert_one(doc! { "_id": user_id, "f_name": "A", "l_name": "B", "email": format!("{}@t.io", user_id) })
            .await
            .unwrap();

        update_basic_info(&db, &user_id, &full_request(), false).await.unwrap();
        let data = get_basic_info(&db, &user_id).await.unwrap();
        assert_eq!(data.basic_info.unwrap().district, "Ernakulam");
    }

    /// A throwaway database so the collection validator below stays local.
    async fn scratch_db() -> MongoDB {
        let uri = std::env::var("MONGO_URL").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
        let client = mongodb::Client::with_uri_str(uri).await.unwrap();
        let db = MongoDB::from_client(client, &format!("asap_tx_{}", ObjectId::new().to_hex()));

        // rejects one state so the second write of a transaction can be made to fail
        db.database()
            .create_collection(BASIC_INFOS)
            .validator(doc! { "state": { "$ne": "Atlantis" } })
            .await
            .unwrap();
        db
    }

    async fn insert_user(db: &MongoDB) -> ObjectId {
        let user_id = ObjectId::new();
        db.collection::<Document>(USERS)
            .insert_one(doc! { "_id": user_id, "f_name": "A", "l_name": "B", "email": format!("{}@t.io", user_id) })
            .await
            .unwrap();
        user_id
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set
    async fn test_transaction_commits_both_documents() {
        let db = scratch_db().await;
        let user_id = insert_user(&db).await;

        let mut request = full_request();
        request.f_name = Some("Asha".into());
        request.phone = Some("9876543210".into());

        let data = update_basic_info(&db, &user_id, &request, true).await.unwrap();
        assert_eq!(data.user.f_name, "Asha");

        let user = db
            .collection::<Document>(USERS)
            .find_one(doc! { "_id": user_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.get_str("f_name").unwrap(), "Asha");
        assert_eq!(user.get_str("phone").unwrap(), "9876543210");

        let info = db
            .collection::<Document>(BASIC_INFOS)
            .find_one(doc! { "user": user_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.get_str("district").unwrap(), "Ernakulam");

        db.database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set
    async fn test_failed_basic_info_write_rolls_back_user() {
        let db = scratch_db().await;
        let user_id = insert_user(&db).await;

        let mut request = full_request();
        request.f_name = Some("Changed".into());
        request.state = Some("Atlantis".into());

        let err = update_basic_info(&db, &user_id, &request, true).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let user = db
            .collection::<Document>(USERS)
            .find_one(doc! { "_id": user_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.get_str("f_name").unwrap(), "A");

        let infos = db
            .collection::<Document>(BASIC_INFOS)
            .count_documents(doc! { "user": user_id })
            .await
            .unwrap();
        assert_eq!(infos, 0);

        db.database().drop().await.unwrap();
    }
}
