use crate::{
    database::{MongoDB, CAREER_OBJECTIVES},
    models::{CareerObjective, UpdateCareerRequest, DEFAULT_MAIN_HEADING, DEFAULT_SUB_HEADING},
    utils::error::AppError,
};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

/// Update that only fills in the defaults when the document is created.
pub fn career_defaults() -> Document {
    doc! {
        "$setOnInsert": {
            "mainHeading": DEFAULT_MAIN_HEADING,
            "subHeading": DEFAULT_SUB_HEADING,
            "description": "",
            "updatedAt": BsonDateTime::now(),
        }
    }
}

/// Returns the user's career objective, inserting the defaults on first read.
pub async fn get_career(db: &MongoDB, user_id: &ObjectId) -> Result<CareerObjective, AppError> {
    db.collection::<CareerObjective>(CAREER_OBJECTIVES)
        .find_one_and_update(doc! { "userId": user_id }, career_defaults())
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::Internal("Career upsert returned nothing".to_string()))
}

/// Splits the request into fields to overwrite and defaults for a new document.
pub fn career_update(request: &UpdateCareerRequest) -> Document {
    let mut set = Document::new();
    let mut on_insert = Document::new();

    match &request.main_heading {
        Some(h) => {
            set.insert("mainHeading", h.clone());
        }
        None => {
            on_insert.insert("mainHeading", DEFAULT_MAIN_HEADING);
        }
    }
    match &request.sub_heading {
        Some(h) => {
            set.insert("subHeading", h.clone());
        }
        None => {
            on_insert.insert("subHeading", DEFAULT_SUB_HEADING);
        }
    }
    match &request.description {
        Some(d) => {
            set.insert("description", d.clone());
        }
        None => {
            on_insert.insert("description", "");
        }
    }
    set.insert("updatedAt", BsonDateTime::now());

    doc! { "$set": set, "$setOnInsert": on_insert }
}

pub async fn update_career(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &UpdateCareerRequest,
) -> Result<CareerObjective, AppError> {
    db.collection::<CareerObjective>(CAREER_OBJECTIVES)
        .find_one_and_update(doc! { "userId": user_id }, career_update(request))
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::Internal("Career upsert returned nothing".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_only_default_on_insert() {
        let update = career_update(&UpdateCareerRequest {
            description: Some("Looking for backend roles".into()),
            ..Default::default()
        });

        let set = update.get_document("$set").unwrap();
        let on_insert = update.get_document("$setOnInsert").unwrap();

        assert_eq!(set.get_str("description").unwrap(), "Looking for backend roles");
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("mainHeading"));
        assert_eq!(on_insert.get_str("mainHeading").unwrap(), DEFAULT_MAIN_HEADING);
        assert!(!on_insert.contains_key("description"));
    }

    #[test]
    fn test_defaults_never_overwrite() {
        let update = career_defaults();
        assert_eq!(update.keys().collect::<Vec<_>>(), vec!["$setOnInsert"]);

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert_eq!(on_insert.get_str("mainHeading").unwrap(), DEFAULT_MAIN_HEADING);
        assert_eq!(on_insert.get_str("subHeading").unwrap(), DEFAULT_SUB_HEADING);
        assert_eq!(on_insert.get_str("description").unwrap(), "");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_concurrent_first_reads_create_one_document() {
        let db = crate::database::testing::lazy_db().await;
        let user_id = ObjectId::new();

        let (a, b) = tokio::join!(get_career(&db, &user_id), get_career(&db, &user_id));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(a.main_heading, DEFAULT_MAIN_HEADING);

        let count = db
            .collection::<Document>(CAREER_OBJECTIVES)
            .count_documents(doc! { "userId": user_id })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_strings_are_kept() {
        let update = career_update(&UpdateCareerRequest {
            sub_heading: Some(String::new()),
            ..Default::default()
        });
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("subHeading").unwrap(), "");
    }
}
