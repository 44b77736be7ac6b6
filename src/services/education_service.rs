use crate::{
    database::{MongoDB, EDUCATIONS},
    models::{Education, EducationRequest},
    utils::{error::AppError, validation::non_blank},
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

fn check_years(start_year: i32, end_year: i32) -> Result<(), AppError> {
    if end_year < start_year {
        return Err(AppError::BadRequest("End year cannot be before start year".to_string()));
    }
    Ok(())
}

fn year(value: Option<i32>) -> Option<i32> {
    value.filter(|y| *y != 0)
}

/// Builds a new row; every field must be present and non-empty.
pub fn new_education(user_id: ObjectId, request: &EducationRequest) -> Result<Education, AppError> {
    let fields = (
        non_blank(request.degree.clone()),
        non_blank(request.institution.clone()),
        non_blank(request.location.clone()),
        year(request.start_year),
        year(request.end_year),
    );

    let (degree, institution, location, start_year, end_year) = match fields {
        (Some(d), Some(i), Some(l), Some(s), Some(e)) => (d, i, l, s, e),
        _ => return Err(AppError::BadRequest("All fields are required".to_string())),
    };
    check_years(start_year, end_year)?;

    let now = BsonDateTime::now();
    Ok(Education {
        id: None,
        user_id,
        degree,
        institution,
        location,
        start_year,
        end_year,
        created_at: Some(now),
        updated_at: Some(now),
    })
}

/// Empty strings and zero years keep the stored value.
pub fn education_changes(current: &Education, request: &EducationRequest) -> Result<Document, AppError> {
    let start_year = year(request.start_year).unwrap_or(current.start_year);
    let end_year = year(request.end_year).unwrap_or(current.end_year);
    check_years(start_year, end_year)?;

    let mut set = doc! {
        "startYear": start_year,
        "endYear": end_year,
        "updatedAt": BsonDateTime::now(),
    };
    if let Some(d) = non_blank(request.degree.clone()) {
        set.insert("degree", d);
    }
    if let Some(i) = non_blank(request.institution.clone()) {
        set.insert("institution", i);
    }
    if let Some(l) = non_blank(request.location.clone()) {
        set.insert("location", l);
    }
    Ok(set)
}

pub async fn add_education(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &EducationRequest,
) -> Result<Education, AppError> {
    let mut education = new_education(*user_id, request)?;

    let result = db
        .collection::<Education>(EDUCATIONS)
        .insert_one(&education)
        .await?;
    education.id = result.inserted_id.as_object_id();

    Ok(education)
}

pub async fn list_education(db: &MongoDB, user_id: &ObjectId) -> Result<Vec<Education>, AppError> {
    let cursor = db
        .collection::<Education>(EDUCATIONS)
        .find(doc! { "userId": user_id })
        .sort(doc! { "startYear": -1 })
        .await?;

    let rows: Vec<Education> = cursor.try_collect().await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("No education records found".to_string()));
    }
    Ok(rows)
}

/// Loads a row for its owner, telling a missing row apart from someone else's.
async fn owned_education(
    db: &MongoDB,
    user_id: &ObjectId,
    id: &ObjectId,
) -> Result<Education, AppError> {
    let education = db
        .collection::<Education>(EDUCATIONS)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Education not found".to_string()))?;

    if education.user_id != *user_id {
        return Err(AppError::Forbidden("Unauthorized access".to_string()));
    }
    Ok(education)
}

pub async fn update_education(
    db: &MongoDB,
    user_id: &ObjectId,
    id: &ObjectId,
    request: &EducationRequest,
) -> Result<Education, AppError> {
    let current = owned_education(db, user_id, id).await?;
    let set = education_changes(&current, request)?;

    db.collection::<Education>(EDUCATIONS)
        .find_one_and_update(doc! { "_id": id, "userId": user_id }, doc! { "$set": set })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Education not found".to_string()))
}

pub async fn delete_education(db: &MongoDB, user_id: &ObjectId, id: &ObjectId) -> Result<(), AppError> {
    owned_education(db, user_id, id).await?;

    let result = db
        .collection::<Education>(EDUCATIONS)
        .delete_one(doc! { "_id": id, "userId": user_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Education not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EducationRequest {
        EducationRequest {
            degree: Some("B.Tech".into()),
            institution: Some("CUSAT".into()),
            location: Some("Kochi".into()),
            start_year: Some(2018),
            end_year: Some(2022),
        }
    }

    #[test]
    fn test_new_education() {
        let user_id = ObjectId::new();
        let edu = new_education(user_id, &request()).unwrap();
        assert_eq!(edu.user_id, user_id);
        assert_eq!(edu.start_year, 2018);
        assert!(edu.created_at.is_some());
    }

    #[test]
    fn test_missing_or_zero_fields_are_rejected() {
        let mut req = request();
        req.start_year = Some(0);
        assert_eq!(
            new_education(ObjectId::new(), &req).unwrap_err().to_string(),
            "All fields are required"
        );

        let mut req = request();
        req.location = Some("  ".into());
        assert!(new_education(ObjectId::new(), &req).is_err());
    }

    #[test]
    fn test_end_year_before_start() {
        let mut req = request();
        req.end_year = Some(2016);
        assert_eq!(
            new_education(ObjectId::new(), &req).unwrap_err().to_string(),
            "End year cannot be before start year"
        );
    }

    #[test]
    fn test_changes_keep_stored_values() {
        let current = new_education(ObjectId::new(), &request()).unwrap();
        let changes = education_changes(
            &current,
            &EducationRequest {
                degree: Some("".into()),
                end_year: Some(2023),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(!changes.contains_key("degree"));
        assert_eq!(changes.get_i32("startYear").unwrap(), 2018);
        assert_eq!(changes.get_i32("endYear").unwrap(), 2023);
    }

    #[test]
    fn test_changes_check_merged_years() {
        let current = new_education(ObjectId::new(), &request()).unwrap();
        let err = education_changes(
            &current,
            &EducationRequest {
                start_year: Some(2024),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "End year cannot be before start year");
    }
}
