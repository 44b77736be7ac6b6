use crate::{
    database::{MongoDB, WORK_EXPERIENCES},
    models::{WorkExperience, WorkExperienceRequest},
    utils::{
        error::AppError,
        time::parse_date,
        validation::{non_blank, Violations},
    },
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;

fn clean_projects(projects: &[String]) -> Vec<String> {
    projects
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Overlays the request on `current` (or builds a fresh row) and checks the result.
pub fn merge_work_experience(
    user_id: ObjectId,
    current: Option<WorkExperience>,
    request: &WorkExperienceRequest,
) -> Result<WorkExperience, AppError> {
    let mut v = Violations::new();
    let creating = current.is_none();

    let title = non_blank(request.title.clone());
    let company = non_blank(request.company.clone());
    let start_raw = non_blank(request.start_date.clone());
    let start_date = start_raw.as_deref().and_then(parse_date);

    if creating {
        v.check(title.is_some(), "Please enter job title");
        v.check(company.is_some(), "Please enter company name");
    }
    if (creating || start_raw.is_some()) && start_date.is_none() {
        v.push("Please enter a valid start date");
    }

    // `Some(None)` clears the end date
    let end_date = match &request.end_date {
        None => None,
        Some(raw) if raw.trim().is_empty() => Some(None),
        Some(raw) => match parse_date(raw.trim()) {
            Some(date) => Some(Some(date)),
            None => {
                v.push("Please enter a valid end date");
                None
            }
        },
    };
    v.into_result()?;

    let now = BsonDateTime::now();
    let mut row = current.unwrap_or_else(|| WorkExperience {
        id: None,
        user_id,
        title: String::new(),
        company: String::new(),
        start_date: now,
        end_date: None,
        is_current: false,
        location: None,
        description: None,
        projects: Vec::new(),
        created_at: Some(now),
        updated_at: None,
    });

    if let Some(t) = title {
        row.title = t;
    }
    if let Some(c) = company {
        row.company = c;
    }
    if let Some(s) = start_date {
        row.start_date = s;
    }
    if let Some(e) = end_date {
        row.end_date = e;
    }
    if let Some(current) = request.is_current {
        row.is_current = current;
    }
    if request.location.is_some() {
        row.location = non_blank(request.location.clone());
    }
    if request.description.is_some() {
        row.description = non_blank(request.description.clone());
    }
    if let Some(projects) = &request.projects {
        row.projects = clean_projects(projects);
    }

    if row.is_current {
        row.end_date = None;
    }
    if let Some(end) = row.end_date {
        if end < row.start_date {
            return Err(AppError::BadRequest("End date cannot be before start date".to_string()));
        }
    }
    row.updated_at = Some(now);

    Ok(row)
}

pub async fn list_work_experience(
    db: &MongoDB,
    user_id: &ObjectId,
) -> Result<Vec<WorkExperience>, AppError> {
    let cursor = db
        .collection::<WorkExperience>(WORK_EXPERIENCES)
        .find(doc! { "userId": user_id })
        .sort(doc! { "startDate": -1 })
        .await?;

    Ok(cursor.try_collect().await?)
}

pub async fn add_work_experience(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &WorkExperienceRequest,
) -> Result<WorkExperience, AppError> {
    let mut row = merge_work_experience(*user_id, None, request)?;

    let result = db
        .collection::<WorkExperience>(WORK_EXPERIENCES)
        .insert_one(&row)
        .await?;
    row.id = result.inserted_id.as_object_id();

    log::info!("💼 Work experience '{}' added for user {}", row.title, user_id);
    Ok(row)
}

pub async fn update_work_experience(
    db: &MongoDB,
    user_id: &ObjectId,
    id: &ObjectId,
    request: &WorkExperienceRequest,
) -> Result<WorkExperience, AppError> {
    let not_found = || AppError::NotFound("Work experience not found or unauthorized".to_string());
    let filter = doc! { "_id": id, "userId": user_id };
    let collection = db.collection::<WorkExperience>(WORK_EXPERIENCES);

    let current = collection
        .find_one(filter.clone())
        .await?
        .ok_or_else(not_found)?;

    let merged = merge_work_experience(*user_id, Some(current), request)?;
    let mut set = to_document(&merged)
        .map_err(|e| AppError::Internal(format!("Failed to encode work experience: {}", e)))?;
    set.remove("_id");
    // skipped by serde when unset; unset them explicitly
    let mut unset = doc! {};
    for key in ["location", "description"] {
        if !set.contains_key(key) {
            unset.insert(key, "");
        }
    }

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }

    collection
        .find_one_and_update(filter, update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(not_found)
}

pub async fn delete_work_experience(
    db: &MongoDB,
    user_id: &ObjectId,
    id: &ObjectId,
) -> Result<(), AppError> {
    let result = db
        .collection::<WorkExperience>(WORK_EXPERIENCES)
        .delete_one(doc! { "_id": id, "userId": user_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(
            "Work experience not found or unauthorized".to_string(),
        ));
    }
    Ok(())
}
