use crate::{
    database::{MongoDB, KEY_SKILLS},
    models::{KeySkills, Skill},
    utils::{error::AppError, validation::non_blank},
};
use mongodb::bson::{doc, oid::ObjectId, to_bson, Bson, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use serde_json::Value;

fn skill_to_bson(skill: &Skill) -> Result<Bson, AppError> {
    to_bson(skill).map_err(|e| AppError::Internal(format!("Failed to encode skill: {}", e)))
}

/// Accepts `["Rust", ...]`; entries may also be `{ "name": ... }`. Blank names are dropped.
pub fn parse_skill_list(skills: Option<&Value>) -> Result<Vec<Skill>, AppError> {
    let items = match skills {
        Some(Value::Array(items)) => items,
        _ => return Err(AppError::BadRequest("Skills must be an array".to_string())),
    };

    let skills = items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        })
        .filter(|name| !name.trim().is_empty())
        .map(Skill::new)
        .collect();

    Ok(skills)
}

pub async fn get_skills(db: &MongoDB, user_id: &ObjectId) -> Result<Vec<Skill>, AppError> {
    let key_skills = db
        .collection::<KeySkills>(KEY_SKILLS)
        .find_one_and_update(
            doc! { "userId": user_id },
            doc! { "$setOnInsert": { "skills": [], "updatedAt": BsonDateTime::now() } },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?;

    Ok(key_skills.map(|k| k.skills).unwrap_or_default())
}

pub async fn add_skill(
    db: &MongoDB,
    user_id: &ObjectId,
    skill_name: Option<String>,
) -> Result<Vec<Skill>, AppError> {
    let name = non_blank(skill_name)
        .ok_or_else(|| AppError::BadRequest("Skill name is required".to_string()))?;
    let skill = Skill::new(&name);

    let key_skills = db
        .collection::<KeySkills>(KEY_SKILLS)
        .find_one_and_update(
            doc! { "userId": user_id },
            doc! {
                "$push": { "skills": skill_to_bson(&skill)? },
                "$set": { "updatedAt": BsonDateTime::now() },
            },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?;

    log::info!("🏷️  Skill '{}' added for user {}", skill.name, user_id);
    Ok(key_skills.map(|k| k.skills).unwrap_or_default())
}

pub async fn replace_skills(
    db: &MongoDB,
    user_id: &ObjectId,
    skills: Option<&Value>,
) -> Result<Vec<Skill>, AppError> {
    let skills = parse_skill_list(skills)?;
    let encoded = skills
        .iter()
        .map(skill_to_bson)
        .collect::<Result<Vec<Bson>, AppError>>()?;

    let key_skills = db
        .collection::<KeySkills>(KEY_SKILLS)
        .find_one_and_update(
            doc! { "userId": user_id },
            doc! { "$set": { "skills": encoded, "updatedAt": BsonDateTime::now() } },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?;

    Ok(key_skills.map(|k| k.skills).unwrap_or(skills))
}

pub async fn delete_skill(
    db: &MongoDB,
    user_id: &ObjectId,
    skill_id: &ObjectId,
) -> Result<Vec<Skill>, AppError> {
    let key_skills = db
        .collection::<KeySkills>(KEY_SKILLS)
        .find_one_and_update(
            doc! { "userId": user_id },
            doc! {
                "$pull": { "skills": { "_id": skill_id } },
                "$set": { "updatedAt": BsonDateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))?;

    Ok(key_skills.skills)
}
