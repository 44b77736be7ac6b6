use crate::{
    database::{MongoDB, PORTFOLIOS},
    models::{Portfolio, UpdatePortfolioRequest},
    utils::{
        error::AppError,
        validation::{is_behance_url, is_github_url, is_website_url, Violations},
    },
};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

/// Validates the sent URLs and builds the upsert. Unsent fields keep their
/// value; a new document starts them as "".
pub fn portfolio_update(request: &UpdatePortfolioRequest) -> Result<Document, AppError> {
    let github = request.github.as_deref().map(str::trim);
    let behance = request.behance.as_deref().map(str::trim);
    let website = request.personal_website.as_deref().map(str::trim);

    let mut v = Violations::new();
    if let Some(url) = github {
        v.check(is_github_url(url), "GitHub URL must start with https://github.com/");
    }
    if let Some(url) = behance {
        v.check(is_behance_url(url), "Behance URL must start with https://www.behance.net/");
    }
    if let Some(url) = website {
        v.check(
            is_website_url(url),
            "Personal website must be a valid URL starting with http:// or https://",
        );
    }
    v.into_result()?;

    let now = BsonDateTime::now();
    let mut set = doc! { "updatedAt": now };
    let mut on_insert = doc! { "createdAt": now };

    for (key, value) in [("github", github), ("behance", behance), ("personalWebsite", website)] {
        match value {
            Some(url) => set.insert(key, url),
            None => on_insert.insert(key, ""),
        };
    }

    Ok(doc! { "$set": set, "$setOnInsert": on_insert })
}

pub async fn get_portfolio(db: &MongoDB, user_id: &ObjectId) -> Result<Portfolio, AppError> {
    db.collection::<Portfolio>(PORTFOLIOS)
        .find_one(doc! { "userId": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
}

pub async fn update_portfolio(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &UpdatePortfolioRequest,
) -> Result<Portfolio, AppError> {
    let update = portfolio_update(request)?;

    db.collection::<Portfolio>(PORTFOLIOS)
        .find_one_and_update(doc! { "userId": user_id }, update)
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::Internal("Portfolio upsert returned nothing".to_string()))
}
