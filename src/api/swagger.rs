use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ASAP Profile API",
        version = "1.0.0",
        description = "Job-seeker profile backend.\n\n**Authentication:** everything except registration, login, logout and health needs a JWT, sent as a Bearer token or in the `token` cookie set at login."
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::logout,
        crate::api::auth::get_me,
        crate::api::auth::update_profile,

        // Health
        crate::api::health::health_check,

        // Profile sections
        crate::api::basic_info::get_basic_info,
        crate::api::basic_info::update_basic_info,
        crate::api::career::get_career,
        crate::api::career::update_career,
        crate::api::education::add_education,
        crate::api::education::get_education,
        crate::api::education::update_education,
        crate::api::education::delete_education,
        crate::api::skills::get_skills,
        crate::api::skills::add_skill,
        crate::api::skills::replace_skills,
        crate::api::skills::delete_skill,
        crate::api::portfolio::get_portfolio,
        crate::api::portfolio::update_portfolio,
        crate::api::work_experience::get_work_experience,
        crate::api::work_experience::add_work_experience,
        crate::api::work_experience::update_work_experience,
        crate::api::work_experience::delete_work_experience,

        // Uploads
        crate::api::resumes::get_resumes,
        crate::api::resumes::upload_resume,
        crate::api::resumes::update_resume,
        crate::api::resumes::delete_resume,
        crate::api::resumes::upload_video_resume,
        crate::api::resumes::delete_video_resume,
        crate::api::resumes::download_resume,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::UserResponse,
            crate::models::UserContact,
            crate::api::health::HealthResponse,
            crate::models::UpdateBasicInfoRequest,
            crate::models::BasicInfoResponse,
            crate::models::BasicInfoData,
            crate::models::UpdateCareerRequest,
            crate::models::CareerObjectiveResponse,
            crate::models::EducationRequest,
            crate::models::EducationResponse,
            crate::models::AddSkillRequest,
            crate::models::ReplaceSkillsRequest,
            crate::models::SkillResponse,
            crate::models::UpdatePortfolioRequest,
            crate::models::PortfolioResponse,
            crate::models::WorkExperienceRequest,
            crate::models::WorkExperienceResponse,
            crate::models::ResumeResponse,
            crate::models::VideoResumeResponse,
            crate::models::ResumeListing,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, logout and the account profile."),
        (name = "Health", description = "Liveness and database reachability."),
        (name = "Basic Info", description = "Date of birth, gender, Aadhar, address and guardian details."),
        (name = "Career", description = "Career objective headings and description."),
        (name = "Education", description = "Degrees and institutions."),
        (name = "Skills", description = "Key skills list."),
        (name = "Portfolio", description = "GitHub, Behance and personal website links."),
        (name = "Work Experience", description = "Jobs and internships."),
        (name = "Resumes", description = "Document and video resume uploads and downloads."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /api/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_profile_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/api/login", "/api/basic-info", "/api/edu/{id}", "/api/resumes/download/{kind}/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .map_or(false, |c| c.security_schemes.contains_key("bearer_auth")));
    }
}
