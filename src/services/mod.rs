pub mod auth_service;
pub mod basic_info_service;
pub mod career_service;
pub mod education_service;
pub mod portfolio_service;
pub mod resume_service;
pub mod skill_service;
pub mod work_experience_service;
