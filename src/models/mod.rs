pub mod basic_info;
pub mod career;
pub mod education;
pub mod portfolio;
pub mod resume;
pub mod skill;
pub mod user;
pub mod work_experience;

pub use basic_info::*;
pub use career::*;
pub use education::*;
pub use portfolio::*;
pub use resume::*;
pub use skill::*;
pub use user::*;
pub use work_experience::*;
