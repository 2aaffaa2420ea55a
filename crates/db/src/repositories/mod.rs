//! One repository per table. Every query is scoped to a single user.

pub mod app_settings_repo;
pub mod memory_repo;
pub mod partner_profile_repo;
pub mod plan_repo;
pub mod user_repo;

pub use app_settings_repo::AppSettingsRepo;
pub use memory_repo::MemoryRepo;
pub use partner_profile_repo::PartnerProfileRepo;
pub use plan_repo::PlanRepo;
pub use user_repo::UserRepo;
