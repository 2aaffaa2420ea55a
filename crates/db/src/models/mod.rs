//! Row models and DTOs, one module per table.

pub mod app_settings;
pub mod memory;
pub mod partner_profile;
pub mod plan;
pub mod user;
