//! App settings rows. Read back raw, like profiles.

use serde::Deserialize;

/// Raw settings row as a JSON object keyed by column name.
pub type RawSettingsRow = serde_json::Value;

/// DTO for upserting the single settings row of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertAppSettings {
    pub notifications: bool,
    pub privacy: String,
    pub user_name: Option<String>,
    pub locale: String,
    pub currency: String,
}
