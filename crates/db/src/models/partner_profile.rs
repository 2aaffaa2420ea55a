//! Partner profile rows.
//!
//! Profiles are read back as a raw JSON object (`to_jsonb` of the row) so
//! the data layer can run them through the canonical field map; older rows
//! carry differently spelled columns.

use chrono::NaiveDate;
use serde::Deserialize;

/// Raw profile row as a JSON object keyed by column name.
pub type RawProfileRow = serde_json::Value;

/// DTO for upserting the single profile row of a user.
///
/// `None` favorites are stored as NULL and read back as the placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPartnerProfile {
    pub name: String,
    pub favorite_color: Option<String>,
    pub favorite_food: Option<String>,
    pub favorite_hobbies: Vec<String>,
    /// JSON array of `{date, description}` objects.
    pub important_dates: serde_json::Value,
    pub notes: String,
    pub birthday: Option<NaiveDate>,
    pub anniversary: Option<NaiveDate>,
    pub love_languages: Vec<String>,
    pub favorite_things: Option<String>,
    pub dislikes: Option<String>,
    pub sizes: Option<serde_json::Value>,
}
