//! Conversion between application shapes and remote rows.
//!
//! Memories are stored remotely as `body` + `tags` + three-level
//! `importance`; the 1–5 rating collapses on write (see
//! [`Importance::from_rating`]). Profile and settings rows arrive as raw
//! JSON and pass through the canonical field map before deserialization.

use little_things_core::error::DataError;
use little_things_core::field_map::{canonicalize, PROFILE_FIELDS, SETTINGS_FIELDS};
use little_things_core::memory::{Importance, Memory, NewMemory, UpdateMemory, DEFAULT_CATEGORY};
use little_things_core::plan::{NewPlan, Plan, Priority, UpdatePlan};
use little_things_core::profile::{is_placeholder, ClothingSizes, ImportantDate, PartnerProfile};
use little_things_core::settings::{AppSettings, PrivacyMode};
use little_things_core::types::Timestamp;
use little_things_db::models::app_settings::UpsertAppSettings;
use little_things_db::models::memory::{CreateMemoryRecord, MemoryRecord, UpdateMemoryRecord};
use little_things_db::models::partner_profile::UpsertPartnerProfile;
use little_things_db::models::plan::{CreatePlanRecord, PlanRecord, UpdatePlanRecord};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Memories
// ---------------------------------------------------------------------------

pub fn memory_from_row(row: &MemoryRecord) -> Memory {
    Memory {
        id: row.id.to_string(),
        title: row.title.clone(),
        description: row.body.clone(),
        category: row
            .tags
            .first()
            .filter(|tag| !tag.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        rating: Importance::from_str_value(&row.importance).to_rating(),
        date: row.date.unwrap_or_else(|| row.created_at.date_naive()),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn category_tags(category: &str) -> Vec<String> {
    let category = category.trim();
    if category.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        vec![category.to_string()]
    }
}

pub fn memory_insert_from(input: &NewMemory) -> CreateMemoryRecord {
    CreateMemoryRecord {
        title: input.title.trim().to_string(),
        body: input.description.clone(),
        tags: category_tags(&input.category),
        importance: Importance::from_rating(input.rating).as_str().to_string(),
        date: Some(input.date),
    }
}

pub fn memory_update_from(update: &UpdateMemory) -> UpdateMemoryRecord {
    UpdateMemoryRecord {
        title: update.title.as_deref().map(|t| t.trim().to_string()),
        body: update.description.clone(),
        tags: update.category.as_deref().map(category_tags),
        importance: update
            .rating
            .map(|r| Importance::from_rating(r).as_str().to_string()),
        date: update.date,
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

pub fn plan_from_row(row: &PlanRecord) -> Plan {
    Plan {
        id: row.id.to_string(),
        title: row.title.clone(),
        description: row.description.clone(),
        date: row.scheduled_for,
        category: row.category.clone(),
        priority: Priority::from_str_value(&row.priority),
        completed: row.completed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// `now` stands in for an absent plan date.
pub fn plan_insert_from(input: &NewPlan, now: Timestamp) -> CreatePlanRecord {
    CreatePlanRecord {
        title: input.title.trim().to_string(),
        description: input.description.clone(),
        category: input.category_or_default(),
        priority: input.priority.as_str().to_string(),
        completed: input.completed,
        scheduled_for: input.date.unwrap_or(now),
    }
}

pub fn plan_update_from(update: &UpdatePlan) -> UpdatePlanRecord {
    UpdatePlanRecord {
        title: update.title.as_deref().map(|t| t.trim().to_string()),
        description: update.description.clone(),
        category: update.category.clone(),
        priority: update.priority.map(|p| p.as_str().to_string()),
        completed: update.completed,
        scheduled_for: update.date,
    }
}

// ---------------------------------------------------------------------------
// Partner profile
// ---------------------------------------------------------------------------

/// Canonicalize and decode a raw profile row.
///
/// Rows without an explicit important-dates list get one derived from
/// `birthday` and `anniversary`.
pub fn profile_from_row(raw: &Value) -> Result<PartnerProfile, DataError> {
    let canonical = canonicalize(raw, PROFILE_FIELDS);
    let has_dates = canonical.get("important_dates").is_some();
    let mut profile: PartnerProfile =
        serde_json::from_value(canonical).map_err(|e| DataError::SchemaMismatch {
            action: "load your partner profile",
            message: e.to_string(),
        })?;
    if !has_dates {
        profile.important_dates =
            PartnerProfile::dates_from_milestones(profile.birthday, profile.anniversary);
    }
    Ok(profile)
}

fn real_value(value: &str) -> Option<String> {
    (!is_placeholder(value)).then(|| value.to_string())
}

fn dates_json(dates: &[ImportantDate]) -> Value {
    Value::Array(
        dates
            .iter()
            .map(|d| {
                let mut entry = Map::new();
                entry.insert("date".into(), Value::String(d.date.to_string()));
                entry.insert("description".into(), Value::String(d.description.clone()));
                Value::Object(entry)
            })
            .collect(),
    )
}

fn sizes_json(sizes: &ClothingSizes) -> Option<Value> {
    if sizes.is_empty() {
        return None;
    }
    let mut out = Map::new();
    for (key, value) in [
        ("shirt", &sizes.shirt),
        ("pants", &sizes.pants),
        ("shoe", &sizes.shoe),
        ("ring", &sizes.ring),
    ] {
        if let Some(value) = value {
            out.insert(key.into(), Value::String(value.clone()));
        }
    }
    Some(Value::Object(out))
}

/// Placeholder favorites are stored as NULL and read back as the placeholder.
pub fn profile_upsert_from(profile: &PartnerProfile) -> UpsertPartnerProfile {
    UpsertPartnerProfile {
        name: profile.name.clone(),
        favorite_color: real_value(&profile.favorite_color),
        favorite_food: real_value(&profile.favorite_food),
        favorite_hobbies: profile.favorite_hobbies.clone(),
        important_dates: dates_json(&profile.important_dates),
        notes: profile.notes.clone(),
        birthday: profile.birthday,
        anniversary: profile.anniversary,
        love_languages: profile.love_languages.clone(),
        favorite_things: profile.favorite_things.clone(),
        dislikes: profile.dislikes.clone(),
        sizes: profile.sizes.as_ref().and_then(sizes_json),
    }
}

// ---------------------------------------------------------------------------
// App settings
// ---------------------------------------------------------------------------

/// Canonicalize and decode a raw settings row. Unknown privacy values read
/// as private.
pub fn settings_from_row(raw: &Value) -> Result<AppSettings, DataError> {
    let mut canonical = canonicalize(raw, SETTINGS_FIELDS);
    if let Some(privacy) = canonical.get_mut("privacy") {
        let normalized = PrivacyMode::from_str_value(privacy.as_str().unwrap_or_default());
        *privacy = Value::String(normalized.as_str().to_string());
    }
    serde_json::from_value(canonical).map_err(|e| DataError::SchemaMismatch {
        action: "load your settings",
        message: e.to_string(),
    })
}

pub fn settings_upsert_from(settings: &AppSettings) -> UpsertAppSettings {
    UpsertAppSettings {
        notifications: settings.notifications,
        privacy: settings.privacy.as_str().to_string(),
        user_name: settings.user_name.clone(),
        locale: settings.locale.clone(),
        currency: settings.currency.clone(),
    }
}
