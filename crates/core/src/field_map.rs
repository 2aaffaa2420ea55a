//! Canonical field mapping for single-record-per-user entities.
//!
//! Stored profiles and settings have been written under several spellings
//! over time (`favorite_color`, `favoriteColor`, `favouriteColor`, ...). The
//! tables below list, per canonical field, the source keys accepted in
//! priority order. [`canonicalize`] is applied once at each storage boundary
//! so everything past it only sees the canonical shape.
//!
//! Some early rows predate a column and kept its content under a related
//! field. Those keys are listed as fallbacks and are only consulted when the
//! row has none of the field's own keys at all; an empty value under an own
//! key never pulls data across from another field.

use serde_json::{Map, Value};

/// Bump when a table below changes meaning.
pub const FIELD_MAP_VERSION: u32 = 2;

/// How a source value is coerced into the canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// Copy the JSON value unchanged.
    AsIs,
    /// Numbers become strings (integer primary keys read as text ids).
    Text,
}

/// One canonical field and the source keys it may be read from.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub canonical: &'static str,
    /// Spellings of this field, in priority order.
    pub sources: &'static [&'static str],
    /// Keys of other fields read only when no `sources` key exists.
    pub fallbacks: &'static [&'static str],
    pub coerce: Coerce,
}

const fn field(
    canonical: &'static str,
    sources: &'static [&'static str],
    coerce: Coerce,
) -> FieldMapping {
    legacy_field(canonical, sources, &[], coerce)
}

const fn legacy_field(
    canonical: &'static str,
    sources: &'static [&'static str],
    fallbacks: &'static [&'static str],
    coerce: Coerce,
) -> FieldMapping {
    FieldMapping {
        canonical,
        sources,
        fallbacks,
        coerce,
    }
}

/// Partner profile fields, version 2.
pub const PROFILE_FIELDS: &[FieldMapping] = &[
    field("id", &["id"], Coerce::Text),
    field("name", &["name"], Coerce::AsIs),
    field(
        "favorite_color",
        &["favorite_color", "favoriteColor", "favouriteColor", "favourite_color"],
        Coerce::AsIs,
    ),
    field(
        "favorite_food",
        &["favorite_food", "favoriteFood", "favouriteFood", "favourite_food"],
        Coerce::AsIs,
    ),
    legacy_field(
        "favorite_hobbies",
        &["favorite_hobbies", "favoriteHobbies", "favourite_hobbies"],
        &["love_languages"],
        Coerce::AsIs,
    ),
    field(
        "important_dates",
        &["important_dates", "importantDates"],
        Coerce::AsIs,
    ),
    legacy_field(
        "notes",
        &["notes"],
        &["favorite_things", "favourite_things", "favoriteThings"],
        Coerce::AsIs,
    ),
    field("birthday", &["birthday"], Coerce::AsIs),
    field("anniversary", &["anniversary"], Coerce::AsIs),
    field(
        "love_languages",
        &["love_languages", "loveLanguages"],
        Coerce::AsIs,
    ),
    field(
        "favorite_things",
        &["favorite_things", "favourite_things", "favoriteThings"],
        Coerce::AsIs,
    ),
    field("dislikes", &["dislikes"], Coerce::AsIs),
    field("sizes", &["sizes"], Coerce::AsIs),
    field("created_at", &["created_at", "createdAt"], Coerce::AsIs),
    field("updated_at", &["updated_at", "updatedAt"], Coerce::AsIs),
];

/// App settings fields, unchanged since version 1.
pub const SETTINGS_FIELDS: &[FieldMapping] = &[
    field("id", &["id"], Coerce::Text),
    field(
        "notifications",
        &["notifications", "email_notifications", "daily_prompts"],
        Coerce::AsIs,
    ),
    field("privacy", &["privacy"], Coerce::AsIs),
    field("user_name", &["user_name", "userName"], Coerce::AsIs),
    field("locale", &["locale"], Coerce::AsIs),
    field("currency", &["currency"], Coerce::AsIs),
    field("created_at", &["created_at", "createdAt"], Coerce::AsIs),
    field("updated_at", &["updated_at", "updatedAt"], Coerce::AsIs),
];

/// A source value counts as present unless it is null or an empty string.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn coerce(value: &Value, how: Coerce) -> Value {
    match (how, value) {
        (Coerce::Text, Value::Number(n)) => Value::String(n.to_string()),
        _ => value.clone(),
    }
}

/// Rewrite `raw` into canonical keys using `mappings`.
///
/// Keys not named by any mapping are dropped. Canonical fields with no
/// present source are omitted so that serde defaults apply downstream.
/// Non-object input yields an empty object.
pub fn canonicalize(raw: &Value, mappings: &[FieldMapping]) -> Value {
    let mut out = Map::new();
    let Some(obj) = raw.as_object() else {
        return Value::Object(out);
    };

    for mapping in mappings {
        let has_own_key = mapping.sources.iter().any(|key| obj.contains_key(*key));
        let keys = if has_own_key {
            mapping.sources
        } else {
            mapping.fallbacks
        };
        let found = keys
            .iter()
            .filter_map(|key| obj.get(*key))
            .find(|value| is_present(value));
        if let Some(value) = found {
            out.insert(mapping.canonical.to_string(), coerce(value, mapping.coerce));
        }
    }

    Value::Object(out)
}
