//! Per-user application settings. One record per user, like the profile,
//! but never reconciled.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// `locale`/`currency` value meaning "detect from the device".
pub const AUTO: &str = "auto";

fn auto() -> String {
    AUTO.to_string()
}

fn enabled() -> bool {
    true
}

/// Who can see the user's memories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    Public,
    #[default]
    Private,
}

impl PrivacyMode {
    /// Database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse the database value. Unknown values read as `Private`.
    pub fn from_str_value(value: &str) -> Self {
        match value {
            "public" => Self::Public,
            _ => Self::Private,
        }
    }
}

/// Application settings for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "enabled")]
    pub notifications: bool,
    #[serde(default)]
    pub privacy: PrivacyMode,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default = "auto")]
    pub locale: String,
    #[serde(default = "auto")]
    pub currency: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            id: None,
            notifications: true,
            privacy: PrivacyMode::default(),
            user_name: None,
            locale: auto(),
            currency: auto(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_auto_and_private() {
        let settings = AppSettings::default();
        assert!(settings.notifications);
        assert_eq!(settings.privacy, PrivacyMode::Private);
        assert_eq!(settings.locale, AUTO);
        assert_eq!(settings.currency, AUTO);
    }

    #[test]
    fn sparse_json_fills_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"privacy":"public"}"#).unwrap();
        assert_eq!(settings.privacy, PrivacyMode::Public);
        assert!(settings.notifications);
        assert_eq!(settings.currency, AUTO);
    }

    #[test]
    fn privacy_parses_database_values() {
        assert_eq!(PrivacyMode::from_str_value("public"), PrivacyMode::Public);
        assert_eq!(PrivacyMode::from_str_value("weird"), PrivacyMode::Private);
        assert_eq!(PrivacyMode::Public.as_str(), "public");
    }
}
