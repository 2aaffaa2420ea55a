//! Error taxonomy shared by every storage path.
//!
//! Each variant carries an internal message (the `Display` output, meant for
//! logs) and exposes a separate user-facing message via
//! [`DataError::user_message`].

/// Stable machine-readable error codes.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const PERMISSION_ERROR: &str = "PERMISSION_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Errors surfaced by the data layer.
///
/// `Clone` because a single in-flight fetch hands its outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// Input rejected before any storage access.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        user_message: String,
    },

    /// Network or server failure talking to the remote store.
    #[error("Remote store unavailable while trying to {action}: {message}")]
    RemoteUnavailable {
        action: &'static str,
        message: String,
    },

    /// The remote table or column is absent. Handled like `RemoteUnavailable`.
    #[error("Remote schema mismatch while trying to {action}: {message}")]
    SchemaMismatch {
        action: &'static str,
        message: String,
    },

    /// A remote query expected a row and got none. Single-record-per-user
    /// reads never produce this; an absent profile or settings row is `Ok(None)`.
    #[error("{entity} not found")]
    RecordNotFound { entity: &'static str },

    /// Lazily creating the user's root account row failed.
    #[error("Account setup failed for user {user_id}: {message}")]
    OwnershipSetupFailed { user_id: String, message: String },

    /// Local key-value storage could not be read or written.
    #[error("Local storage error: {0}")]
    LocalStorage(String),
}

impl DataError {
    /// Build a validation error with distinct internal and user-facing text.
    pub fn validation(message: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            user_message: user_message.into(),
        }
    }

    /// Text suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { user_message, .. } => user_message.clone(),
            Self::RemoteUnavailable { action, .. } | Self::SchemaMismatch { action, .. } => {
                format!("Unable to {action}. Please try again.")
            }
            Self::RecordNotFound { entity } => {
                format!("That {entity} could not be found. It may have been deleted.")
            }
            Self::OwnershipSetupFailed { .. } => {
                "Unable to set up your account. Please try signing in again.".to_string()
            }
            Self::LocalStorage(_) => {
                "Unable to save your changes on this device. Please try again.".to_string()
            }
        }
    }

    /// Stable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => codes::VALIDATION_ERROR,
            Self::RemoteUnavailable { .. } => codes::NETWORK_ERROR,
            Self::SchemaMismatch { .. } => codes::DATABASE_ERROR,
            Self::RecordNotFound { .. } => codes::NOT_FOUND,
            Self::OwnershipSetupFailed { .. } => codes::PERMISSION_ERROR,
            Self::LocalStorage(_) => codes::STORAGE_ERROR,
        }
    }

    /// Whether retrying the same operation can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation { .. } | Self::RecordNotFound { .. })
    }

    /// True for failures that route profile/settings writes to local storage.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable { .. } | Self::SchemaMismatch { .. }
        )
    }
}

impl From<validator::ValidationErrors> for DataError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut internal = Vec::new();
        let mut user_facing = None;
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                internal.push(format!("{field}: {}", err.code));
                if user_facing.is_none() {
                    user_facing = err.message.as_ref().map(|m| m.to_string());
                }
            }
        }
        internal.sort();
        Self::Validation {
            message: internal.join(", "),
            user_message: user_facing
                .unwrap_or_else(|| "Please check the highlighted fields.".to_string()),
        }
    }
}
