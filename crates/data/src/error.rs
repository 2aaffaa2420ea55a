//! Conversion of remote failures into [`DataError`], plus setup errors for
//! composing a service from configuration.

use little_things_core::error::DataError;
use little_things_db::remote::{RemoteError, RemoteErrorKind};

/// Classify a remote failure for the operation described by `action`
/// (e.g. "save your memory").
pub fn remote_failure(action: &'static str, err: RemoteError) -> DataError {
    match err.kind {
        RemoteErrorKind::SchemaMismatch => DataError::SchemaMismatch {
            action,
            message: err.message,
        },
        RemoteErrorKind::NotFound => DataError::RecordNotFound { entity: "record" },
        RemoteErrorKind::Unavailable
        | RemoteErrorKind::UniqueViolation
        | RemoteErrorKind::Rejected => DataError::RemoteUnavailable {
            action,
            message: err.message,
        },
    }
}

/// Errors building a [`crate::DataService`] from a [`crate::config::DataConfig`].
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
