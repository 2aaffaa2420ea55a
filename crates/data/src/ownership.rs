//! Lazy creation of the user's root account row before remote writes.

use little_things_core::error::DataError;
use little_things_db::remote::{RemoteError, RemoteErrorKind, RemoteStore};

const ACTION: &str = "set up your account";

/// Make sure a `users` row exists for `user_id`.
///
/// Check-then-insert is not atomic: a concurrent first write for the same
/// user can insert between our check and our insert. That surfaces as a
/// unique violation, which means the row exists and counts as success.
///
/// Unavailable and schema failures keep their kind so callers can apply
/// their usual fallback; any other failure is [`DataError::OwnershipSetupFailed`].
pub async fn ensure_user_exists(remote: &dyn RemoteStore, user_id: &str) -> Result<(), DataError> {
    match remote.user_exists(user_id).await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(e) => return Err(setup_failure(user_id, e)),
    }

    match remote.create_user(user_id, None).await {
        Ok(()) => {
            tracing::info!(user_id, "Created user row");
            Ok(())
        }
        Err(e) if e.is_unique_violation() => {
            tracing::warn!(user_id, "User row created concurrently, continuing");
            Ok(())
        }
        Err(e) => Err(setup_failure(user_id, e)),
    }
}

fn setup_failure(user_id: &str, err: RemoteError) -> DataError {
    tracing::error!(user_id, error = %err, "Account setup failed");
    match err.kind {
        RemoteErrorKind::Unavailable => DataError::RemoteUnavailable {
            action: ACTION,
            message: err.message,
        },
        RemoteErrorKind::SchemaMismatch => DataError::SchemaMismatch {
            action: ACTION,
            message: err.message,
        },
        RemoteErrorKind::NotFound
        | RemoteErrorKind::UniqueViolation
        | RemoteErrorKind::Rejected => DataError::OwnershipSetupFailed {
            user_id: user_id.to_string(),
            message: err.message,
        },
    }
}
