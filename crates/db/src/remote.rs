//! The remote store seam.
//!
//! [`RemoteStore`] is what the data layer talks to. [`PgRemoteStore`] backs
//! it with the repositories in this crate; tests substitute an in-memory
//! fake. Every sqlx failure is classified into a [`RemoteErrorKind`] here so
//! callers never match on driver errors.

use async_trait::async_trait;
use little_things_core::types::DbId;

use crate::models::app_settings::{RawSettingsRow, UpsertAppSettings};
use crate::models::memory::{CreateMemoryRecord, MemoryRecord, UpdateMemoryRecord};
use crate::models::partner_profile::{RawProfileRow, UpsertPartnerProfile};
use crate::models::plan::{CreatePlanRecord, PlanRecord, UpdatePlanRecord};
use crate::repositories::{AppSettingsRepo, MemoryRepo, PartnerProfileRepo, PlanRepo, UserRepo};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Coarse classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// A required row does not exist.
    NotFound,
    /// The schema does not have the expected table or column.
    SchemaMismatch,
    /// The store could not be reached (network, pool, TLS).
    Unavailable,
    /// A unique constraint rejected the write.
    UniqueViolation,
    /// Any other rejection by the store.
    Rejected,
}

/// A classified remote failure with the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.kind == RemoteErrorKind::UniqueViolation
    }
}

impl From<sqlx::Error> for RemoteError {
    fn from(err: sqlx::Error) -> Self {
        let kind = classify_sqlx_error(&err);
        Self::new(kind, err.to_string())
    }
}

/// Map a sqlx error onto a [`RemoteErrorKind`].
pub fn classify_sqlx_error(err: &sqlx::Error) -> RemoteErrorKind {
    match err {
        sqlx::Error::RowNotFound => RemoteErrorKind::NotFound,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // PostgreSQL unique constraint violation
            Some("23505") => RemoteErrorKind::UniqueViolation,
            // undefined_table, undefined_column
            Some("42P01") | Some("42703") => RemoteErrorKind::SchemaMismatch,
            // connection_exception class, admin/crash shutdown, cannot_connect_now
            Some(code) if code.starts_with("08") => RemoteErrorKind::Unavailable,
            Some("57P01") | Some("57P02") | Some("57P03") => RemoteErrorKind::Unavailable,
            _ => RemoteErrorKind::Rejected,
        },
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. } => RemoteErrorKind::SchemaMismatch,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RemoteErrorKind::Unavailable,
        _ => RemoteErrorKind::Rejected,
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// User-scoped access to the remote relational store.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn user_exists(&self, user_id: &str) -> Result<bool, RemoteError>;
    async fn create_user(&self, user_id: &str, email: Option<&str>) -> Result<(), RemoteError>;

    async fn list_memories(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RemoteError>;
    async fn create_memory(
        &self,
        user_id: &str,
        input: &CreateMemoryRecord,
    ) -> Result<MemoryRecord, RemoteError>;
    async fn update_memory(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdateMemoryRecord,
    ) -> Result<Option<MemoryRecord>, RemoteError>;
    async fn delete_memory(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError>;

    async fn fetch_partner_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<RawProfileRow>, RemoteError>;
    async fn upsert_partner_profile(
        &self,
        user_id: &str,
        input: &UpsertPartnerProfile,
    ) -> Result<RawProfileRow, RemoteError>;

    async fn list_plans(&self, user_id: &str) -> Result<Vec<PlanRecord>, RemoteError>;
    async fn create_plan(
        &self,
        user_id: &str,
        input: &CreatePlanRecord,
    ) -> Result<PlanRecord, RemoteError>;
    async fn update_plan(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdatePlanRecord,
    ) -> Result<Option<PlanRecord>, RemoteError>;
    async fn delete_plan(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError>;

    async fn fetch_app_settings(&self, user_id: &str)
        -> Result<Option<RawSettingsRow>, RemoteError>;
    async fn upsert_app_settings(
        &self,
        user_id: &str,
        input: &UpsertAppSettings,
    ) -> Result<RawSettingsRow, RemoteError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

/// [`RemoteStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgRemoteStore {
    pool: DbPool,
}

impl PgRemoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, RemoteError> {
        Ok(UserRepo::exists(&self.pool, user_id).await?)
    }

    async fn create_user(&self, user_id: &str, email: Option<&str>) -> Result<(), RemoteError> {
        UserRepo::create(&self.pool, user_id, email).await?;
        Ok(())
    }

    async fn list_memories(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RemoteError> {
        Ok(MemoryRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn create_memory(
        &self,
        user_id: &str,
        input: &CreateMemoryRecord,
    ) -> Result<MemoryRecord, RemoteError> {
        Ok(MemoryRepo::create(&self.pool, user_id, input).await?)
    }

    async fn update_memory(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdateMemoryRecord,
    ) -> Result<Option<MemoryRecord>, RemoteError> {
        Ok(MemoryRepo::update(&self.pool, user_id, id, input).await?)
    }

    async fn delete_memory(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError> {
        Ok(MemoryRepo::delete(&self.pool, user_id, id).await?)
    }

    async fn fetch_partner_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<RawProfileRow>, RemoteError> {
        Ok(PartnerProfileRepo::find_by_user(&self.pool, user_id).await?)
    }

    async fn upsert_partner_profile(
        &self,
        user_id: &str,
        input: &UpsertPartnerProfile,
    ) -> Result<RawProfileRow, RemoteError> {
        Ok(PartnerProfileRepo::upsert(&self.pool, user_id, input).await?)
    }

    async fn list_plans(&self, user_id: &str) -> Result<Vec<PlanRecord>, RemoteError> {
        Ok(PlanRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn create_plan(
        &self,
        user_id: &str,
        input: &CreatePlanRecord,
    ) -> Result<PlanRecord, RemoteError> {
        Ok(PlanRepo::create(&self.pool, user_id, input).await?)
    }

    async fn update_plan(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdatePlanRecord,
    ) -> Result<Option<PlanRecord>, RemoteError> {
        Ok(PlanRepo::update(&self.pool, user_id, id, input).await?)
    }

    async fn delete_plan(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError> {
        Ok(PlanRepo::delete(&self.pool, user_id, id).await?)
    }

    async fn fetch_app_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<RawSettingsRow>, RemoteError> {
        Ok(AppSettingsRepo::find_by_user(&self.pool, user_id).await?)
    }

    async fn upsert_app_settings(
        &self,
        user_id: &str,
        input: &UpsertAppSettings,
    ) -> Result<RawSettingsRow, RemoteError> {
        Ok(AppSettingsRepo::upsert(&self.pool, user_id, input).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        assert_eq!(
            classify_sqlx_error(&sqlx::Error::RowNotFound),
            RemoteErrorKind::NotFound
        );
    }

    #[test]
    fn pool_failures_are_unavailable() {
        assert_eq!(
            classify_sqlx_error(&sqlx::Error::PoolTimedOut),
            RemoteErrorKind::Unavailable
        );
        assert_eq!(
            classify_sqlx_error(&sqlx::Error::PoolClosed),
            RemoteErrorKind::Unavailable
        );
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            classify_sqlx_error(&sqlx::Error::Io(io)),
            RemoteErrorKind::Unavailable
        );
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let err = sqlx::Error::ColumnNotFound("favorite_color".into());
        assert_eq!(classify_sqlx_error(&err), RemoteErrorKind::SchemaMismatch);
    }

    #[test]
    fn conversion_keeps_message() {
        let err: RemoteError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind, RemoteErrorKind::Unavailable);
        assert!(!err.message.is_empty());
    }
}
