//! The storage router.
//!
//! [`DataService`] owns the remote store, the local store, and the two
//! request caches (profile, settings). Every accessor takes an optional user
//! identity: absent or blank routes to local storage, anything else to the
//! remote store.
//!
//! Remote failures are handled per entity:
//!
//! - memories and plans: the failure is returned to the caller and nothing
//!   is written locally, so record ids stay authoritative remotely;
//! - profile and settings: the write or read falls back to local storage and
//!   the result is marked [`Served::Degraded`](little_things_core::served::Served).

mod memories;
mod plans;
mod profile;
mod settings;

use std::sync::Arc;

use little_things_core::error::DataError;
use little_things_core::reconcile::ProfileResolution;
use little_things_core::served::Served;
use little_things_core::settings::AppSettings;
use little_things_db::remote::{PgRemoteStore, RemoteError, RemoteStore};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::cache::RequestCache;
use crate::config::DataConfig;
use crate::error::{remote_failure, SetupError};
use crate::local::{read_json, FileLocalStore, LocalStore, StorageKey};

use self::profile::ProfileWrites;

/// Routes data access between local and remote storage.
pub struct DataService {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    profiles: RequestCache<ProfileResolution>,
    profile_writes: Arc<ProfileWrites>,
    settings: RequestCache<Served<Option<AppSettings>>>,
}

impl DataService {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        config: &DataConfig,
    ) -> Self {
        Self {
            remote,
            local,
            profiles: RequestCache::new(config.cache_ttl),
            profile_writes: Arc::new(ProfileWrites::default()),
            settings: RequestCache::new(config.cache_ttl),
        }
    }

    /// Build a service backed by PostgreSQL and the file-backed local store,
    /// applying pending migrations.
    pub async fn connect(config: &DataConfig) -> Result<Self, SetupError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(SetupError::MissingDatabaseUrl)?;
        let pool = little_things_db::create_pool(url, config.max_connections).await?;
        little_things_db::run_migrations(&pool).await?;
        tracing::info!(
            storage_dir = %config.storage_dir.display(),
            "Connected to remote store"
        );

        let remote = Arc::new(PgRemoteStore::new(pool));
        let local = Arc::new(FileLocalStore::new(&config.storage_dir));
        Ok(Self::new(remote, local, config))
    }

    /// Start from empty caches.
    pub async fn init(&self) {
        self.clear_caches().await;
        tracing::debug!("Data service initialized");
    }

    pub async fn clear_caches(&self) {
        self.profiles.clear().await;
        self.settings.clear().await;
    }

    pub fn profile_cache(&self) -> &RequestCache<ProfileResolution> {
        &self.profiles
    }

    pub fn settings_cache(&self) -> &RequestCache<Served<Option<AppSettings>>> {
        &self.settings
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn new_local_id() -> String {
    Uuid::now_v7().to_string()
}

/// Log and classify a remote failure that is surfaced to the caller.
fn surfaced(action: &'static str, user_id: &str, err: RemoteError) -> DataError {
    tracing::error!(user_id, error = %err, "Remote store failed to {action}");
    remote_failure(action, err)
}

/// Read a local list for writing. Storage failures propagate.
fn load_list<T: DeserializeOwned>(
    local: &dyn LocalStore,
    key: StorageKey,
) -> Result<Vec<T>, DataError> {
    Ok(read_json(local, key)?.unwrap_or_default())
}

/// Read a local list for display. Storage failures read as empty.
fn list_or_empty<T: DeserializeOwned>(local: &dyn LocalStore, key: StorageKey) -> Vec<T> {
    load_list(local, key).unwrap_or_else(|e| {
        tracing::warn!(key = key.as_str(), error = %e, "Local read failed, returning empty list");
        Vec::new()
    })
}

/// Read a local single record. Storage failures read as absent.
fn record_or_none<T: DeserializeOwned>(local: &dyn LocalStore, key: StorageKey) -> Option<T> {
    read_json(local, key).unwrap_or_else(|e| {
        tracing::warn!(key = key.as_str(), error = %e, "Local read failed, treating as absent");
        None
    })
}

/// Read the local copy served after a remote failure. If local storage also
/// fails, the remote failure is returned.
fn fallback_record<T: DeserializeOwned>(
    local: &dyn LocalStore,
    key: StorageKey,
    cause: &DataError,
) -> Result<Option<T>, DataError> {
    read_json(local, key).map_err(|e| {
        tracing::error!(key = key.as_str(), error = %e, "Local fallback unavailable");
        cause.clone()
    })
}
