use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use little_things_core::error::DataError;
use little_things_core::profile::PartnerProfile;
use little_things_core::reconcile::{self, ProfileResolution};
use little_things_core::served::Served;
use little_things_core::types::{cache_key, user_key};
use little_things_db::remote::RemoteStore;
use tokio::sync::Mutex;

use super::{fallback_record, new_local_id, record_or_none, DataService};
use crate::error::remote_failure;
use crate::local::{write_json, LocalStore, StorageKey};
use crate::mapping::{profile_from_row, profile_upsert_from};
use crate::ownership::ensure_user_exists;

const LOAD: &str = "load your partner profile";
const SAVE: &str = "save your partner profile";

/// Orders remote profile writes.
///
/// Each user save bumps the user's generation while holding the lock for
/// the whole write. A background merge write records the generation its
/// fetch started at and is dropped if a save has happened since.
#[derive(Default)]
pub(super) struct ProfileWrites {
    generations: Mutex<HashMap<String, u64>>,
}

impl ProfileWrites {
    async fn current(&self, user_id: &str) -> u64 {
        self.generations.lock().await.get(user_id).copied().unwrap_or(0)
    }
}

impl DataService {
    /// The partner profile after reconciliation.
    pub async fn get_partner_profile(
        &self,
        user_id: Option<&str>,
    ) -> Result<Option<PartnerProfile>, DataError> {
        Ok(self.resolve_partner_profile(user_id).await?.into_profile())
    }

    /// The cached outcome of the last profile fetch for this user, fetching
    /// and reconciling on a miss.
    pub async fn resolve_partner_profile(
        &self,
        user_id: Option<&str>,
    ) -> Result<ProfileResolution, DataError> {
        let remote = Arc::clone(&self.remote);
        let local = Arc::clone(&self.local);
        let writes = Arc::clone(&self.profile_writes);
        let user = user_key(user_id).map(str::to_string);
        self.profiles
            .get_or_fetch(&cache_key(user_id), move || {
                fetch_profile(remote, local, writes, user)
            })
            .await
    }

    /// Store the profile. The cached entry for this user is dropped first.
    ///
    /// For a signed-in user a remote failure saves to local storage instead
    /// and the result is [`Served::Degraded`].
    pub async fn save_partner_profile(
        &self,
        user_id: Option<&str>,
        profile: PartnerProfile,
    ) -> Result<Served<PartnerProfile>, DataError> {
        self.profiles.invalidate(&cache_key(user_id)).await;

        let Some(user_id) = user_key(user_id) else {
            return Ok(Served::Normal(save_locally(&*self.local, profile)?));
        };

        let mut generations = self.profile_writes.generations.lock().await;
        *generations.entry(user_id.to_string()).or_insert(0) += 1;
        let result = save_remotely(&*self.remote, user_id, &profile).await;
        drop(generations);

        match result {
            Ok(saved) => {
                tracing::info!(user_id, "Partner profile saved");
                Ok(Served::Normal(saved))
            }
            Err(cause) if cause.is_remote_failure() => {
                tracing::warn!(user_id, error = %cause, "Saving partner profile locally instead");
                let value = save_locally(&*self.local, profile)?;
                Ok(Served::Degraded { value, cause })
            }
            Err(e) => Err(e),
        }
    }
}

async fn save_remotely(
    remote: &dyn RemoteStore,
    user_id: &str,
    profile: &PartnerProfile,
) -> Result<PartnerProfile, DataError> {
    ensure_user_exists(remote, user_id).await?;
    let raw = remote
        .upsert_partner_profile(user_id, &profile_upsert_from(profile))
        .await
        .map_err(|e| remote_failure(SAVE, e))?;
    profile_from_row(&raw)
}

/// Write the profile to local storage, keeping the identity and creation
/// time of the copy already there.
fn save_locally(
    local: &dyn LocalStore,
    mut profile: PartnerProfile,
) -> Result<PartnerProfile, DataError> {
    let existing: Option<PartnerProfile> = record_or_none(local, StorageKey::PartnerProfile);
    let now = Utc::now();

    if profile.id.is_none() {
        profile.id = existing
            .as_ref()
            .and_then(|p| p.id.clone())
            .or_else(|| Some(new_local_id()));
    }
    if profile.created_at.is_none() {
        profile.created_at = existing.as_ref().and_then(|p| p.created_at).or(Some(now));
    }
    profile.updated_at = Some(now);

    write_json(local, StorageKey::PartnerProfile, &profile)?;
    Ok(profile)
}

async fn fetch_profile(
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    writes: Arc<ProfileWrites>,
    user_id: Option<String>,
) -> Result<ProfileResolution, DataError> {
    let Some(user_id) = user_id else {
        let profile = record_or_none(&*local, StorageKey::PartnerProfile);
        return Ok(ProfileResolution::NoMergeNeeded(profile));
    };
    let generation = writes.current(&user_id).await;

    let remote_result = match remote.fetch_partner_profile(&user_id).await {
        Ok(Some(raw)) => profile_from_row(&raw).map(Some),
        Ok(None) => Ok(None),
        Err(e) => Err(remote_failure(LOAD, e)),
    };

    let local_copy = match &remote_result {
        Ok(_) => record_or_none(&*local, StorageKey::PartnerProfile),
        Err(cause) => {
            tracing::warn!(user_id = %user_id, error = %cause, "Remote profile fetch failed, using local copy");
            fallback_record(&*local, StorageKey::PartnerProfile, cause)?
        }
    };

    let resolution = reconcile::resolve(remote_result, local_copy);
    if let ProfileResolution::Merged(merged) = &resolution {
        persist_merged(
            Arc::clone(&remote),
            writes,
            generation,
            user_id.clone(),
            merged.clone(),
        );
    }
    tracing::debug!(user_id = %user_id, state = resolution.state_name(), "Partner profile resolved");
    Ok(resolution)
}

/// Write a merged profile back to the remote store in the background.
/// Skipped when the user saved after `generation` was read. Failures are
/// logged and otherwise ignored.
fn persist_merged(
    remote: Arc<dyn RemoteStore>,
    writes: Arc<ProfileWrites>,
    generation: u64,
    user_id: String,
    profile: PartnerProfile,
) {
    tokio::spawn(async move {
        let generations = writes.generations.lock().await;
        if generations.get(&user_id).copied().unwrap_or(0) != generation {
            tracing::debug!(user_id = %user_id, "Profile saved since merge, skipping merged write");
            return;
        }
        let result = save_remotely(&*remote, &user_id, &profile).await;
        drop(generations);

        match result {
            Ok(_) => tracing::info!(user_id = %user_id, "Merged partner profile persisted"),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to persist merged partner profile")
            }
        }
    });
}
