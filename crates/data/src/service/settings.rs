use std::sync::Arc;

use chrono::Utc;
use little_things_core::error::DataError;
use little_things_core::served::Served;
use little_things_core::settings::AppSettings;
use little_things_core::types::{cache_key, user_key};
use little_things_db::remote::RemoteStore;

use super::{fallback_record, new_local_id, record_or_none, DataService};
use crate::error::remote_failure;
use crate::local::{write_json, LocalStore, StorageKey};
use crate::mapping::{settings_from_row, settings_upsert_from};
use crate::ownership::ensure_user_exists;

const LOAD: &str = "load your settings";
const SAVE: &str = "save your settings";

impl DataService {
    /// The user's settings, if any were saved.
    ///
    /// A signed-in user with no remote settings row is served the local
    /// copy. A remote failure serves the local copy as
    /// [`Served::Degraded`].
    pub async fn get_app_settings(
        &self,
        user_id: Option<&str>,
    ) -> Result<Served<Option<AppSettings>>, DataError> {
        let remote = Arc::clone(&self.remote);
        let local = Arc::clone(&self.local);
        let user = user_key(user_id).map(str::to_string);
        self.settings
            .get_or_fetch(&cache_key(user_id), move || {
                fetch_settings(remote, local, user)
            })
            .await
    }

    /// Store the settings. The cached entry for this user is dropped first;
    /// remote failures fall back to local storage.
    pub async fn save_app_settings(
        &self,
        user_id: Option<&str>,
        settings: AppSettings,
    ) -> Result<Served<AppSettings>, DataError> {
        self.settings.invalidate(&cache_key(user_id)).await;

        let Some(user_id) = user_key(user_id) else {
            return Ok(Served::Normal(save_locally(&*self.local, settings)?));
        };

        match save_remotely(&*self.remote, user_id, &settings).await {
            Ok(saved) => {
                tracing::info!(user_id, "Settings saved");
                Ok(Served::Normal(saved))
            }
            Err(cause) if cause.is_remote_failure() => {
                tracing::warn!(user_id, error = %cause, "Saving settings locally instead");
                let value = save_locally(&*self.local, settings)?;
                Ok(Served::Degraded { value, cause })
            }
            Err(e) => Err(e),
        }
    }
}

async fn save_remotely(
    remote: &dyn RemoteStore,
    user_id: &str,
    settings: &AppSettings,
) -> Result<AppSettings, DataError> {
    ensure_user_exists(remote, user_id).await?;
    let raw = remote
        .upsert_app_settings(user_id, &settings_upsert_from(settings))
        .await
        .map_err(|e| remote_failure(SAVE, e))?;
    settings_from_row(&raw)
}

fn save_locally(local: &dyn LocalStore, mut settings: AppSettings) -> Result<AppSettings, DataError> {
    let existing: Option<AppSettings> = record_or_none(local, StorageKey::AppSettings);
    let now = Utc::now();

    if settings.id.is_none() {
        settings.id = existing
            .as_ref()
            .and_then(|s| s.id.clone())
            .or_else(|| Some(new_local_id()));
    }
    if settings.created_at.is_none() {
        settings.created_at = existing.as_ref().and_then(|s| s.created_at).or(Some(now));
    }
    settings.updated_at = Some(now);

    write_json(local, StorageKey::AppSettings, &settings)?;
    Ok(settings)
}

async fn fetch_settings(
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    user_id: Option<String>,
) -> Result<Served<Option<AppSettings>>, DataError> {
    let Some(user_id) = user_id else {
        return Ok(Served::Normal(record_or_none(&*local, StorageKey::AppSettings)));
    };

    let cause = match remote.fetch_app_settings(&user_id).await {
        Ok(Some(raw)) => match settings_from_row(&raw) {
            Ok(settings) => return Ok(Served::Normal(Some(settings))),
            Err(cause) => cause,
        },
        Ok(None) => {
            tracing::debug!(user_id = %user_id, "No remote settings, using local copy");
            return Ok(Served::Normal(record_or_none(&*local, StorageKey::AppSettings)));
        }
        Err(e) => remote_failure(LOAD, e),
    };

    tracing::warn!(user_id = %user_id, error = %cause, "Remote settings fetch failed, using local copy");
    let value = fallback_record(&*local, StorageKey::AppSettings, &cause)?;
    Ok(Served::Degraded { value, cause })
}
