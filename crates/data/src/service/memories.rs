use chrono::Utc;
use little_things_core::error::DataError;
use little_things_core::memory::{summarize, Memory, MemorySummary, NewMemory, UpdateMemory};
use little_things_core::suggestion::{eligibility, SuggestionEligibility};
use little_things_core::types::{user_key, DbId};

use super::{list_or_empty, load_list, new_local_id, surfaced, DataService};
use crate::local::{write_json, StorageKey};
use crate::mapping::{memory_from_row, memory_insert_from, memory_update_from};
use crate::ownership::ensure_user_exists;

impl DataService {
    /// The user's memories, newest first.
    ///
    /// Without a user this reads local storage and never fails. Remote read
    /// failures are returned.
    pub async fn get_memories(&self, user_id: Option<&str>) -> Result<Vec<Memory>, DataError> {
        let Some(user_id) = user_key(user_id) else {
            return Ok(list_or_empty(&*self.local, StorageKey::Memories));
        };
        let rows = self
            .remote
            .list_memories(user_id)
            .await
            .map_err(|e| surfaced("load your memories", user_id, e))?;
        Ok(rows.iter().map(memory_from_row).collect())
    }

    /// Validate and store a new memory.
    pub async fn save_memory(
        &self,
        user_id: Option<&str>,
        input: NewMemory,
    ) -> Result<Memory, DataError> {
        input.check()?;

        let Some(user_id) = user_key(user_id) else {
            let memory = input.into_memory(new_local_id(), Utc::now());
            let mut memories: Vec<Memory> = load_list(&*self.local, StorageKey::Memories)?;
            memories.insert(0, memory.clone());
            write_json(&*self.local, StorageKey::Memories, &memories)?;
            tracing::debug!(memory_id = %memory.id, "Memory saved locally");
            return Ok(memory);
        };

        ensure_user_exists(&*self.remote, user_id).await?;
        let row = self
            .remote
            .create_memory(user_id, &memory_insert_from(&input))
            .await
            .map_err(|e| surfaced("save your memory", user_id, e))?;
        tracing::info!(user_id, memory_id = row.id, "Memory saved");
        Ok(memory_from_row(&row))
    }

    /// Apply a partial update. `None` if the user has no memory with `id`.
    pub async fn update_memory(
        &self,
        user_id: Option<&str>,
        id: &str,
        update: UpdateMemory,
    ) -> Result<Option<Memory>, DataError> {
        update.check()?;

        let Some(user_id) = user_key(user_id) else {
            let mut memories: Vec<Memory> = load_list(&*self.local, StorageKey::Memories)?;
            let Some(memory) = memories.iter_mut().find(|m| m.id == id) else {
                return Ok(None);
            };
            update.apply_to(memory, Utc::now());
            let updated = memory.clone();
            write_json(&*self.local, StorageKey::Memories, &memories)?;
            return Ok(Some(updated));
        };

        let Some(remote_id) = parse_remote_id(id) else {
            return Ok(None);
        };
        ensure_user_exists(&*self.remote, user_id).await?;
        let row = self
            .remote
            .update_memory(user_id, remote_id, &memory_update_from(&update))
            .await
            .map_err(|e| surfaced("update your memory", user_id, e))?;
        Ok(row.as_ref().map(memory_from_row))
    }

    /// Delete a memory. `false` if the user has no memory with `id`.
    pub async fn delete_memory(&self, user_id: Option<&str>, id: &str) -> Result<bool, DataError> {
        let Some(user_id) = user_key(user_id) else {
            let mut memories: Vec<Memory> = load_list(&*self.local, StorageKey::Memories)?;
            let before = memories.len();
            memories.retain(|m| m.id != id);
            if memories.len() == before {
                return Ok(false);
            }
            write_json(&*self.local, StorageKey::Memories, &memories)?;
            return Ok(true);
        };

        let Some(remote_id) = parse_remote_id(id) else {
            return Ok(false);
        };
        ensure_user_exists(&*self.remote, user_id).await?;
        self.remote
            .delete_memory(user_id, remote_id)
            .await
            .map_err(|e| surfaced("delete your memory", user_id, e))
    }

    pub async fn memory_summary(&self, user_id: Option<&str>) -> Result<MemorySummary, DataError> {
        Ok(summarize(&self.get_memories(user_id).await?))
    }

    /// Whether the user has enough memories for plan suggestions.
    pub async fn suggestion_eligibility(
        &self,
        user_id: Option<&str>,
    ) -> Result<SuggestionEligibility, DataError> {
        Ok(eligibility(self.get_memories(user_id).await?.len()))
    }
}

/// Remote ids are integers; anything else cannot name a remote record.
pub(super) fn parse_remote_id(id: &str) -> Option<DbId> {
    let parsed: Option<DbId> = id.trim().parse().ok();
    if parsed.is_none() {
        tracing::debug!(id, "Not a remote record id");
    }
    parsed
}
