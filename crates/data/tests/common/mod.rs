//! Shared fixtures for data layer integration tests.
//!
//! [`FakeRemoteStore`] is an in-memory `RemoteStore` that records how often
//! each operation ran, can be told to fail an operation with a given error
//! kind, and can hold profile fetches in flight until released.
//! [`TestLocalStore`] wraps the in-memory local store with an access counter
//! and a failure switch.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Notify;

use little_things_core::error::DataError;
use little_things_core::types::DbId;
use little_things_data::config::DataConfig;
use little_things_data::local::{InMemoryLocalStore, LocalStore};
use little_things_data::DataService;
use little_things_db::models::app_settings::{RawSettingsRow, UpsertAppSettings};
use little_things_db::models::memory::{CreateMemoryRecord, MemoryRecord, UpdateMemoryRecord};
use little_things_db::models::partner_profile::{RawProfileRow, UpsertPartnerProfile};
use little_things_db::models::plan::{CreatePlanRecord, PlanRecord, UpdatePlanRecord};
use little_things_db::remote::{RemoteError, RemoteErrorKind, RemoteStore};

pub const USER: &str = "user-1";

// ---------------------------------------------------------------------------
// Remote fake
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    users: HashSet<String>,
    memories: Vec<MemoryRecord>,
    plans: Vec<PlanRecord>,
    profiles: HashMap<String, Value>,
    settings: HashMap<String, Value>,
    next_id: DbId,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeRemoteStore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, RemoteErrorKind>>,
    profile_gate: Mutex<Option<Arc<Notify>>>,
    users_look_missing: AtomicBool,
}

impl FakeRemoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every future call of `op` fail with `kind`.
    pub fn fail(&self, op: &'static str, kind: RemoteErrorKind) {
        self.failures.lock().unwrap().insert(op, kind);
    }

    pub fn heal(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Hold profile fetches until the returned gate is notified. Each held
    /// fetch returns the row as it was when the fetch started.
    pub fn hold_profile_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.profile_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn release_profile_fetches(&self) {
        *self.profile_gate.lock().unwrap() = None;
    }

    /// Make the existence check report every user as missing, as when a
    /// concurrent writer creates the row right after the check.
    pub fn report_users_missing(&self) {
        self.users_look_missing.store(true, Ordering::SeqCst);
    }

    pub fn add_user(&self, user_id: &str) {
        self.tables.lock().unwrap().users.insert(user_id.to_string());
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.tables.lock().unwrap().users.contains(user_id)
    }

    /// Store a raw profile row as-is, e.g. with legacy column spellings.
    pub fn put_profile_row(&self, user_id: &str, row: Value) {
        self.add_user(user_id);
        self.tables
            .lock()
            .unwrap()
            .profiles
            .insert(user_id.to_string(), row);
    }

    pub fn profile_row(&self, user_id: &str) -> Option<Value> {
        self.tables.lock().unwrap().profiles.get(user_id).cloned()
    }

    pub fn memory_count(&self) -> usize {
        self.tables.lock().unwrap().memories.len()
    }

    fn enter(&self, op: &'static str) -> Result<(), RemoteError> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        match self.failures.lock().unwrap().get(op) {
            Some(kind) => Err(RemoteError::new(*kind, format!("injected failure in {op}"))),
            None => Ok(()),
        }
    }

    fn owned(&self, user_id: &str) -> Result<(), RemoteError> {
        if self.has_user(user_id) {
            Ok(())
        } else {
            Err(RemoteError::new(
                RemoteErrorKind::Rejected,
                "violates foreign key constraint",
            ))
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, RemoteError> {
        self.enter("user_exists")?;
        if self.users_look_missing.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.has_user(user_id))
    }

    async fn create_user(&self, user_id: &str, _email: Option<&str>) -> Result<(), RemoteError> {
        self.enter("create_user")?;
        if !self.tables.lock().unwrap().users.insert(user_id.to_string()) {
            return Err(RemoteError::new(
                RemoteErrorKind::UniqueViolation,
                "duplicate key value violates unique constraint \"users_pkey\"",
            ));
        }
        Ok(())
    }

    async fn list_memories(&self, user_id: &str) -> Result<Vec<MemoryRecord>, RemoteError> {
        self.enter("list_memories")?;
        let mut rows: Vec<MemoryRecord> = self
            .tables
            .lock()
            .unwrap()
            .memories
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn create_memory(
        &self,
        user_id: &str,
        input: &CreateMemoryRecord,
    ) -> Result<MemoryRecord, RemoteError> {
        self.enter("create_memory")?;
        self.owned(user_id)?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = MemoryRecord {
            id: tables.next_id(),
            user_id: user_id.to_string(),
            title: input.title.clone(),
            body: input.body.clone(),
            tags: input.tags.clone(),
            importance: input.importance.clone(),
            date: input.date,
            created_at: now,
            updated_at: now,
        };
        tables.memories.push(row.clone());
        Ok(row)
    }

    async fn update_memory(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdateMemoryRecord,
    ) -> Result<Option<MemoryRecord>, RemoteError> {
        self.enter("update_memory")?;
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables
            .memories
            .iter_mut()
            .find(|m| m.id == id && m.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            row.title = title.clone();
        }
        if let Some(body) = &input.body {
            row.body = body.clone();
        }
        if let Some(tags) = &input.tags {
            row.tags = tags.clone();
        }
        if let Some(importance) = &input.importance {
            row.importance = importance.clone();
        }
        if let Some(date) = input.date {
            row.date = Some(date);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_memory(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError> {
        self.enter("delete_memory")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.memories.len();
        tables
            .memories
            .retain(|m| !(m.id == id && m.user_id == user_id));
        Ok(tables.memories.len() < before)
    }

    async fn fetch_partner_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<RawProfileRow>, RemoteError> {
        self.enter("fetch_partner_profile")?;
        // The row is read before the hold, as a slow response would be.
        let row = self.profile_row(user_id);
        let gate = self.profile_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(row)
    }

    async fn upsert_partner_profile(
        &self,
        user_id: &str,
        input: &UpsertPartnerProfile,
    ) -> Result<RawProfileRow, RemoteError> {
        self.enter("upsert_partner_profile")?;
        self.owned(user_id)?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let existing = tables
            .profiles
            .get(user_id)
            .map(|row| (row["id"].clone(), row["created_at"].clone()));
        let (id, created_at) = match existing {
            Some(kept) => kept,
            None => (json!(tables.next_id()), json!(now)),
        };
        let row = json!({
            "id": id,
            "user_id": user_id,
            "name": input.name,
            "favorite_color": input.favorite_color,
            "favorite_food": input.favorite_food,
            "favorite_hobbies": input.favorite_hobbies,
            "important_dates": input.important_dates,
            "notes": input.notes,
            "birthday": input.birthday,
            "anniversary": input.anniversary,
            "love_languages": input.love_languages,
            "favorite_things": input.favorite_things,
            "dislikes": input.dislikes,
            "sizes": input.sizes,
            "created_at": created_at,
            "updated_at": now,
        });
        tables.profiles.insert(user_id.to_string(), row.clone());
        Ok(row)
    }

    async fn list_plans(&self, user_id: &str) -> Result<Vec<PlanRecord>, RemoteError> {
        self.enter("list_plans")?;
        let mut rows: Vec<PlanRecord> = self
            .tables
            .lock()
            .unwrap()
            .plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn create_plan(
        &self,
        user_id: &str,
        input: &CreatePlanRecord,
    ) -> Result<PlanRecord, RemoteError> {
        self.enter("create_plan")?;
        self.owned(user_id)?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = PlanRecord {
            id: tables.next_id(),
            user_id: user_id.to_string(),
            title: input.title.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            priority: input.priority.clone(),
            completed: input.completed,
            scheduled_for: input.scheduled_for,
            created_at: now,
            updated_at: now,
        };
        tables.plans.push(row.clone());
        Ok(row)
    }

    async fn update_plan(
        &self,
        user_id: &str,
        id: DbId,
        input: &UpdatePlanRecord,
    ) -> Result<Option<PlanRecord>, RemoteError> {
        self.enter("update_plan")?;
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables
            .plans
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            row.title = title.clone();
        }
        if let Some(description) = &input.description {
            row.description = description.clone();
        }
        if let Some(category) = &input.category {
            row.category = category.clone();
        }
        if let Some(priority) = &input.priority {
            row.priority = priority.clone();
        }
        if let Some(completed) = input.completed {
            row.completed = completed;
        }
        if let Some(scheduled_for) = input.scheduled_for {
            row.scheduled_for = scheduled_for;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_plan(&self, user_id: &str, id: DbId) -> Result<bool, RemoteError> {
        self.enter("delete_plan")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.plans.len();
        tables.plans.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(tables.plans.len() < before)
    }

    async fn fetch_app_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<RawSettingsRow>, RemoteError> {
        self.enter("fetch_app_settings")?;
        Ok(self.tables.lock().unwrap().settings.get(user_id).cloned())
    }

    async fn upsert_app_settings(
        &self,
        user_id: &str,
        input: &UpsertAppSettings,
    ) -> Result<RawSettingsRow, RemoteError> {
        self.enter("upsert_app_settings")?;
        self.owned(user_id)?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let existing = tables
            .settings
            .get(user_id)
            .map(|row| (row["id"].clone(), row["created_at"].clone()));
        let (id, created_at) = match existing {
            Some(kept) => kept,
            None => (json!(tables.next_id()), json!(now)),
        };
        let row = json!({
            "id": id,
            "user_id": user_id,
            "notifications": input.notifications,
            "privacy": input.privacy,
            "user_name": input.user_name,
            "locale": input.locale,
            "currency": input.currency,
            "created_at": created_at,
            "updated_at": now,
        });
        tables.settings.insert(user_id.to_string(), row.clone());
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// Local store wrapper
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TestLocalStore {
    inner: InMemoryLocalStore,
    failing: AtomicBool,
    accesses: AtomicUsize,
}

impl TestLocalStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    /// Read without counting as an access.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).unwrap()
    }

    fn enter(&self) -> Result<(), DataError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataError::LocalStorage("injected local failure".into()));
        }
        Ok(())
    }
}

impl LocalStore for TestLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, DataError> {
        self.enter()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DataError> {
        self.enter()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DataError> {
        self.enter()?;
        self.inner.remove(key)
    }
}

// ---------------------------------------------------------------------------
// Service construction
// ---------------------------------------------------------------------------

pub struct Harness {
    pub service: Arc<DataService>,
    pub remote: Arc<FakeRemoteStore>,
    pub local: Arc<TestLocalStore>,
}

pub fn harness() -> Harness {
    little_things_data::telemetry::init_tracing(little_things_data::telemetry::DEFAULT_FILTER);
    let remote = FakeRemoteStore::new();
    let local = TestLocalStore::new();
    let service = DataService::new(remote.clone(), local.clone(), &DataConfig::default());
    Harness {
        service: Arc::new(service),
        remote,
        local,
    }
}

/// Yield to spawned tasks until `done` holds or the attempts run out.
pub async fn eventually(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if done() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    done()
}
