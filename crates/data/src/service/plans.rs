use chrono::Utc;
use little_things_core::error::DataError;
use little_things_core::plan::{NewPlan, Plan, PlanSuggestion, UpdatePlan};
use little_things_core::types::{user_key, Timestamp};

use super::memories::parse_remote_id;
use super::{list_or_empty, load_list, new_local_id, surfaced, DataService};
use crate::local::{write_json, StorageKey};
use crate::mapping::{plan_from_row, plan_insert_from, plan_update_from};
use crate::ownership::ensure_user_exists;

impl DataService {
    /// The user's plans, newest first. Remote read failures are returned.
    pub async fn get_plans(&self, user_id: Option<&str>) -> Result<Vec<Plan>, DataError> {
        let Some(user_id) = user_key(user_id) else {
            return Ok(list_or_empty(&*self.local, StorageKey::Plans));
        };
        let rows = self
            .remote
            .list_plans(user_id)
            .await
            .map_err(|e| surfaced("load your plans", user_id, e))?;
        Ok(rows.iter().map(plan_from_row).collect())
    }

    /// Validate and store a new plan. A remote failure is returned and
    /// nothing is written locally.
    pub async fn save_plan(&self, user_id: Option<&str>, input: NewPlan) -> Result<Plan, DataError> {
        input.check()?;
        let now = Utc::now();

        let Some(user_id) = user_key(user_id) else {
            let plan = input.into_plan(new_local_id(), now);
            let mut plans: Vec<Plan> = load_list(&*self.local, StorageKey::Plans)?;
            plans.insert(0, plan.clone());
            write_json(&*self.local, StorageKey::Plans, &plans)?;
            tracing::debug!(plan_id = %plan.id, "Plan saved locally");
            return Ok(plan);
        };

        ensure_user_exists(&*self.remote, user_id).await?;
        let row = self
            .remote
            .create_plan(user_id, &plan_insert_from(&input, now))
            .await
            .map_err(|e| surfaced("save your plan", user_id, e))?;
        tracing::info!(user_id, plan_id = row.id, "Plan saved");
        Ok(plan_from_row(&row))
    }

    /// Apply a partial update. `None` if the user has no plan with `id`.
    pub async fn update_plan(
        &self,
        user_id: Option<&str>,
        id: &str,
        update: UpdatePlan,
    ) -> Result<Option<Plan>, DataError> {
        update.check()?;

        let Some(user_id) = user_key(user_id) else {
            let mut plans: Vec<Plan> = load_list(&*self.local, StorageKey::Plans)?;
            let Some(plan) = plans.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            update.apply_to(plan, Utc::now());
            let updated = plan.clone();
            write_json(&*self.local, StorageKey::Plans, &plans)?;
            return Ok(Some(updated));
        };

        let Some(remote_id) = parse_remote_id(id) else {
            return Ok(None);
        };
        ensure_user_exists(&*self.remote, user_id).await?;
        let row = self
            .remote
            .update_plan(user_id, remote_id, &plan_update_from(&update))
            .await
            .map_err(|e| surfaced("update your plan", user_id, e))?;
        Ok(row.as_ref().map(plan_from_row))
    }

    /// Move a plan to a new date.
    pub async fn schedule_plan(
        &self,
        user_id: Option<&str>,
        id: &str,
        date: Timestamp,
    ) -> Result<Option<Plan>, DataError> {
        self.update_plan(user_id, id, UpdatePlan::schedule(date)).await
    }

    /// Delete a plan. `false` if the user has no plan with `id`.
    pub async fn delete_plan(&self, user_id: Option<&str>, id: &str) -> Result<bool, DataError> {
        let Some(user_id) = user_key(user_id) else {
            let mut plans: Vec<Plan> = load_list(&*self.local, StorageKey::Plans)?;
            let before = plans.len();
            plans.retain(|p| p.id != id);
            if plans.len() == before {
                return Ok(false);
            }
            write_json(&*self.local, StorageKey::Plans, &plans)?;
            return Ok(true);
        };

        let Some(remote_id) = parse_remote_id(id) else {
            return Ok(false);
        };
        ensure_user_exists(&*self.remote, user_id).await?;
        self.remote
            .delete_plan(user_id, remote_id)
            .await
            .map_err(|e| surfaced("delete your plan", user_id, e))
    }

    /// Turn a generated suggestion into a saved plan dated now.
    pub async fn accept_suggestion(
        &self,
        user_id: Option<&str>,
        suggestion: &PlanSuggestion,
    ) -> Result<Plan, DataError> {
        self.save_plan(user_id, NewPlan::from_suggestion(suggestion, Utc::now()))
            .await
    }
}
