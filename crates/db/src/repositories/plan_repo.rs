//! Repository for the `plans` table.

use little_things_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{CreatePlanRecord, PlanRecord, UpdatePlanRecord};

const COLUMNS: &str = "id, user_id, title, description, category, priority, completed, \
                        scheduled_for, created_at, updated_at";

/// CRUD for plan rows.
pub struct PlanRepo;

impl PlanRepo {
    /// All plans of a user, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<PlanRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plans
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PlanRecord>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a plan, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        input: &CreatePlanRecord,
    ) -> Result<PlanRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans (user_id, title, description, category, priority, completed, scheduled_for)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanRecord>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.priority)
            .bind(input.completed)
            .bind(input.scheduled_for)
            .fetch_one(pool)
            .await
    }

    /// Update a plan. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the user owns no plan with this id.
    pub async fn update(
        pool: &PgPool,
        user_id: &str,
        id: DbId,
        input: &UpdatePlanRecord,
    ) -> Result<Option<PlanRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE plans SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                priority = COALESCE($6, priority),
                completed = COALESCE($7, completed),
                scheduled_for = COALESCE($8, scheduled_for),
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlanRecord>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.priority)
            .bind(input.completed)
            .bind(input.scheduled_for)
            .fetch_optional(pool)
            .await
    }

    /// Delete a plan. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
