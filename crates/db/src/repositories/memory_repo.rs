//! Repository for the `memories` table.

use little_things_core::types::DbId;
use sqlx::PgPool;

use crate::models::memory::{CreateMemoryRecord, MemoryRecord, UpdateMemoryRecord};

const COLUMNS: &str = "id, user_id, title, body, tags, importance, date, created_at, updated_at";

/// CRUD for memory rows.
pub struct MemoryRepo;

impl MemoryRepo {
    /// All memories of a user, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<MemoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM memories
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MemoryRecord>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a memory, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        input: &CreateMemoryRecord,
    ) -> Result<MemoryRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO memories (user_id, title, body, tags, importance, date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MemoryRecord>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.tags)
            .bind(&input.importance)
            .bind(input.date)
            .fetch_one(pool)
            .await
    }

    /// Update a memory. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the user owns no memory with this id.
    pub async fn update(
        pool: &PgPool,
        user_id: &str,
        id: DbId,
        input: &UpdateMemoryRecord,
    ) -> Result<Option<MemoryRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE memories SET
                title = COALESCE($3, title),
                body = COALESCE($4, body),
                tags = COALESCE($5, tags),
                importance = COALESCE($6, importance),
                date = COALESCE($7, date),
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MemoryRecord>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.tags)
            .bind(&input.importance)
            .bind(input.date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a memory. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
