//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::UserRecord;

const COLUMNS: &str = "id, email, created_at, updated_at";

/// Lookup and creation of account root rows.
pub struct UserRepo;

impl UserRepo {
    /// Find a user row by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a row with this id exists.
    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a user row. A duplicate id surfaces as a unique violation.
    pub async fn create(
        pool: &PgPool,
        id: &str,
        email: Option<&str>,
    ) -> Result<UserRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .bind(email)
            .fetch_one(pool)
            .await
    }
}
