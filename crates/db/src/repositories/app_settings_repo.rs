//! Repository for the `app_settings` table.

use sqlx::PgPool;

use crate::models::app_settings::{RawSettingsRow, UpsertAppSettings};

/// Read and upsert of the per-user settings row.
pub struct AppSettingsRepo;

impl AppSettingsRepo {
    /// The user's settings row as a JSON object, if any.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<RawSettingsRow>, sqlx::Error> {
        sqlx::query_scalar::<_, RawSettingsRow>(
            "SELECT to_jsonb(s) FROM app_settings s WHERE s.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Insert or replace the user's settings row.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        input: &UpsertAppSettings,
    ) -> Result<RawSettingsRow, sqlx::Error> {
        sqlx::query_scalar::<_, RawSettingsRow>(
            "INSERT INTO app_settings (user_id, notifications, privacy, user_name, locale, currency)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE SET
                notifications = EXCLUDED.notifications,
                privacy = EXCLUDED.privacy,
                user_name = EXCLUDED.user_name,
                locale = EXCLUDED.locale,
                currency = EXCLUDED.currency,
                updated_at = NOW()
             RETURNING to_jsonb(app_settings)",
        )
        .bind(user_id)
        .bind(input.notifications)
        .bind(&input.privacy)
        .bind(&input.user_name)
        .bind(&input.locale)
        .bind(&input.currency)
        .fetch_one(pool)
        .await
    }
}
