//! Repository for the `partner_profiles` table.
//!
//! At most one row per user, enforced by `uq_partner_profiles_user_id`.

use sqlx::PgPool;

use crate::models::partner_profile::{RawProfileRow, UpsertPartnerProfile};

/// Read and upsert of the per-user profile row.
pub struct PartnerProfileRepo;

impl PartnerProfileRepo {
    /// The user's profile row as a JSON object, if any.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<RawProfileRow>, sqlx::Error> {
        sqlx::query_scalar::<_, RawProfileRow>(
            "SELECT to_jsonb(p) FROM partner_profiles p WHERE p.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Insert or replace the user's profile row.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        input: &UpsertPartnerProfile,
    ) -> Result<RawProfileRow, sqlx::Error> {
        sqlx::query_scalar::<_, RawProfileRow>(
            "INSERT INTO partner_profiles
                (user_id, name, favorite_color, favorite_food, favorite_hobbies,
                 important_dates, notes, birthday, anniversary, love_languages,
                 favorite_things, dislikes, sizes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                favorite_color = EXCLUDED.favorite_color,
                favorite_food = EXCLUDED.favorite_food,
                favorite_hobbies = EXCLUDED.favorite_hobbies,
                important_dates = EXCLUDED.important_dates,
                notes = EXCLUDED.notes,
                birthday = EXCLUDED.birthday,
                anniversary = EXCLUDED.anniversary,
                love_languages = EXCLUDED.love_languages,
                favorite_things = EXCLUDED.favorite_things,
                dislikes = EXCLUDED.dislikes,
                sizes = EXCLUDED.sizes,
                updated_at = NOW()
             RETURNING to_jsonb(partner_profiles)",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.favorite_color)
        .bind(&input.favorite_food)
        .bind(&input.favorite_hobbies)
        .bind(&input.important_dates)
        .bind(&input.notes)
        .bind(input.birthday)
        .bind(input.anniversary)
        .bind(&input.love_languages)
        .bind(&input.favorite_things)
        .bind(&input.dislikes)
        .bind(&input.sizes)
        .fetch_one(pool)
        .await
    }
}
