//! Database query functions for the `user_preferences` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{UserPreferences, encode_string_list};

/// Replacement values for a user's preferences row.
#[derive(Debug)]
pub struct PreferencesUpdate<'a> {
    pub preferred_days: &'a [String],
    pub preferred_time: Option<&'a str>,
    pub workout_frequency: Option<i32>,
    pub focus_areas: &'a [String],
}

/// Create or replace the preferences row for `user_id`.
pub async fn upsert_preferences(
    pool: &PgPool,
    user_id: Uuid,
    update: &PreferencesUpdate<'_>,
) -> Result<UserPreferences> {
    let prefs = sqlx::query_as::<_, UserPreferences>(
        "INSERT INTO user_preferences \
         (user_id, preferred_days, preferred_time, workout_frequency, focus_areas) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (user_id) DO UPDATE SET \
             preferred_days = EXCLUDED.preferred_days, \
             preferred_time = EXCLUDED.preferred_time, \
             workout_frequency = EXCLUDED.workout_frequency, \
             focus_areas = EXCLUDED.focus_areas, \
             updated_at = now() \
         RETURNING *",
    )
    .bind(user_id)
    .bind(encode_string_list(update.preferred_days))
    .bind(update.preferred_time)
    .bind(update.workout_frequency)
    .bind(encode_string_list(update.focus_areas))
    .fetch_one(pool)
    .await
    .context("failed to upsert user preferences")?;

    Ok(prefs)
}

/// Fetch the preferences row for a user, if one was ever saved.
pub async fn get_preferences(pool: &PgPool, user_id: Uuid) -> Result<Option<UserPreferences>> {
    let prefs =
        sqlx::query_as::<_, UserPreferences>("SELECT * FROM user_preferences WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch user preferences")?;

    Ok(prefs)
}
