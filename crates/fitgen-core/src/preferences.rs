//! Training preferences: validation, upsert and decoded view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use fitgen_db::models::{UserPreferences, decode_string_list};
use fitgen_db::queries::preferences::{self as prefs_db, PreferencesUpdate};
use fitgen_db::queries::users as user_db;

use crate::error::{FitgenError, Result};

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Allowed range for sessions per week.
pub const FREQUENCY_RANGE: std::ops::RangeInclusive<i64> = 1..=14;

/// Preferences as submitted by a client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PreferencesInput {
    pub preferred_days: Option<Vec<String>>,
    pub preferred_time: Option<String>,
    pub workout_frequency: Option<i64>,
    pub focus_areas: Option<Vec<String>>,
}

/// Stored preferences with list fields decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    pub user_id: Uuid,
    pub preferred_days: Vec<String>,
    pub preferred_time: Option<String>,
    pub workout_frequency: Option<i32>,
    pub focus_areas: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserPreferences> for Preferences {
    fn from(row: UserPreferences) -> Self {
        Self {
            user_id: row.user_id,
            preferred_days: decode_string_list("preferred_days", row.preferred_days.as_deref()),
            preferred_time: row.preferred_time,
            workout_frequency: row.workout_frequency,
            focus_areas: decode_string_list("focus_areas", row.focus_areas.as_deref()),
            updated_at: row.updated_at,
        }
    }
}

/// Lowercase and check day names, keeping the caller's order and dropping
/// repeats.
fn normalize_days(days: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(days.len());
    for day in days {
        let day = day.trim().to_ascii_lowercase();
        if !WEEKDAYS.contains(&day.as_str()) {
            return Err(FitgenError::validation(format!(
                "Invalid preferred day: {day:?}"
            )));
        }
        if !out.contains(&day) {
            out.push(day);
        }
    }
    Ok(out)
}

fn validate_frequency(frequency: Option<i64>) -> Result<Option<i32>> {
    match frequency {
        None => Ok(None),
        Some(n) if FREQUENCY_RANGE.contains(&n) => Ok(Some(n as i32)),
        Some(n) => Err(FitgenError::validation(format!(
            "workout_frequency must be between {} and {}, got {n}",
            FREQUENCY_RANGE.start(),
            FREQUENCY_RANGE.end()
        ))),
    }
}

async fn ensure_user(pool: &PgPool, user_id: Uuid) -> Result<()> {
    user_db::get_user(pool, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| FitgenError::not_found("User not found"))
}

/// Create or replace a user's preferences.
pub async fn save_preferences(
    pool: &PgPool,
    user_id: Uuid,
    input: &PreferencesInput,
) -> Result<Preferences> {
    let days = normalize_days(input.preferred_days.as_deref().unwrap_or_default())?;
    let frequency = validate_frequency(input.workout_frequency)?;
    let preferred_time = input
        .preferred_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let focus_areas: Vec<String> = input
        .focus_areas
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();

    ensure_user(pool, user_id).await?;

    let row = prefs_db::upsert_preferences(
        pool,
        user_id,
        &PreferencesUpdate {
            preferred_days: &days,
            preferred_time,
            workout_frequency: frequency,
            focus_areas: &focus_areas,
        },
    )
    .await?;

    tracing::info!(%user_id, "preferences saved");
    Ok(row.into())
}

/// Fetch a user's preferences. NotFound when the user or the row is missing.
pub async fn load_preferences(pool: &PgPool, user_id: Uuid) -> Result<Preferences> {
    ensure_user(pool, user_id).await?;
    prefs_db::get_preferences(pool, user_id)
        .await?
        .map(Preferences::from)
        .ok_or_else(|| FitgenError::not_found("No preferences saved for this user"))
}
