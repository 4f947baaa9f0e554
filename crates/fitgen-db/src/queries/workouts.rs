//! Database query functions for the `workouts` table.

use anyhow::{Context, Result};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{Provenance, Workout, WorkoutBody};

/// Insert a new workout for a user. The plan name is taken from the body.
pub async fn insert_workout(
    pool: &PgPool,
    user_id: Uuid,
    body: &WorkoutBody,
    generated_by: Provenance,
) -> Result<Workout> {
    let workout = sqlx::query_as::<_, Workout>(
        "INSERT INTO workouts (user_id, name, workout_data, generated_by) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(&body.workout_name)
    .bind(Json(body))
    .bind(generated_by)
    .fetch_one(pool)
    .await
    .context("failed to insert workout")?;

    Ok(workout)
}

/// Fetch a workout by its ID.
pub async fn get_workout(pool: &PgPool, id: Uuid) -> Result<Option<Workout>> {
    let workout = sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch workout")?;

    Ok(workout)
}

/// List every workout a user owns, newest first.
pub async fn list_workouts_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list workouts")?;

    Ok(workouts)
}

/// The `limit` most recently created workouts for a user, newest first.
pub async fn list_recent_workouts(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to list recent workouts")?;

    Ok(workouts)
}

/// Aggregate counts behind the analytics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct WorkoutCounts {
    pub total: i64,
    pub completed: i64,
    /// Mean rating over completed, rated workouts. `None` when there are none.
    pub average_rating: Option<f64>,
}

/// Count a user's workouts, completed workouts and their mean rating.
pub async fn get_workout_counts(pool: &PgPool, user_id: Uuid) -> Result<WorkoutCounts> {
    let counts = sqlx::query_as::<_, WorkoutCounts>(
        "SELECT \
             COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE completed) AS completed, \
             (AVG(rating) FILTER (WHERE completed AND rating IS NOT NULL))::float8 AS average_rating \
         FROM workouts \
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("failed to count workouts")?;

    Ok(counts)
}
