//! Database query functions for the `workout_history` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WorkoutHistory;

/// A completion event to record against a workout.
#[derive(Debug)]
pub struct NewCompletion<'a> {
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub performance_data: &'a serde_json::Value,
    pub notes: Option<&'a str>,
    /// Already validated to lie in 1..=5.
    pub rating: Option<i32>,
    /// Already validated to lie in 1..=10.
    pub difficulty_rating: Option<i32>,
    pub feedback: Option<&'a str>,
}

/// Mark a workout completed and append a history row, in one transaction.
///
/// Returns `None` (and writes nothing) when the workout does not exist or is
/// owned by a different user. `completed_at` keeps the first completion
/// time; rating, difficulty and feedback are only overwritten when given.
pub async fn record_completion(
    pool: &PgPool,
    new: &NewCompletion<'_>,
) -> Result<Option<WorkoutHistory>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let updated = sqlx::query(
        "UPDATE workouts \
         SET completed = TRUE, \
             completed_at = COALESCE(completed_at, now()), \
             rating = COALESCE($3, rating), \
             difficulty_rating = COALESCE($4, difficulty_rating), \
             feedback = COALESCE($5, feedback) \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(new.workout_id)
    .bind(new.user_id)
    .bind(new.rating)
    .bind(new.difficulty_rating)
    .bind(new.feedback)
    .execute(&mut *tx)
    .await
    .context("failed to mark workout completed")?;

    if updated.rows_affected() == 0 {
        // Dropping the transaction rolls it back.
        return Ok(None);
    }

    let record = sqlx::query_as::<_, WorkoutHistory>(
        "INSERT INTO workout_history (user_id, workout_id, performance_data, notes) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.workout_id)
    .bind(new.performance_data)
    .bind(new.notes)
    .fetch_one(&mut *tx)
    .await
    .context("failed to insert workout history")?;

    tx.commit().await.context("failed to commit completion")?;

    Ok(Some(record))
}

/// All completion events for a workout, oldest first.
pub async fn list_history_for_workout(
    pool: &PgPool,
    workout_id: Uuid,
) -> Result<Vec<WorkoutHistory>> {
    let rows = sqlx::query_as::<_, WorkoutHistory>(
        "SELECT * FROM workout_history WHERE workout_id = $1 ORDER BY completed_at",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await
    .context("failed to list workout history")?;

    Ok(rows)
}
