//! Workout orchestration: generation with fallback, completion, analytics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use fitgen_db::models::{Provenance, Workout, WorkoutHistory};
use fitgen_db::queries::history::{self as history_db, NewCompletion};
use fitgen_db::queries::users as user_db;
use fitgen_db::queries::workouts as workout_db;

use crate::error::{FitgenError, Result};
use crate::fallback::fallback_plan;
use crate::generator::WorkoutGenerator;
use crate::profile::UserProfile;

/// How many recent plans feed the feedback summary.
pub const HISTORY_WINDOW: i64 = 3;

pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Completion details as submitted by a client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompletionInput {
    pub user_id: Option<Uuid>,
    pub performance_data: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub feedback: Option<String>,
    pub difficulty_rating: Option<i64>,
}

/// Row shown in a user's workout list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub id: Uuid,
    pub name: String,
    pub generated_by: Provenance,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub rating: Option<i32>,
}

impl From<&Workout> for WorkoutSummary {
    fn from(w: &Workout) -> Self {
        Self {
            id: w.id,
            name: w.name.clone(),
            generated_by: w.generated_by,
            created_at: w.created_at,
            completed: w.completed,
            rating: w.rating,
        }
    }
}

/// Per-user workout statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutAnalytics {
    pub total_completed_workouts: i64,
    /// Mean over completed, rated plans, two decimals; 0 when none.
    pub average_rating: f64,
    /// Percentage of generated plans completed, one decimal; 0 with no plans.
    pub completion_rate: f64,
    pub total_workouts_generated: i64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn check_range(
    field: &str,
    value: Option<i64>,
    range: &std::ops::RangeInclusive<i64>,
) -> Result<Option<i32>> {
    match value {
        None => Ok(None),
        Some(v) if range.contains(&v) => Ok(Some(v as i32)),
        Some(v) => Err(FitgenError::validation(format!(
            "{field} must be between {} and {}, got {v}",
            range.start(),
            range.end()
        ))),
    }
}

/// Summarize rated, commented plans as "Rating: r/5, Feedback: f" joined
/// by "; ". `None` when no plan qualifies.
pub fn summarize_feedback(recent: &[Workout]) -> Option<String> {
    let parts: Vec<String> = recent
        .iter()
        .filter_map(|w| match (w.rating, w.feedback.as_deref()) {
            (Some(rating), Some(feedback)) if !feedback.trim().is_empty() => {
                Some(format!("Rating: {rating}/5, Feedback: {}", feedback.trim()))
            }
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Creates, completes and reports on workout plans.
///
/// Holds the generator behind a trait object so tests and the server can
/// inject different providers.
pub struct WorkoutService {
    pool: PgPool,
    generator: Arc<dyn WorkoutGenerator>,
}

impl WorkoutService {
    pub fn new(pool: PgPool, generator: Arc<dyn WorkoutGenerator>) -> Self {
        Self { pool, generator }
    }

    pub fn generator(&self) -> &dyn WorkoutGenerator {
        self.generator.as_ref()
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = user_db::get_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| FitgenError::not_found("User not found"))?;
        Ok(UserProfile::from(&user))
    }

    /// Profile of an existing user.
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
        self.load_profile(user_id).await
    }

    /// Generate and store a new plan for `user_id`.
    ///
    /// Falls back to the goal's built-in workout when the generator returns
    /// nothing, so the stored body always has every segment.
    pub async fn create_plan(&self, user_id: Uuid) -> Result<Workout> {
        let profile = self.load_profile(user_id).await?;

        let recent = workout_db::list_recent_workouts(&self.pool, user_id, HISTORY_WINDOW).await?;
        let history = summarize_feedback(&recent);

        let (body, provenance) = match self.generator.generate(&profile, history.as_deref()).await
        {
            Some(body) => (body, Provenance::AiGenerated),
            None => {
                warn!(
                    %user_id,
                    generator = self.generator.name(),
                    goal = %profile.fitness_goal,
                    "generation failed, using fallback workout"
                );
                (fallback_plan(profile.fitness_goal), Provenance::Fallback)
            }
        };

        let workout = workout_db::insert_workout(&self.pool, user_id, &body, provenance).await?;
        info!(
            %user_id,
            workout_id = %workout.id,
            name = %workout.name,
            generated_by = %provenance,
            "workout plan created"
        );
        Ok(workout)
    }

    /// Record a completion of `plan_id`.
    ///
    /// Ratings are validated before storage is touched. A plan that does not
    /// exist or belongs to someone else is NotFound and nothing is written.
    pub async fn complete_plan(
        &self,
        plan_id: Uuid,
        input: &CompletionInput,
    ) -> Result<WorkoutHistory> {
        let user_id = input
            .user_id
            .ok_or_else(|| FitgenError::validation("Missing required field: user_id"))?;
        let rating = check_range("rating", input.rating, &RATING_RANGE)?;
        let difficulty = check_range("difficulty_rating", input.difficulty_rating, &DIFFICULTY_RANGE)?;

        let empty = serde_json::Value::Object(serde_json::Map::new());
        let performance_data = input.performance_data.as_ref().unwrap_or(&empty);
        let notes = input.notes.as_deref();
        let feedback = input.feedback.as_deref().or(notes);

        let record = history_db::record_completion(
            &self.pool,
            &NewCompletion {
                user_id,
                workout_id: plan_id,
                performance_data,
                notes,
                rating,
                difficulty_rating: difficulty,
                feedback,
            },
        )
        .await?
        .ok_or_else(|| FitgenError::not_found("Workout not found"))?;

        info!(
            %user_id,
            workout_id = %plan_id,
            history_id = %record.id,
            rating = ?rating,
            "workout completed"
        );
        Ok(record)
    }

    /// Completion statistics for a user. Unknown users get all zeros.
    pub async fn analytics(&self, user_id: Uuid) -> Result<WorkoutAnalytics> {
        let counts = workout_db::get_workout_counts(&self.pool, user_id).await?;

        let completion_rate = if counts.total > 0 {
            round_to(counts.completed as f64 / counts.total as f64 * 100.0, 1)
        } else {
            0.0
        };

        Ok(WorkoutAnalytics {
            total_completed_workouts: counts.completed,
            average_rating: round_to(counts.average_rating.unwrap_or(0.0), 2),
            completion_rate,
            total_workouts_generated: counts.total,
        })
    }

    /// All plans for a user, newest first.
    pub async fn list_plans(&self, user_id: Uuid) -> Result<Vec<WorkoutSummary>> {
        let workouts = workout_db::list_workouts_for_user(&self.pool, user_id).await?;
        Ok(workouts.iter().map(WorkoutSummary::from).collect())
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> Result<Workout> {
        workout_db::get_workout(&self.pool, plan_id)
            .await?
            .ok_or_else(|| FitgenError::not_found("Workout not found"))
    }
}
