use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a user is training for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Endurance,
    GeneralFitness,
    SportsSpecific,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 5] = [
        Self::WeightLoss,
        Self::MuscleGain,
        Self::Endurance,
        Self::GeneralFitness,
        Self::SportsSpecific,
    ];
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WeightLoss => "weight_loss",
            Self::MuscleGain => "muscle_gain",
            Self::Endurance => "endurance",
            Self::GeneralFitness => "general_fitness",
            Self::SportsSpecific => "sports_specific",
        };
        f.write_str(s)
    }
}

impl FromStr for FitnessGoal {
    type Err = FitnessGoalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight_loss" => Ok(Self::WeightLoss),
            "muscle_gain" => Ok(Self::MuscleGain),
            "endurance" => Ok(Self::Endurance),
            "general_fitness" => Ok(Self::GeneralFitness),
            "sports_specific" => Ok(Self::SportsSpecific),
            other => Err(FitnessGoalParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`FitnessGoal`] string.
#[derive(Debug, Clone)]
pub struct FitnessGoalParseError(pub String);

impl fmt::Display for FitnessGoalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fitness goal: {:?}", self.0)
    }
}

impl std::error::Error for FitnessGoalParseError {}

// ---------------------------------------------------------------------------

/// Self-reported training experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for ExperienceLevel {
    type Err = ExperienceLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(ExperienceLevelParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ExperienceLevel`] string.
#[derive(Debug, Clone)]
pub struct ExperienceLevelParseError(pub String);

impl fmt::Display for ExperienceLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid experience level: {:?}", self.0)
    }
}

impl std::error::Error for ExperienceLevelParseError {}

// ---------------------------------------------------------------------------

/// How a stored workout was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Returned by the remote model and parsed successfully.
    AiGenerated,
    /// Static goal-keyed template used when generation failed.
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AiGenerated => "ai-generated",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

impl FromStr for Provenance {
    type Err = ProvenanceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai-generated" => Ok(Self::AiGenerated),
            "fallback" => Ok(Self::Fallback),
            other => Err(ProvenanceParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Provenance`] string.
#[derive(Debug, Clone)]
pub struct ProvenanceParseError(pub String);

impl fmt::Display for ProvenanceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid provenance: {:?}", self.0)
    }
}

impl std::error::Error for ProvenanceParseError {}

// ---------------------------------------------------------------------------
// Stored list encoding
// ---------------------------------------------------------------------------

/// Encode a list field (equipment, limitations, ...) as JSON array text.
pub fn encode_string_list(items: &[String]) -> String {
    // Serializing a slice of strings cannot fail.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_owned())
}

/// Decode a list field stored by [`encode_string_list`].
///
/// `NULL`, blank and malformed values all decode to an empty list; malformed
/// values are logged under `field`.
pub fn decode_string_list(field: &str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(field, error = %err, "malformed stored list, treating as empty");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Workout body
// ---------------------------------------------------------------------------

/// Structured content of a workout plan.
///
/// Field names match the JSON schema the model is asked to answer in, so
/// the same type parses model output and round-trips through JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutBody {
    pub workout_name: String,
    pub warmup: Vec<TimedExercise>,
    pub main_workout: Vec<MainExercise>,
    pub cooldown: Vec<TimedExercise>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_estimated_duration: String,
    #[serde(default)]
    pub notes: String,
}

impl WorkoutBody {
    /// True when all three segments carry at least one exercise.
    pub fn has_all_segments(&self) -> bool {
        !self.warmup.is_empty() && !self.main_workout.is_empty() && !self.cooldown.is_empty()
    }
}

/// Warm-up or cool-down entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedExercise {
    pub exercise: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

/// Main-segment entry with a set/rep/rest prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainExercise {
    pub exercise: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(deserialize_with = "lenient_sets")]
    pub sets: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub reps: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rest: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub progressive_overload_note: String,
}

/// Accept `"60s"` as well as `60`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accept `3` as well as `"3"`.
fn lenient_sets<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid set count {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid set count {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected set count, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A registered user with their training profile.
///
/// List fields are kept as stored text; decode them with
/// [`decode_string_list`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub fitness_goal: FitnessGoal,
    pub available_equipment: Option<String>,
    pub time_constraint: i32,
    pub physical_limitations: Option<String>,
    pub experience_level: ExperienceLevel,
    pub created_at: DateTime<Utc>,
}

/// Scheduling preferences, at most one row per user.
#[derive(Debug, Clone, FromRow)]
pub struct UserPreferences {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferred_days: Option<String>,
    pub preferred_time: Option<String>,
    pub workout_frequency: Option<i32>,
    pub focus_areas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A generated (or fallback) workout plan owned by one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub workout_data: Json<WorkoutBody>,
    pub generated_by: Provenance,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub difficulty_rating: Option<i32>,
}

/// One completion event for a workout. Append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub performance_data: serde_json::Value,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
