//! Normalized view of a user's training profile.

use serde::Serialize;
use uuid::Uuid;

use fitgen_db::models::{ExperienceLevel, FitnessGoal, User, decode_string_list};

/// A user's profile with list fields decoded.
///
/// Building one never fails: malformed stored lists become empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fitness_goal: FitnessGoal,
    pub available_equipment: Vec<String>,
    pub time_constraint: i32,
    pub physical_limitations: Vec<String>,
    pub experience_level: ExperienceLevel,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            fitness_goal: user.fitness_goal,
            available_equipment: decode_string_list(
                "available_equipment",
                user.available_equipment.as_deref(),
            ),
            time_constraint: user.time_constraint,
            physical_limitations: decode_string_list(
                "physical_limitations",
                user.physical_limitations.as_deref(),
            ),
            experience_level: user.experience_level,
        }
    }
}
