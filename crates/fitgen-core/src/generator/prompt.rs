//! Prompt construction for workout generation.
//!
//! Pure string building, no I/O. The same prompt goes to every provider.

use crate::profile::UserProfile;

/// Probe sent by [`super::WorkoutGenerator::check_connection`].
pub const CONNECTION_PROBE: &str = "Reply with just the word 'Connected' and nothing else.";

/// System message for chat-style providers.
pub const TRAINER_SYSTEM_MESSAGE: &str = "You are an expert personal trainer and fitness coach. \
Create safe, effective, and personalized workout plans.";

/// JSON shape the model must answer in.
const RESPONSE_SCHEMA: &str = r#"RESPONSE FORMAT (JSON only, no other text):
{
    "workout_name": "Creative workout name",
    "warmup": [
        {"exercise": "name", "duration": "time", "description": "brief instructions"}
    ],
    "main_workout": [
        {
            "exercise": "name",
            "muscle_group": "target muscle",
            "sets": number,
            "reps": "rep range",
            "rest": "rest time",
            "instructions": "detailed instructions",
            "progressive_overload_note": "how to progress next time"
        }
    ],
    "cooldown": [
        {"exercise": "name", "duration": "time", "description": "brief instructions"}
    ],
    "total_estimated_duration": "minutes",
    "notes": "general workout advice and precautions"
}

Return only the JSON object, no additional text.
"#;

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Build the workout prompt for `profile`.
///
/// Deterministic: the same profile and history always produce the same text.
/// `history` is the "Rating: r/5, Feedback: f" summary of recent plans.
pub fn build_workout_prompt(profile: &UserProfile, history: Option<&str>) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("Create a personalized workout plan as valid JSON.\n\n");

    prompt.push_str("USER PROFILE:\n");
    prompt.push_str(&format!("- Fitness Goal: {}\n", profile.fitness_goal));
    prompt.push_str(&format!(
        "- Available Equipment: {}\n",
        join_or(&profile.available_equipment, "none")
    ));
    prompt.push_str(&format!(
        "- Time Available: {} minutes\n",
        profile.time_constraint
    ));
    prompt.push_str(&format!(
        "- Experience Level: {}\n",
        profile.experience_level
    ));
    prompt.push_str(&format!(
        "- Physical Limitations: {}\n",
        join_or(&profile.physical_limitations, "None")
    ));

    if let Some(history) = history.map(str::trim).filter(|h| !h.is_empty()) {
        prompt.push_str(&format!("\nPrevious workout feedback: {history}\n"));
    }

    prompt.push_str("\nREQUIREMENTS:\n");
    prompt.push_str("- Include warm-up, main workout, and cool-down\n");
    prompt.push_str("- Specify sets, reps, rest periods for each exercise\n");
    prompt.push_str("- Consider the user's experience level and limitations\n");
    prompt.push_str("- Consider progressive overload and muscle group balance\n");
    prompt.push_str(&format!(
        "- Total duration should be approximately {} minutes\n\n",
        profile.time_constraint
    ));

    prompt.push_str(RESPONSE_SCHEMA);
    prompt
}
