//! `fitgen generate`: create one plan for a user and print it.

use anyhow::{Context, Result};
use uuid::Uuid;

use fitgen_core::WorkoutService;

pub async fn run_generate(service: &WorkoutService, user_id: &str) -> Result<()> {
    let id = Uuid::parse_str(user_id).with_context(|| format!("invalid user ID: {user_id}"))?;

    let workout = service.create_plan(id).await?;

    eprintln!(
        "Created workout {} ({}) for user {user_id}",
        workout.id, workout.generated_by
    );
    let json = serde_json::to_string_pretty(&workout).context("failed to serialize workout")?;
    println!("{json}");
    Ok(())
}
