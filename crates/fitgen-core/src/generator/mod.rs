//! LLM-backed workout generation.
//!
//! Submodules:
//! - [`trait_def`]: the `WorkoutGenerator` adapter trait
//! - [`prompt`]: prompt text built from a profile
//! - [`parse`]: fence stripping and JSON validation of model output
//! - [`gemini`] / [`openai`]: concrete providers
//! - [`config`]: provider selection and construction

pub mod config;
pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompt;
pub mod trait_def;

pub use config::{GeneratorConfig, Provider, build_generator};
pub use trait_def::WorkoutGenerator;

use tracing::{debug, info, warn};

use fitgen_db::models::WorkoutBody;

/// Turn a provider round-trip into the adapter contract: a valid body or
/// `None`, with the failure logged.
pub(crate) fn interpret_response(
    provider: &str,
    outcome: anyhow::Result<String>,
) -> Option<WorkoutBody> {
    let text = match outcome {
        Ok(text) => text,
        Err(e) => {
            warn!(provider, error = %format!("{e:#}"), "workout generation request failed");
            return None;
        }
    };

    match parse::parse_workout_response(&text) {
        Ok(body) => {
            info!(provider, workout_name = %body.workout_name, "model produced a workout");
            Some(body)
        }
        Err(e) => {
            warn!(provider, error = %e, "discarding unusable model response");
            debug!(provider, response = %text, "raw model response");
            None
        }
    }
}
