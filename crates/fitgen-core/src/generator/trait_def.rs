//! The `WorkoutGenerator` trait -- the adapter interface for LLM providers.
//!
//! Each provider (Gemini, OpenAI-compatible) implements this trait. The
//! trait is object-safe so the orchestrator can hold an
//! `Arc<dyn WorkoutGenerator>`.

use anyhow::Result;
use async_trait::async_trait;

use fitgen_db::models::WorkoutBody;

use crate::profile::UserProfile;

/// Adapter interface for turning a profile into a structured workout.
///
/// # Object Safety
///
/// Every method returns a concrete type, so `dyn WorkoutGenerator` works.
#[async_trait]
pub trait WorkoutGenerator: Send + Sync {
    /// Short provider name used in logs and the health endpoint (e.g. "gemini").
    fn name(&self) -> &str;

    /// Ask the remote model for a workout.
    ///
    /// Returns `None` on any provider-side failure: transport error,
    /// timeout, non-success status, empty text, unparsable JSON or a body
    /// missing a segment. Implementations must not persist anything.
    async fn generate(&self, profile: &UserProfile, history: Option<&str>) -> Option<WorkoutBody>;

    /// Send a tiny probe prompt and return the model's reply text.
    async fn check_connection(&self) -> Result<String>;
}

// Compile-time assertion: WorkoutGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn WorkoutGenerator) {}
};
