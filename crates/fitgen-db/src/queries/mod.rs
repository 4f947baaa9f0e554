//! Query functions, one module per table.

pub mod history;
pub mod preferences;
pub mod users;
pub mod workouts;

/// True when `err` wraps a PostgreSQL unique-constraint violation.
///
/// Query functions return `anyhow::Error`; callers use this to turn a
/// racing duplicate insert into a validation failure.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_unique_violation())
    })
}
