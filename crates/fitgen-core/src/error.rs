//! Error kinds surfaced to callers of the core services.
//!
//! Generation failures never appear here: the orchestrator recovers from
//! them with a fallback plan.

/// Errors returned by account, preference and workout operations.
#[derive(Debug, thiserror::Error)]
pub enum FitgenError {
    /// Missing or invalid input.
    #[error("{0}")]
    Validation(String),

    /// Credentials did not match.
    #[error("{0}")]
    Auth(String),

    /// A referenced user or workout does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A storage operation failed.
    #[error("persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl FitgenError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type Result<T, E = FitgenError> = std::result::Result<T, E>;
