pub mod accounts;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod password;
pub mod preferences;
pub mod profile;
pub mod workout;

pub use error::{FitgenError, Result};
pub use workout::WorkoutService;
