//! PostgreSQL persistence for fitgen: users, workouts, completion history
//! and preferences.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
