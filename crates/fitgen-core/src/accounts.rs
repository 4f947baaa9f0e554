//! Registration and login.
//!
//! Registration always requires a password; login verifies email and
//! password and issues no session.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use fitgen_db::models::{ExperienceLevel, FitnessGoal, User};
use fitgen_db::queries::is_unique_violation;
use fitgen_db::queries::users::{self as user_db, NewUser};

use crate::error::{FitgenError, Result};
use crate::password;

/// Session length assumed when the caller does not give one.
pub const DEFAULT_TIME_CONSTRAINT: i32 = 30;

/// Registration input as received from a client. Every field is optional
/// here so missing ones can be reported by name.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub fitness_goal: Option<String>,
    pub available_equipment: Option<Vec<String>>,
    pub time_constraint: Option<i64>,
    pub physical_limitations: Option<Vec<String>>,
    pub experience_level: Option<String>,
}

/// Login input as received from a client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FitgenError::validation(format!("Missing required field: {field}")))
}

/// Create a user with hashed credentials and the given training profile.
///
/// Duplicate emails or usernames are validation errors and create no row.
pub async fn register(pool: &PgPool, reg: &Registration) -> Result<User> {
    let username = required(&reg.username, "username")?;
    let email = required(&reg.email, "email")?;
    // Passwords are not trimmed; only presence is checked above.
    required(&reg.password, "password")?;
    let raw_password = reg.password.as_deref().unwrap_or_default();

    if !email.contains('@') {
        return Err(FitgenError::validation(format!("Invalid email address: {email}")));
    }

    let fitness_goal = match reg.fitness_goal.as_deref() {
        Some(s) => s
            .parse::<FitnessGoal>()
            .map_err(|e| FitgenError::validation(e.to_string()))?,
        None => FitnessGoal::GeneralFitness,
    };
    let experience_level = match reg.experience_level.as_deref() {
        Some(s) => s
            .parse::<ExperienceLevel>()
            .map_err(|e| FitgenError::validation(e.to_string()))?,
        None => ExperienceLevel::Beginner,
    };
    let time_constraint = match reg.time_constraint {
        Some(minutes) => i32::try_from(minutes)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| {
                FitgenError::validation(format!(
                    "time_constraint must be a positive number of minutes, got {minutes}"
                ))
            })?,
        None => DEFAULT_TIME_CONSTRAINT,
    };

    if user_db::get_user_by_email(pool, email).await?.is_some() {
        return Err(FitgenError::validation("User with this email already exists"));
    }
    if user_db::get_user_by_username(pool, username).await?.is_some() {
        return Err(FitgenError::validation("Username already taken"));
    }

    let password_hash = password::hash_password(raw_password)
        .map_err(|e| FitgenError::Persistence(anyhow::Error::new(e)))?;

    let equipment = reg.available_equipment.clone().unwrap_or_default();
    let limitations = reg.physical_limitations.clone().unwrap_or_default();

    let new_user = NewUser {
        username,
        email,
        password_hash: &password_hash,
        fitness_goal,
        available_equipment: &equipment,
        time_constraint,
        physical_limitations: &limitations,
        experience_level,
    };

    match user_db::insert_user(pool, &new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(user)
        }
        // Lost a race with a concurrent registration.
        Err(e) if is_unique_violation(&e) => Err(FitgenError::validation(
            "User with this email or username already exists",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Verify credentials and return the matching user.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(pool: &PgPool, creds: &Credentials) -> Result<User> {
    let email = required(&creds.email, "email")?;
    required(&creds.password, "password")?;
    let raw_password = creds.password.as_deref().unwrap_or_default();

    let invalid = || FitgenError::Auth("Invalid email or password".to_string());

    let user = user_db::get_user_by_email(pool, email)
        .await?
        .ok_or_else(invalid)?;

    let matches = password::verify_password(raw_password, &user.password_hash).unwrap_or_else(|e| {
        tracing::warn!(user_id = %user.id, error = %e, "stored password hash is malformed");
        false
    });
    if !matches {
        return Err(invalid());
    }

    Ok(user)
}
