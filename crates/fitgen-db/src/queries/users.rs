//! Database query functions for the `users` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ExperienceLevel, FitnessGoal, User, encode_string_list};

/// Fields needed to insert a user row.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub fitness_goal: FitnessGoal,
    pub available_equipment: &'a [String],
    pub time_constraint: i32,
    pub physical_limitations: &'a [String],
    pub experience_level: ExperienceLevel,
}

/// Insert a new user. List fields are stored as JSON array text.
pub async fn insert_user(pool: &PgPool, new: &NewUser<'_>) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users \
         (username, email, password_hash, fitness_goal, available_equipment, \
          time_constraint, physical_limitations, experience_level) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.fitness_goal)
    .bind(encode_string_list(new.available_equipment))
    .bind(new.time_constraint)
    .bind(encode_string_list(new.physical_limitations))
    .bind(new.experience_level)
    .fetch_one(pool)
    .await
    .context("failed to insert user")?;

    Ok(user)
}

/// Fetch a user by ID.
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user")?;

    Ok(user)
}

/// Fetch a user by email address (exact match).
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by email")?;

    Ok(user)
}

/// Fetch a user by username (exact match).
pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by username")?;

    Ok(user)
}

/// Count all users.
pub async fn count_users(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("failed to count users")?;

    Ok(count)
}
