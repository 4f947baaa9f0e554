//! Integration tests for user and preferences queries.
//!
//! Each test gets its own migrated database from `fitgen-test-utils`.

use fitgen_db::models::{ExperienceLevel, FitnessGoal, decode_string_list};
use fitgen_db::queries::preferences::{self, PreferencesUpdate};
use fitgen_db::queries::users::{self, NewUser};
use fitgen_db::queries::is_unique_violation;
use fitgen_test_utils::{create_test_db, drop_test_db, insert_test_user};

fn new_user<'a>(
    username: &'a str,
    email: &'a str,
    equipment: &'a [String],
    limitations: &'a [String],
) -> NewUser<'a> {
    NewUser {
        username,
        email,
        password_hash: "salt$digest",
        fitness_goal: FitnessGoal::MuscleGain,
        available_equipment: equipment,
        time_constraint: 60,
        physical_limitations: limitations,
        experience_level: ExperienceLevel::Beginner,
    }
}

#[tokio::test]
async fn insert_and_fetch_user() {
    let (pool, db_name) = create_test_db().await;

    let equipment = vec!["kettlebell".to_string(), "yoga_mat".to_string()];
    let limitations = vec!["lower back pain".to_string(), "asthma".to_string()];
    let user = users::insert_user(
        &pool,
        &new_user("alex", "alex@example.com", &equipment, &limitations),
    )
    .await
    .expect("insert_user should succeed");

    assert_eq!(user.username, "alex");
    assert_eq!(user.fitness_goal, FitnessGoal::MuscleGain);
    assert_eq!(user.time_constraint, 60);

    let fetched = users::get_user(&pool, user.id)
        .await
        .expect("get_user should succeed")
        .expect("user should exist");
    assert_eq!(
        decode_string_list("available_equipment", fetched.available_equipment.as_deref()),
        equipment
    );
    assert_eq!(
        decode_string_list("physical_limitations", fetched.physical_limitations.as_deref()),
        limitations
    );

    let by_email = users::get_user_by_email(&pool, "alex@example.com")
        .await
        .unwrap()
        .expect("lookup by email");
    assert_eq!(by_email.id, user.id);

    let by_name = users::get_user_by_username(&pool, "alex")
        .await
        .unwrap()
        .expect("lookup by username");
    assert_eq!(by_name.id, user.id);

    assert!(
        users::get_user(&pool, uuid::Uuid::new_v4())
            .await
            .unwrap()
            .is_none()
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn duplicate_email_is_unique_violation() {
    let (pool, db_name) = create_test_db().await;

    users::insert_user(&pool, &new_user("first", "same@example.com", &[], &[]))
        .await
        .expect("first insert should succeed");

    let err = users::insert_user(&pool, &new_user("second", "same@example.com", &[], &[]))
        .await
        .expect_err("duplicate email should fail");
    assert!(is_unique_violation(&err), "unexpected error: {err:#}");
    assert_eq!(users::count_users(&pool).await.unwrap(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn preferences_upsert_replaces_row() {
    let (pool, db_name) = create_test_db().await;
    let user = insert_test_user(&pool, FitnessGoal::Endurance).await;

    assert!(
        preferences::get_preferences(&pool, user.id)
            .await
            .unwrap()
            .is_none()
    );

    let days = vec!["monday".to_string(), "thursday".to_string()];
    let focus = vec!["legs".to_string()];
    let first = preferences::upsert_preferences(
        &pool,
        user.id,
        &PreferencesUpdate {
            preferred_days: &days,
            preferred_time: Some("morning"),
            workout_frequency: Some(2),
            focus_areas: &focus,
        },
    )
    .await
    .expect("first upsert");

    let second = preferences::upsert_preferences(
        &pool,
        user.id,
        &PreferencesUpdate {
            preferred_days: &[],
            preferred_time: None,
            workout_frequency: Some(4),
            focus_areas: &focus,
        },
    )
    .await
    .expect("second upsert");

    assert_eq!(first.id, second.id, "upsert should keep a single row");
    assert_eq!(second.workout_frequency, Some(4));
    assert!(second.preferred_time.is_none());
    assert!(decode_string_list("preferred_days", second.preferred_days.as_deref()).is_empty());
    assert!(second.updated_at >= first.updated_at);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn table_counts_cover_fitgen_tables() {
    let (pool, db_name) = create_test_db().await;
    insert_test_user(&pool, FitnessGoal::Endurance).await;

    let counts = fitgen_db::pool::table_counts(&pool).await.unwrap();
    let names: Vec<&str> = counts.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, fitgen_db::pool::TABLES);
    assert_eq!(counts[0], ("users", 1));
    assert!(counts[1..].iter().all(|(_, n)| *n == 0));

    pool.close().await;
    drop_test_db(&db_name).await;
}
