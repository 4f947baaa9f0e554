//! Integration tests for workout and completion-history queries.

use fitgen_db::models::{FitnessGoal, MainExercise, Provenance, TimedExercise, WorkoutBody};
use fitgen_db::queries::history::{self, NewCompletion};
use fitgen_db::queries::workouts;
use fitgen_test_utils::{create_test_db, drop_test_db, insert_test_user};

fn body(name: &str) -> WorkoutBody {
    WorkoutBody {
        workout_name: name.to_string(),
        warmup: vec![TimedExercise {
            exercise: "Jumping Jacks".to_string(),
            duration: "3 minutes".to_string(),
            description: "Moderate pace".to_string(),
        }],
        main_workout: vec![MainExercise {
            exercise: "Goblet Squat".to_string(),
            muscle_group: "Legs".to_string(),
            sets: 3,
            reps: "10-12".to_string(),
            rest: "60s".to_string(),
            instructions: "Sit between the hips".to_string(),
            progressive_overload_note: "Heavier bell next time".to_string(),
        }],
        cooldown: vec![TimedExercise {
            exercise: "Quad Stretch".to_string(),
            duration: "30s each side".to_string(),
            description: "Hold gently".to_string(),
        }],
        total_estimated_duration: "30 minutes".to_string(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn insert_and_get_workout() {
    let (pool, db_name) = create_test_db().await;
    let user = insert_test_user(&pool, FitnessGoal::MuscleGain).await;

    let workout = workouts::insert_workout(&pool, user.id, &body("Leg Day"), Provenance::AiGenerated)
        .await
        .expect("insert_workout should succeed");

    assert_eq!(workout.name, "Leg Day");
    assert_eq!(workout.generated_by, Provenance::AiGenerated);
    assert!(!workout.completed);
    assert!(workout.rating.is_none());

    let fetched = workouts::get_workout(&pool, workout.id)
        .await
        .unwrap()
        .expect("workout should exist");
    assert_eq!(fetched.workout_data.0, body("Leg Day"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_workouts_newest_first() {
    let (pool, db_name) = create_test_db().await;
    let user = insert_test_user(&pool, FitnessGoal::MuscleGain).await;
    let other = insert_test_user(&pool, FitnessGoal::Endurance).await;

    for name in ["one", "two", "three", "four"] {
        workouts::insert_workout(&pool, user.id, &body(name), Provenance::Fallback)
            .await
            .unwrap();
    }
    workouts::insert_workout(&pool, other.id, &body("not mine"), Provenance::Fallback)
        .await
        .unwrap();

    let all = workouts::list_workouts_for_user(&pool, user.id).await.unwrap();
    let names: Vec<&str> = all.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["four", "three", "two", "one"]);

    let recent = workouts::list_recent_workouts(&pool, user.id, 3).await.unwrap();
    let names: Vec<&str> = recent.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["four", "three", "two"]);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn record_completion_updates_workout_and_appends_history() {
    let (pool, db_name) = create_test_db().await;
    let user = insert_test_user(&pool, FitnessGoal::WeightLoss).await;
    let workout = workouts::insert_workout(&pool, user.id, &body("Circuit"), Provenance::Fallback)
        .await
        .unwrap();

    let perf = serde_json::json!({"squats": [12, 12, 10]});
    let record = history::record_completion(
        &pool,
        &NewCompletion {
            user_id: user.id,
            workout_id: workout.id,
            performance_data: &perf,
            notes: Some("felt strong"),
            rating: Some(4),
            difficulty_rating: Some(6),
            feedback: Some("felt strong"),
        },
    )
    .await
    .unwrap()
    .expect("completion should be recorded");

    assert_eq!(record.workout_id, workout.id);
    assert_eq!(record.performance_data, perf);
    assert_eq!(record.notes.as_deref(), Some("felt strong"));

    let updated = workouts::get_workout(&pool, workout.id).await.unwrap().unwrap();
    assert!(updated.completed);
    assert_eq!(updated.rating, Some(4));
    assert_eq!(updated.difficulty_rating, Some(6));
    let first_completed_at = updated.completed_at.expect("completion time stamped");

    // A second completion without a rating keeps the earlier values.
    let empty = serde_json::json!({});
    history::record_completion(
        &pool,
        &NewCompletion {
            user_id: user.id,
            workout_id: workout.id,
            performance_data: &empty,
            notes: None,
            rating: None,
            difficulty_rating: None,
            feedback: None,
        },
    )
    .await
    .unwrap()
    .expect("second completion recorded");

    let again = workouts::get_workout(&pool, workout.id).await.unwrap().unwrap();
    assert!(again.completed);
    assert_eq!(again.rating, Some(4));
    assert_eq!(again.completed_at, Some(first_completed_at));

    let rows = history::list_history_for_workout(&pool, workout.id).await.unwrap();
    assert_eq!(rows.len(), 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn record_completion_rejects_foreign_or_missing_workout() {
    let (pool, db_name) = create_test_db().await;
    let owner = insert_test_user(&pool, FitnessGoal::WeightLoss).await;
    let stranger = insert_test_user(&pool, FitnessGoal::WeightLoss).await;
    let workout = workouts::insert_workout(&pool, owner.id, &body("Mine"), Provenance::Fallback)
        .await
        .unwrap();

    let perf = serde_json::json!({});
    for (user_id, workout_id) in [
        (stranger.id, workout.id),
        (owner.id, uuid::Uuid::new_v4()),
    ] {
        let result = history::record_completion(
            &pool,
            &NewCompletion {
                user_id,
                workout_id,
                performance_data: &perf,
                notes: None,
                rating: Some(5),
                difficulty_rating: None,
                feedback: None,
            },
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    let untouched = workouts::get_workout(&pool, workout.id).await.unwrap().unwrap();
    assert!(!untouched.completed);
    assert!(untouched.rating.is_none());
    assert!(
        history::list_history_for_workout(&pool, workout.id)
            .await
            .unwrap()
            .is_empty()
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn workout_counts() {
    let (pool, db_name) = create_test_db().await;
    let user = insert_test_user(&pool, FitnessGoal::GeneralFitness).await;

    let empty = workouts::get_workout_counts(&pool, user.id).await.unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.completed, 0);
    assert!(empty.average_rating.is_none());

    let perf = serde_json::json!({});
    for (idx, rating) in [Some(5), Some(2), None].into_iter().enumerate() {
        let w = workouts::insert_workout(&pool, user.id, &body(&format!("w{idx}")), Provenance::Fallback)
            .await
            .unwrap();
        history::record_completion(
            &pool,
            &NewCompletion {
                user_id: user.id,
                workout_id: w.id,
                performance_data: &perf,
                notes: None,
                rating,
                difficulty_rating: None,
                feedback: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    }
    workouts::insert_workout(&pool, user.id, &body("pending"), Provenance::Fallback)
        .await
        .unwrap();

    let counts = workouts::get_workout_counts(&pool, user.id).await.unwrap();
    assert_eq!(counts.total, 4);
    assert_eq!(counts.completed, 3);
    let avg = counts.average_rating.expect("two rated workouts");
    assert!((avg - 3.5).abs() < f64::EPSILON);

    pool.close().await;
    drop_test_db(&db_name).await;
}
