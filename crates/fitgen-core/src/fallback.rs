//! Built-in workouts used when the model cannot produce one.
//!
//! Both templates need no equipment so they suit any profile.

use fitgen_db::models::{FitnessGoal, MainExercise, TimedExercise, WorkoutBody};

fn timed(exercise: &str, duration: &str, description: &str) -> TimedExercise {
    TimedExercise {
        exercise: exercise.to_owned(),
        duration: duration.to_owned(),
        description: description.to_owned(),
    }
}

fn main_exercise(
    exercise: &str,
    muscle_group: &str,
    sets: u32,
    reps: &str,
    rest: &str,
    instructions: &str,
    progressive_overload_note: &str,
) -> MainExercise {
    MainExercise {
        exercise: exercise.to_owned(),
        muscle_group: muscle_group.to_owned(),
        sets,
        reps: reps.to_owned(),
        rest: rest.to_owned(),
        instructions: instructions.to_owned(),
        progressive_overload_note: progressive_overload_note.to_owned(),
    }
}

/// The fallback workout for `goal`.
///
/// `WeightLoss` gets a conditioning circuit; every other goal gets a
/// full-body strength session.
pub fn fallback_plan(goal: FitnessGoal) -> WorkoutBody {
    match goal {
        FitnessGoal::WeightLoss => fat_burn_circuit(),
        FitnessGoal::MuscleGain
        | FitnessGoal::Endurance
        | FitnessGoal::GeneralFitness
        | FitnessGoal::SportsSpecific => full_body_strength(),
    }
}

fn fat_burn_circuit() -> WorkoutBody {
    WorkoutBody {
        workout_name: "Fat Burn Circuit".to_owned(),
        warmup: vec![
            timed("Marching in Place", "2 minutes", "Drive the knees up, swing the arms"),
            timed("Jumping Jacks", "2 minutes", "Moderate pace"),
            timed("Hip Circles", "1 minute", "Both directions"),
        ],
        main_workout: vec![
            main_exercise(
                "Bodyweight Squats",
                "Legs",
                3,
                "15-20",
                "30s",
                "Sit back onto the heels and keep the chest up",
                "Add a pulse at the bottom of each rep",
            ),
            main_exercise(
                "Mountain Climbers",
                "Core",
                3,
                "30 seconds",
                "30s",
                "Hips level with the shoulders, drive knees to chest",
                "Increase the work interval by 10 seconds",
            ),
            main_exercise(
                "Incline Push-ups",
                "Chest",
                3,
                "10-12",
                "30s",
                "Hands on a bench or wall, body in one straight line",
                "Lower the incline as they get easier",
            ),
            main_exercise(
                "Alternating Reverse Lunges",
                "Legs",
                3,
                "10 each leg",
                "30s",
                "Step back softly and keep the front knee over the ankle",
                "Add a knee drive on the way up",
            ),
            main_exercise(
                "High Knees",
                "Full Body",
                3,
                "30 seconds",
                "60s",
                "Stay on the balls of the feet",
                "Shorten the rest between rounds",
            ),
        ],
        cooldown: vec![
            timed("Walking", "2 minutes", "Let the heart rate come down"),
            timed("Standing Hamstring Stretch", "30s each side", "Hinge at the hips"),
            timed("Child's Pose", "1 minute", "Breathe slowly"),
        ],
        total_estimated_duration: "30 minutes".to_owned(),
        notes: "Move straight between exercises and rest at the end of each round. \
Stop if you feel dizzy or short of breath."
            .to_owned(),
    }
}

fn full_body_strength() -> WorkoutBody {
    WorkoutBody {
        workout_name: "Full Body Strength".to_owned(),
        warmup: vec![
            timed("Jumping Jacks", "3 minutes", "Moderate pace"),
            timed("Arm Circles", "1 minute", "Forward and backward"),
            timed("Leg Swings", "1 minute", "Front and side"),
        ],
        main_workout: vec![
            main_exercise(
                "Bodyweight Squats",
                "Legs",
                3,
                "12-15",
                "60s",
                "Keep chest up and knees behind toes",
                "Add more reps or go deeper",
            ),
            main_exercise(
                "Push-ups",
                "Chest",
                3,
                "8-12",
                "60s",
                "Brace the core and lower until the chest nearly touches the floor",
                "Add reps, then slow the lowering phase",
            ),
            main_exercise(
                "Glute Bridges",
                "Glutes",
                3,
                "12-15",
                "60s",
                "Squeeze at the top and keep the ribs down",
                "Progress to single-leg bridges",
            ),
            main_exercise(
                "Plank",
                "Core",
                3,
                "30-45 seconds",
                "45s",
                "Straight line from head to heels",
                "Add 10 seconds per hold",
            ),
        ],
        cooldown: vec![
            timed("Quad Stretch", "30s each side", "Hold gently"),
            timed("Hamstring Stretch", "30s each side", "Keep back straight"),
        ],
        total_estimated_duration: "30 minutes".to_owned(),
        notes: "Consult with a fitness professional for personalized guidance".to_owned(),
    }
}
