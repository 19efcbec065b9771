#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use fitlog::Tracker;
use fitlog::db::models::{
    Exercise, NewExercise, NewRunInterval, NewUser, NewWeightliftSet, NewWorkout,
    NewWorkoutDetail, Sex, User, Workout,
};
use fitlog::db::{exercises, users, workouts};
use sqlx::SqlitePool;

/// Fresh migrated in-memory database.
pub async fn tracker() -> Tracker {
    Tracker::open_in_memory()
        .await
        .expect("Failed to open in-memory database")
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

pub fn dt(s: &str) -> NaiveDateTime {
    s.parse().expect("valid datetime")
}

pub fn new_user(first_name: &str, last_name: &str) -> NewUser {
    NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        weight: 65.0,
        date_of_birth: date("1995-05-01"),
        sex: Sex::Female,
    }
}

pub async fn add_user(pool: &SqlitePool, first_name: &str, last_name: &str) -> User {
    users::add_user(pool, &new_user(first_name, last_name))
        .await
        .expect("Failed to add user")
}

pub async fn add_exercise(pool: &SqlitePool, name: &str, muscle_group: &str) -> Exercise {
    exercises::add_exercise(
        pool,
        &NewExercise {
            name: name.to_string(),
            muscle_group: Some(muscle_group.to_string()),
        },
    )
    .await
    .expect("Failed to add exercise")
}

pub fn interval(interval_nr: i64, distance: f64, pace: &str) -> NewRunInterval {
    NewRunInterval {
        interval_nr,
        distance,
        pace: pace.to_string(),
        incline: Some(1.0),
    }
}

pub fn set(exercise_id: i64, set_nr: i64, reps: i64, weight: f64) -> NewWeightliftSet {
    NewWeightliftSet {
        exercise_id,
        set_nr,
        reps,
        weight,
    }
}

pub async fn add_run(
    pool: &SqlitePool,
    user_id: i64,
    start: &str,
    end: &str,
    intervals: Vec<NewRunInterval>,
) -> Workout {
    workouts::add_workout(
        pool,
        &NewWorkout {
            user_id,
            start_time: dt(start),
            end_time: dt(end),
            max_hr: Some(150),
            detail: NewWorkoutDetail::Run(intervals),
        },
    )
    .await
    .expect("Failed to add run")
}

pub async fn add_weightlift(
    pool: &SqlitePool,
    user_id: i64,
    start: &str,
    end: &str,
    sets: Vec<NewWeightliftSet>,
) -> Workout {
    workouts::add_workout(
        pool,
        &NewWorkout {
            user_id,
            start_time: dt(start),
            end_time: dt(end),
            max_hr: Some(130),
            detail: NewWorkoutDetail::Weightlift(sets),
        },
    )
    .await
    .expect("Failed to add weightlift workout")
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
