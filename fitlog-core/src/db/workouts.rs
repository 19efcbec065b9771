//! Workouts and their type-specific detail rows.
//!
//! A workout is either a run (ordered intervals) or a weightlifting session
//! (sets keyed by exercise and set number). Detail rows are only ever attached
//! to a workout of the matching type.

use log::{debug, info};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{
    NewRunInterval, NewWeightliftSet, NewWorkout, NewWorkoutDetail, RunInterval, WeightliftSet,
    Workout, WorkoutDetail, WorkoutListing, WorkoutRow, WorkoutType,
};
use crate::error::{FitlogError, Result};

const LISTING_SELECT: &str = "SELECT
        w.workout_id,
        u.first_name || ' ' || u.last_name AS user_name,
        w.start_time,
        w.end_time,
        w.workout_type,
        CASE WHEN w.workout_type = 'Run' THEN (
            SELECT SUM(r.distance) FROM run_intervals r WHERE r.workout_id = w.workout_id
        ) END AS distance
     FROM workouts w
     JOIN users u ON u.user_id = w.user_id";

/// Inserts the workout and every detail row in one transaction. Any failure
/// leaves no trace of the workout.
pub async fn add_workout(pool: &SqlitePool, workout: &NewWorkout) -> Result<Workout> {
    workout.validate()?;

    let mut tx = pool.begin().await?;

    let workout_id = sqlx::query(
        "INSERT INTO workouts (user_id, start_time, end_time, max_hr, workout_type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(workout.user_id)
    .bind(workout.start_time)
    .bind(workout.end_time)
    .bind(workout.max_hr)
    .bind(workout.detail.workout_type().as_str())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    match &workout.detail {
        NewWorkoutDetail::Run(intervals) => {
            for interval in intervals {
                insert_run_interval(&mut tx, workout_id, interval).await?;
            }
        }
        NewWorkoutDetail::Weightlift(sets) => {
            for set in sets {
                insert_weightlift_set(&mut tx, workout_id, set).await?;
            }
        }
    }

    let created = load_workout(&mut tx, workout_id).await?;
    tx.commit().await?;

    info!(
        "Created {} workout {} for user {}",
        created.workout_type(),
        workout_id,
        created.user_id
    );
    Ok(created)
}

pub async fn add_run_interval(
    pool: &SqlitePool,
    workout_id: i64,
    interval: &NewRunInterval,
) -> Result<RunInterval> {
    interval.validate()?;

    let mut tx = pool.begin().await?;
    ensure_workout_type(&mut tx, workout_id, WorkoutType::Run).await?;
    let created = insert_run_interval(&mut tx, workout_id, interval).await?;
    tx.commit().await?;

    debug!(
        "Added interval {} to workout {}",
        created.interval_nr, workout_id
    );
    Ok(created)
}

pub async fn add_weightlift_set(
    pool: &SqlitePool,
    workout_id: i64,
    set: &NewWeightliftSet,
) -> Result<WeightliftSet> {
    set.validate()?;

    let mut tx = pool.begin().await?;
    ensure_workout_type(&mut tx, workout_id, WorkoutType::Weightlift).await?;
    let created = insert_weightlift_set(&mut tx, workout_id, set).await?;
    tx.commit().await?;

    debug!(
        "Added set {} of exercise {} to workout {}",
        created.set_nr, created.exercise_id, workout_id
    );
    Ok(created)
}

pub async fn get_workout(pool: &SqlitePool, workout_id: i64) -> Result<Workout> {
    let mut conn = pool.acquire().await?;
    load_workout(&mut conn, workout_id).await
}

/// One row per workout, most recent first.
pub async fn get_all_workouts(pool: &SqlitePool) -> Result<Vec<WorkoutListing>> {
    let workouts = sqlx::query_as::<_, WorkoutListing>(&format!(
        "{LISTING_SELECT} ORDER BY w.start_time DESC, w.workout_id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(workouts)
}

pub async fn get_user_workouts(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<WorkoutListing>> {
    let workouts = sqlx::query_as::<_, WorkoutListing>(&format!(
        "{LISTING_SELECT}
         WHERE w.user_id = ?1
         ORDER BY w.start_time DESC, w.workout_id DESC
         LIMIT ?2"
    ))
    .bind(user_id)
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;
    Ok(workouts)
}

/// Deletes the workout together with its intervals or sets.
pub async fn delete_workout(pool: &SqlitePool, workout_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM workouts WHERE workout_id = ?1")
        .bind(workout_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(FitlogError::not_found("workout"));
    }
    info!("Deleted workout {}", workout_id);
    Ok(result.rows_affected())
}

async fn ensure_workout_type(
    conn: &mut SqliteConnection,
    workout_id: i64,
    expected: WorkoutType,
) -> Result<()> {
    let stored: String =
        sqlx::query_scalar("SELECT workout_type FROM workouts WHERE workout_id = ?1")
            .bind(workout_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| FitlogError::not_found("workout"))?;

    let actual: WorkoutType = stored.parse()?;
    if actual != expected {
        return Err(FitlogError::WorkoutTypeMismatch {
            workout_id,
            expected: expected.as_str(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

async fn insert_run_interval(
    conn: &mut SqliteConnection,
    workout_id: i64,
    interval: &NewRunInterval,
) -> Result<RunInterval> {
    let created = sqlx::query_as::<_, RunInterval>(
        "INSERT INTO run_intervals (workout_id, interval_nr, distance, pace, incline)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING workout_id, interval_nr, distance, pace, incline",
    )
    .bind(workout_id)
    .bind(interval.interval_nr)
    .bind(interval.distance)
    .bind(&interval.pace)
    .bind(interval.incline)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

async fn insert_weightlift_set(
    conn: &mut SqliteConnection,
    workout_id: i64,
    set: &NewWeightliftSet,
) -> Result<WeightliftSet> {
    let created = sqlx::query_as::<_, WeightliftSet>(
        "INSERT INTO weightlift_sets (workout_id, exercise_id, set_nr, reps, weight)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING workout_id, exercise_id, set_nr, reps, weight",
    )
    .bind(workout_id)
    .bind(set.exercise_id)
    .bind(set.set_nr)
    .bind(set.reps)
    .bind(set.weight)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

async fn load_workout(conn: &mut SqliteConnection, workout_id: i64) -> Result<Workout> {
    let row = sqlx::query_as::<_, WorkoutRow>(
        "SELECT workout_id, user_id, start_time, end_time, max_hr, workout_type
         FROM workouts WHERE workout_id = ?1",
    )
    .bind(workout_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| FitlogError::not_found("workout"))?;

    let detail = match row.workout_type {
        WorkoutType::Run => {
            let intervals = sqlx::query_as::<_, RunInterval>(
                "SELECT workout_id, interval_nr, distance, pace, incline
                 FROM run_intervals WHERE workout_id = ?1
                 ORDER BY interval_nr",
            )
            .bind(workout_id)
            .fetch_all(&mut *conn)
            .await?;
            WorkoutDetail::Run(intervals)
        }
        WorkoutType::Weightlift => {
            let sets = sqlx::query_as::<_, WeightliftSet>(
                "SELECT workout_id, exercise_id, set_nr, reps, weight
                 FROM weightlift_sets WHERE workout_id = ?1
                 ORDER BY rowid",
            )
            .bind(workout_id)
            .fetch_all(&mut *conn)
            .await?;
            WorkoutDetail::Weightlift(sets)
        }
    };

    Ok(Workout {
        workout_id: row.workout_id,
        user_id: row.user_id,
        start_time: row.start_time,
        end_time: row.end_time,
        max_hr: row.max_hr,
        detail,
    })
}
