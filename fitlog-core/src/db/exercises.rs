use log::{info, warn};
use sqlx::SqlitePool;

use crate::db::models::{Exercise, MUSCLE_GROUPS, NewExercise, UpdateExercise};
use crate::error::{FitlogError, Result};

pub async fn add_exercise(pool: &SqlitePool, exercise: &NewExercise) -> Result<Exercise> {
    exercise.validate()?;

    let created = sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (name, muscle_group) VALUES (?1, ?2)
         RETURNING exercise_id, name, muscle_group",
    )
    .bind(&exercise.name)
    .bind(exercise.muscle_group.as_deref())
    .fetch_one(pool)
    .await?;

    info!("Created exercise {} ({})", created.exercise_id, created);
    Ok(created)
}

pub async fn get_exercise_by_id(pool: &SqlitePool, exercise_id: i64) -> Result<Exercise> {
    sqlx::query_as::<_, Exercise>(
        "SELECT exercise_id, name, muscle_group FROM exercises WHERE exercise_id = ?1",
    )
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("exercise"))
}

pub async fn get_all_exercises(pool: &SqlitePool) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT exercise_id, name, muscle_group FROM exercises ORDER BY name, exercise_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(exercises)
}

pub async fn update_exercise(
    pool: &SqlitePool,
    exercise_id: i64,
    update: &UpdateExercise,
) -> Result<Exercise> {
    update.validate()?;
    if update.is_empty() {
        return get_exercise_by_id(pool, exercise_id).await;
    }

    let updated = sqlx::query_as::<_, Exercise>(
        "UPDATE exercises SET
            name = COALESCE(?1, name),
            muscle_group = COALESCE(?2, muscle_group)
         WHERE exercise_id = ?3
         RETURNING exercise_id, name, muscle_group",
    )
    .bind(update.name.as_deref())
    .bind(update.muscle_group.as_deref())
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("exercise"))?;

    info!("Updated exercise {}", exercise_id);
    Ok(updated)
}

/// Refuses with [`FitlogError::ExerciseInUse`] while any weightlift set references
/// the exercise. The check and the delete share one transaction.
pub async fn delete_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let set_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM weightlift_sets WHERE exercise_id = ?1")
            .bind(exercise_id)
            .fetch_one(&mut *tx)
            .await?;

    if set_count > 0 {
        warn!(
            "Refusing to delete exercise {}: used in {} workout sets",
            exercise_id, set_count
        );
        return Err(FitlogError::ExerciseInUse {
            exercise_id,
            set_count,
        });
    }

    let result = sqlx::query("DELETE FROM exercises WHERE exercise_id = ?1")
        .bind(exercise_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(FitlogError::not_found("exercise"));
    }

    tx.commit().await?;
    info!("Deleted exercise {}", exercise_id);
    Ok(result.rows_affected())
}

pub fn muscle_groups() -> &'static [&'static str] {
    MUSCLE_GROUPS
}
