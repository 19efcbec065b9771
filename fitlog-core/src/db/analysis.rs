use sqlx::SqlitePool;

use crate::db::models::{
    ExerciseEffectiveness, UserActivitySummary, UserProgress, WorkoutDurationStat,
};
use crate::error::Result;

/// Goal name the `exercise_effectiveness` view correlates with.
pub const DEFAULT_RELATED_GOAL: &str = "Lift Weights";

/// Every user appears, including users with no workouts, health records or goals.
pub async fn get_user_progress_overview(pool: &SqlitePool) -> Result<Vec<UserProgress>> {
    let rows = sqlx::query_as::<_, UserProgress>(
        "SELECT user_id, first_name, last_name, total_workouts, total_workout_minutes,
                avg_vo2max, avg_hr_variation, avg_sleep_time, completed_goals, pending_goals
         FROM user_progress_overview
         ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Only exercises with at least one recorded set appear.
pub async fn get_exercise_effectiveness(pool: &SqlitePool) -> Result<Vec<ExerciseEffectiveness>> {
    let rows = sqlx::query_as::<_, ExerciseEffectiveness>(
        "SELECT exercise_id, exercise_name, muscle_group, times_performed, users_performed,
                avg_weight, avg_reps, related_goals_completed
         FROM exercise_effectiveness
         ORDER BY exercise_name, exercise_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Same aggregate as the view, correlated with completions of `goal_name`.
///
/// The `exercise_effectiveness` view is the canonical definition; this query
/// must stay identical to it apart from the goal name. `analysis_test`
/// compares both for [`DEFAULT_RELATED_GOAL`].
pub async fn get_exercise_effectiveness_for_goal(
    pool: &SqlitePool,
    goal_name: &str,
) -> Result<Vec<ExerciseEffectiveness>> {
    let rows = sqlx::query_as::<_, ExerciseEffectiveness>(
        "SELECT
            e.exercise_id,
            e.name AS exercise_name,
            e.muscle_group,
            COUNT(DISTINCT w.workout_id) AS times_performed,
            COUNT(DISTINCT w.user_id) AS users_performed,
            AVG(s.weight) AS avg_weight,
            AVG(s.reps) AS avg_reps,
            (
                SELECT COUNT(*)
                FROM goals g
                WHERE g.completed = 1
                  AND g.goal_name = ?1
                  AND g.user_id IN (
                      SELECT w2.user_id
                      FROM weightlift_sets s2
                      JOIN workouts w2 ON w2.workout_id = s2.workout_id
                      WHERE s2.exercise_id = e.exercise_id
                  )
            ) AS related_goals_completed
         FROM exercises e
         JOIN weightlift_sets s ON s.exercise_id = e.exercise_id
         JOIN workouts w ON w.workout_id = s.workout_id
         GROUP BY e.exercise_id, e.name, e.muscle_group
         ORDER BY e.name, e.exercise_id",
    )
    .bind(goal_name)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Average workout length per user and workout type.
pub async fn get_workout_duration_stats(pool: &SqlitePool) -> Result<Vec<WorkoutDurationStat>> {
    let rows = sqlx::query_as::<_, WorkoutDurationStat>(
        "SELECT
            u.user_id,
            u.first_name || ' ' || u.last_name AS user_name,
            w.workout_type,
            COUNT(*) AS workouts,
            AVG((strftime('%s', w.end_time) - strftime('%s', w.start_time)) / 60.0)
                AS avg_duration_minutes
         FROM workouts w
         JOIN users u ON u.user_id = w.user_id
         GROUP BY u.user_id, u.first_name, u.last_name, w.workout_type
         ORDER BY u.user_id, w.workout_type",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_user_activity_summary(pool: &SqlitePool) -> Result<Vec<UserActivitySummary>> {
    let rows = sqlx::query_as::<_, UserActivitySummary>(
        "SELECT
            u.user_id,
            u.first_name || ' ' || u.last_name AS user_name,
            COUNT(w.workout_id) AS total_workouts,
            COUNT(CASE WHEN w.workout_type = 'Run' THEN 1 END) AS run_workouts,
            COUNT(CASE WHEN w.workout_type = 'Weightlift' THEN 1 END) AS weightlift_workouts
         FROM users u
         LEFT JOIN workouts w ON w.user_id = u.user_id
         GROUP BY u.user_id, u.first_name, u.last_name
         ORDER BY u.user_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
