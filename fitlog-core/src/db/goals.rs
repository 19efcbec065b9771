use log::{debug, info};
use sqlx::SqlitePool;

use crate::db::models::{COMMON_GOAL_NAMES, COMMON_METRICS, Goal, GoalListing, NewGoal, UpdateGoal};
use crate::error::{FitlogError, Result};

pub async fn add_goal(pool: &SqlitePool, goal: &NewGoal) -> Result<Goal> {
    goal.validate()?;

    let created = sqlx::query_as::<_, Goal>(
        "INSERT INTO goals (user_id, goal_name, amount, metric, completed)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING user_id, goal_name, amount, metric, completed",
    )
    .bind(goal.user_id)
    .bind(&goal.goal_name)
    .bind(goal.amount)
    .bind(&goal.metric)
    .bind(goal.completed)
    .fetch_one(pool)
    .await?;

    info!("Added goal {:?} for user {}", created.goal_name, created.user_id);
    Ok(created)
}

pub async fn get_goal(pool: &SqlitePool, user_id: i64, goal_name: &str) -> Result<Goal> {
    sqlx::query_as::<_, Goal>(
        "SELECT user_id, goal_name, amount, metric, completed
         FROM goals WHERE user_id = ?1 AND goal_name = ?2",
    )
    .bind(user_id)
    .bind(goal_name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("goal"))
}

pub async fn get_all_goals(pool: &SqlitePool) -> Result<Vec<GoalListing>> {
    let goals = sqlx::query_as::<_, GoalListing>(
        "SELECT u.first_name || ' ' || u.last_name AS user_name,
                g.user_id, g.goal_name, g.amount, g.metric, g.completed
         FROM goals g
         JOIN users u ON u.user_id = g.user_id
         ORDER BY g.user_id, g.goal_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

pub async fn get_goals_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT user_id, goal_name, amount, metric, completed
         FROM goals WHERE user_id = ?1
         ORDER BY goal_name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

/// Patches an existing goal. An empty patch returns the goal unchanged.
pub async fn update_goal(
    pool: &SqlitePool,
    user_id: i64,
    goal_name: &str,
    update: &UpdateGoal,
) -> Result<Goal> {
    update.validate()?;
    if update.is_empty() {
        debug!("No changes to goal {:?} of user {}", goal_name, user_id);
        return get_goal(pool, user_id, goal_name).await;
    }

    let updated = sqlx::query_as::<_, Goal>(
        "UPDATE goals SET
            amount = COALESCE(?1, amount),
            metric = COALESCE(?2, metric),
            completed = COALESCE(?3, completed)
         WHERE user_id = ?4 AND goal_name = ?5
         RETURNING user_id, goal_name, amount, metric, completed",
    )
    .bind(update.amount)
    .bind(update.metric.as_deref())
    .bind(update.completed)
    .bind(user_id)
    .bind(goal_name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("goal"))?;

    info!("Updated goal {:?} for user {}", goal_name, user_id);
    Ok(updated)
}

pub async fn mark_goal_completed(pool: &SqlitePool, user_id: i64, goal_name: &str) -> Result<Goal> {
    update_goal(
        pool,
        user_id,
        goal_name,
        &UpdateGoal {
            completed: Some(true),
            ..Default::default()
        },
    )
    .await
}

pub async fn delete_goal(pool: &SqlitePool, user_id: i64, goal_name: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM goals WHERE user_id = ?1 AND goal_name = ?2")
        .bind(user_id)
        .bind(goal_name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(FitlogError::not_found("goal"));
    }
    info!("Deleted goal {:?} for user {}", goal_name, user_id);
    Ok(result.rows_affected())
}

/// Suggested goal names. Goals may use any name.
pub fn common_goal_names() -> &'static [&'static str] {
    COMMON_GOAL_NAMES
}

pub fn common_metrics() -> &'static [&'static str] {
    COMMON_METRICS
}
