use log::{debug, info};
use sqlx::SqlitePool;

use crate::db::models::{NewUser, UpdateUser, User};
use crate::error::{FitlogError, Result};

pub async fn add_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    user.validate()?;

    let created = sqlx::query_as::<_, User>(
        "INSERT INTO users (first_name, last_name, weight, date_of_birth, sex)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING user_id, first_name, last_name, weight, date_of_birth, sex",
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.weight)
    .bind(user.date_of_birth)
    .bind(user.sex.as_str())
    .fetch_one(pool)
    .await?;

    info!("Created user {} ({})", created.user_id, created.full_name());
    Ok(created)
}

pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        "SELECT user_id, first_name, last_name, weight, date_of_birth, sex
         FROM users WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("user"))
}

pub async fn get_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT user_id, first_name, last_name, weight, date_of_birth, sex
         FROM users ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// `(user_id, "First Last")` pairs for pickers.
pub async fn get_user_names(pool: &SqlitePool) -> Result<Vec<(i64, String)>> {
    let names = sqlx::query_as::<_, (i64, String)>(
        "SELECT user_id, first_name || ' ' || last_name FROM users ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

/// Applies the supplied fields and returns the stored user.
pub async fn update_user(pool: &SqlitePool, user_id: i64, update: &UpdateUser) -> Result<User> {
    update.validate()?;
    if update.is_empty() {
        debug!("No fields supplied for user {}, nothing to update", user_id);
        return get_user_by_id(pool, user_id).await;
    }

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET
            first_name = COALESCE(?1, first_name),
            last_name = COALESCE(?2, last_name),
            weight = COALESCE(?3, weight),
            date_of_birth = COALESCE(?4, date_of_birth),
            sex = COALESCE(?5, sex)
         WHERE user_id = ?6
         RETURNING user_id, first_name, last_name, weight, date_of_birth, sex",
    )
    .bind(update.first_name.as_deref())
    .bind(update.last_name.as_deref())
    .bind(update.weight)
    .bind(update.date_of_birth)
    .bind(update.sex.map(|s| s.as_str()))
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("user"))?;

    info!("Updated user {}", user_id);
    Ok(updated)
}

/// Deletes the user; health records, goals and workouts go with it.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(FitlogError::not_found("user"));
    }
    info!("Deleted user {}", user_id);
    Ok(result.rows_affected())
}
