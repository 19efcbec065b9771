use chrono::NaiveDate;
use log::{debug, info};
use sqlx::SqlitePool;

use crate::db::models::{
    HealthMetric, HealthRecord, HealthRecordListing, HealthTrendPoint, NewHealthRecord,
    UpdateHealthRecord,
};
use crate::error::{FitlogError, Result};

const RECORD_COLUMNS: &str =
    "user_id, record_date, heart_rate, vo2max, hr_variation, sleep_time, sleep_quality";

pub async fn add_health_record(pool: &SqlitePool, record: &NewHealthRecord) -> Result<HealthRecord> {
    record.measurements.validate()?;

    let m = &record.measurements;
    let created = sqlx::query_as::<_, HealthRecord>(&format!(
        "INSERT INTO health_records ({RECORD_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(record.user_id)
    .bind(record.record_date)
    .bind(m.heart_rate)
    .bind(m.vo2max)
    .bind(m.hr_variation)
    .bind(m.sleep_time)
    .bind(m.sleep_quality)
    .fetch_one(pool)
    .await?;

    info!(
        "Recorded health metrics for user {} on {}",
        created.user_id, created.record_date
    );
    Ok(created)
}

pub async fn get_health_record(
    pool: &SqlitePool,
    user_id: i64,
    record_date: NaiveDate,
) -> Result<HealthRecord> {
    sqlx::query_as::<_, HealthRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM health_records WHERE user_id = ?1 AND record_date = ?2"
    ))
    .bind(user_id)
    .bind(record_date)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("health record"))
}

pub async fn get_all_health_records(pool: &SqlitePool) -> Result<Vec<HealthRecordListing>> {
    let records = sqlx::query_as::<_, HealthRecordListing>(
        "SELECT u.first_name || ' ' || u.last_name AS user_name,
                h.user_id, h.record_date, h.heart_rate, h.vo2max,
                h.hr_variation, h.sleep_time, h.sleep_quality
         FROM health_records h
         JOIN users u ON u.user_id = h.user_id
         ORDER BY h.record_date DESC, h.user_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Newest first.
pub async fn get_user_health_records(pool: &SqlitePool, user_id: i64) -> Result<Vec<HealthRecord>> {
    let records = sqlx::query_as::<_, HealthRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM health_records
         WHERE user_id = ?1
         ORDER BY record_date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

pub async fn update_health_record(
    pool: &SqlitePool,
    user_id: i64,
    record_date: NaiveDate,
    update: &UpdateHealthRecord,
) -> Result<HealthRecord> {
    update.validate()?;
    if update.is_empty() {
        debug!("No measurements supplied for user {} on {}", user_id, record_date);
        return get_health_record(pool, user_id, record_date).await;
    }

    let updated = sqlx::query_as::<_, HealthRecord>(&format!(
        "UPDATE health_records SET
            heart_rate = COALESCE(?1, heart_rate),
            vo2max = COALESCE(?2, vo2max),
            hr_variation = COALESCE(?3, hr_variation),
            sleep_time = COALESCE(?4, sleep_time),
            sleep_quality = COALESCE(?5, sleep_quality)
         WHERE user_id = ?6 AND record_date = ?7
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(update.heart_rate)
    .bind(update.vo2max)
    .bind(update.hr_variation)
    .bind(update.sleep_time)
    .bind(update.sleep_quality)
    .bind(user_id)
    .bind(record_date)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| FitlogError::not_found("health record"))?;

    info!("Updated health record for user {} on {}", user_id, record_date);
    Ok(updated)
}

pub async fn delete_health_record(
    pool: &SqlitePool,
    user_id: i64,
    record_date: NaiveDate,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM health_records WHERE user_id = ?1 AND record_date = ?2")
        .bind(user_id)
        .bind(record_date)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(FitlogError::not_found("health record"));
    }
    info!("Deleted health record for user {} on {}", user_id, record_date);
    Ok(result.rows_affected())
}

/// Oldest first, one point per recorded day. Days without the metric carry `None`.
pub async fn get_health_trend(
    pool: &SqlitePool,
    user_id: i64,
    metric: HealthMetric,
) -> Result<Vec<HealthTrendPoint>> {
    // column comes from a closed enum, never from input
    let points = sqlx::query_as::<_, HealthTrendPoint>(&format!(
        "SELECT record_date, CAST({} AS REAL) AS value
         FROM health_records
         WHERE user_id = ?1
         ORDER BY record_date ASC",
        metric.column()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(points)
}
