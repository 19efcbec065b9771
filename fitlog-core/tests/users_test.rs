mod common;

use common::*;
use fitlog::FitlogError;
use fitlog::db::models::{HealthMeasurements, NewGoal, NewHealthRecord, Sex, UpdateUser};
use fitlog::db::{goals, health, users};

#[tokio::test]
async fn test_add_user_round_trips_through_get() {
    let tracker = tracker().await;
    let pool = tracker.pool();

    let input = fitlog::db::models::NewUser {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        weight: 65.0,
        date_of_birth: date("1995-05-01"),
        sex: Sex::Female,
    };
    let created = users::add_user(pool, &input).await.unwrap();
    let fetched = users::get_user_by_id(pool, created.user_id).await.unwrap();

    assert_eq!(fetched.user_id, 1);
    assert_eq!(fetched.first_name, "Ann");
    assert_eq!(fetched.last_name, "Lee");
    assert_eq!(fetched.weight, 65.0);
    assert_eq!(fetched.date_of_birth, date("1995-05-01"));
    assert_eq!(fetched.sex, Sex::Female);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let tracker = tracker().await;
    let err = users::get_user_by_id(tracker.pool(), 42).await.unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { entity: "user" }));
}

#[tokio::test]
async fn test_empty_table_is_not_an_error() {
    let tracker = tracker().await;
    let all = users::get_all_users(tracker.pool()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_update_user_patches_only_supplied_fields() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    let updated = users::update_user(
        pool,
        user.user_id,
        &UpdateUser {
            weight: Some(63.5),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.weight, 63.5);
    assert_eq!(updated.first_name, "Ann");
    assert_eq!(updated.last_name, "Lee");
    assert_eq!(updated.date_of_birth, user.date_of_birth);
    assert_eq!(updated.sex, Sex::Female);

    let unchanged = users::update_user(pool, user.user_id, &UpdateUser::default())
        .await
        .unwrap();
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    let tracker = tracker().await;
    let err = users::update_user(
        tracker.pool(),
        7,
        &UpdateUser {
            first_name: Some("Bo".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { .. }));
}

#[tokio::test]
async fn test_invalid_weight_is_rejected_before_the_database() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let mut input = new_user("Ann", "Lee");
    input.weight = -1.0;

    let err = users::add_user(pool, &input).await.unwrap_err();
    assert!(matches!(err, FitlogError::InvalidInput(_)));
    assert_eq!(count(pool, "users").await, 0);
}

#[tokio::test]
async fn test_check_constraints_guard_raw_inserts() {
    let tracker = tracker().await;
    let pool = tracker.pool();

    let bad_sex = sqlx::query(
        "INSERT INTO users (first_name, last_name, weight, date_of_birth, sex)
         VALUES ('Ann', 'Lee', 60.0, '1995-05-01', 'X')",
    )
    .execute(pool)
    .await
    .unwrap_err();
    assert!(FitlogError::from(bad_sex).is_constraint_violation());

    let bad_weight = sqlx::query(
        "INSERT INTO users (first_name, last_name, weight, date_of_birth, sex)
         VALUES ('Ann', 'Lee', 0, '1995-05-01', 'F')",
    )
    .execute(pool)
    .await
    .unwrap_err();
    assert!(FitlogError::from(bad_weight).is_constraint_violation());
}

#[tokio::test]
async fn test_delete_user_cascades_to_dependents() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;
    let other = add_user(pool, "Bob", "Ray").await;

    health::add_health_record(
        pool,
        &NewHealthRecord {
            user_id: user.user_id,
            record_date: date("2024-01-01"),
            measurements: HealthMeasurements {
                heart_rate: Some(60),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap();
    goals::add_goal(
        pool,
        &NewGoal {
            user_id: user.user_id,
            goal_name: "Run Distance".to_string(),
            amount: 10.0,
            metric: "km".to_string(),
            completed: false,
        },
    )
    .await
    .unwrap();
    add_run(
        pool,
        user.user_id,
        "2024-01-01T08:00:00",
        "2024-01-01T08:30:00",
        vec![interval(1, 5.0, "05:00")],
    )
    .await;
    add_run(
        pool,
        other.user_id,
        "2024-01-02T08:00:00",
        "2024-01-02T08:30:00",
        vec![interval(1, 3.0, "06:00")],
    )
    .await;

    users::delete_user(pool, user.user_id).await.unwrap();

    assert!(health::get_user_health_records(pool, user.user_id)
        .await
        .unwrap()
        .is_empty());
    assert!(goals::get_goals_by_user(pool, user.user_id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(count(pool, "workouts").await, 1);
    assert_eq!(count(pool, "run_intervals").await, 1);
    assert_eq!(count(pool, "users").await, 1);

    let err = users::delete_user(pool, user.user_id).await.unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { .. }));
}

#[tokio::test]
async fn test_user_names_for_pickers() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    add_user(pool, "Ann", "Lee").await;
    add_user(pool, "Bob", "Ray").await;

    let names = users::get_user_names(pool).await.unwrap();
    assert_eq!(
        names,
        vec![(1, "Ann Lee".to_string()), (2, "Bob Ray".to_string())]
    );
}
