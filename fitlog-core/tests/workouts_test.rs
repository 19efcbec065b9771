mod common;

use common::*;
use fitlog::FitlogError;
use fitlog::db::models::{NewWorkout, NewWorkoutDetail, WorkoutDetail, WorkoutType};
use fitlog::db::workouts;

#[tokio::test]
async fn test_run_with_separately_added_interval_lists_distance() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    let workout = add_run(
        pool,
        user.user_id,
        "2024-01-01T08:00:00",
        "2024-01-01T08:30:00",
        vec![],
    )
    .await;
    assert_eq!(workout.workout_id, 1);

    workouts::add_run_interval(pool, workout.workout_id, &interval(1, 5.0, "05:00"))
        .await
        .unwrap();

    let listing = workouts::get_all_workouts(pool).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].workout_id, 1);
    assert_eq!(listing[0].user_name, "Ann Lee");
    assert_eq!(listing[0].workout_type, WorkoutType::Run);
    assert_eq!(listing[0].distance, Some(5.0));
    assert_eq!(listing[0].start_time, dt("2024-01-01T08:00:00"));
    assert_eq!(listing[0].end_time, dt("2024-01-01T08:30:00"));
}

#[tokio::test]
async fn test_listing_sums_intervals_into_one_row() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;
    add_run(
        pool,
        user.user_id,
        "2024-01-01T08:00:00",
        "2024-01-01T08:40:00",
        vec![interval(1, 2.5, "05:00"), interval(2, 3.0, "05:30")],
    )
    .await;

    let listing = workouts::get_all_workouts(pool).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].distance, Some(5.5));
}

#[tokio::test]
async fn test_end_not_after_start_is_rejected() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    for end in ["2024-01-01T08:00:00", "2024-01-01T07:59:00"] {
        let err = workouts::add_workout(
            pool,
            &NewWorkout {
                user_id: user.user_id,
                start_time: dt("2024-01-01T08:00:00"),
                end_time: dt(end),
                max_hr: None,
                detail: NewWorkoutDetail::Run(vec![]),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FitlogError::InvalidInput(_)));
    }
    assert_eq!(count(pool, "workouts").await, 0);

    // the table enforces it as well
    let raw = sqlx::query(
        "INSERT INTO workouts (user_id, start_time, end_time, workout_type)
         VALUES (?1, '2024-01-01 08:00:00', '2024-01-01 08:00:00', 'Run')",
    )
    .bind(user.user_id)
    .execute(pool)
    .await
    .unwrap_err();
    assert!(FitlogError::from(raw).is_constraint_violation());
}

#[tokio::test]
async fn test_unknown_workout_type_is_rejected_by_the_table() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    let raw = sqlx::query(
        "INSERT INTO workouts (user_id, start_time, end_time, workout_type)
         VALUES (?1, '2024-01-01 08:00:00', '2024-01-01 09:00:00', 'Swim')",
    )
    .bind(user.user_id)
    .execute(pool)
    .await
    .unwrap_err();
    assert!(FitlogError::from(raw).is_constraint_violation());
}

#[tokio::test]
async fn test_failed_detail_rolls_back_the_whole_workout() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    // exercise 99 does not exist, so the second set violates the foreign key
    let err = workouts::add_workout(
        pool,
        &NewWorkout {
            user_id: user.user_id,
            start_time: dt("2024-01-01T18:00:00"),
            end_time: dt("2024-01-01T19:00:00"),
            max_hr: Some(130),
            detail: NewWorkoutDetail::Weightlift(vec![set(99, 1, 10, 20.0)]),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");

    assert_eq!(count(pool, "workouts").await, 0);
    assert_eq!(count(pool, "weightlift_sets").await, 0);
}

#[tokio::test]
async fn test_duplicate_interval_rolls_back_the_whole_run() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;

    let err = workouts::add_workout(
        pool,
        &NewWorkout {
            user_id: user.user_id,
            start_time: dt("2024-01-01T08:00:00"),
            end_time: dt("2024-01-01T08:30:00"),
            max_hr: None,
            detail: NewWorkoutDetail::Run(vec![
                interval(1, 2.0, "05:00"),
                interval(1, 3.0, "05:10"),
            ]),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_constraint_violation());
    assert_eq!(count(pool, "workouts").await, 0);
    assert_eq!(count(pool, "run_intervals").await, 0);
}

#[tokio::test]
async fn test_workout_for_unknown_user_is_a_constraint_violation() {
    let tracker = tracker().await;
    let pool = tracker.pool();

    let err = workouts::add_workout(
        pool,
        &NewWorkout {
            user_id: 5,
            start_time: dt("2024-01-01T08:00:00"),
            end_time: dt("2024-01-01T08:30:00"),
            max_hr: None,
            detail: NewWorkoutDetail::Run(vec![]),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn test_detail_must_match_workout_type() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;
    let bench = add_exercise(pool, "Bench Press", "Chest").await;

    let run = add_run(
        pool,
        user.user_id,
        "2024-01-01T08:00:00",
        "2024-01-01T08:30:00",
        vec![],
    )
    .await;
    let lift = add_weightlift(
        pool,
        user.user_id,
        "2024-01-02T18:00:00",
        "2024-01-02T19:00:00",
        vec![],
    )
    .await;

    let err = workouts::add_weightlift_set(pool, run.workout_id, &set(bench.exercise_id, 1, 8, 60.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FitlogError::WorkoutTypeMismatch {
            expected: "Weightlift",
            ..
        }
    ));

    let err = workouts::add_run_interval(pool, lift.workout_id, &interval(1, 1.0, "05:00"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FitlogError::WorkoutTypeMismatch { expected: "Run", .. }
    ));

    let err = workouts::add_run_interval(pool, 404, &interval(1, 1.0, "05:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { entity: "workout" }));
}

#[tokio::test]
async fn test_weightlift_workout_keeps_set_order() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;
    let squat = add_exercise(pool, "Squat", "Legs").await;
    let bench = add_exercise(pool, "Bench Press", "Chest").await;

    let workout = add_weightlift(
        pool,
        user.user_id,
        "2024-01-02T18:00:00",
        "2024-01-02T19:00:00",
        vec![
            set(squat.exercise_id, 1, 5, 100.0),
            set(squat.exercise_id, 2, 5, 100.0),
            set(bench.exercise_id, 1, 8, 60.0),
        ],
    )
    .await;
    workouts::add_weightlift_set(pool, workout.workout_id, &set(bench.exercise_id, 2, 6, 62.5))
        .await
        .unwrap();

    let loaded = workouts::get_workout(pool, workout.workout_id).await.unwrap();
    assert_eq!(loaded.workout_type(), WorkoutType::Weightlift);
    assert_eq!(loaded.duration_minutes(), 60.0);
    assert_eq!(loaded.total_distance(), None);
    match loaded.detail {
        WorkoutDetail::Weightlift(sets) => {
            let order: Vec<(i64, i64)> = sets.iter().map(|s| (s.exercise_id, s.set_nr)).collect();
            assert_eq!(
                order,
                vec![
                    (squat.exercise_id, 1),
                    (squat.exercise_id, 2),
                    (bench.exercise_id, 1),
                    (bench.exercise_id, 2),
                ]
            );
            assert_eq!(sets[3].weight, 62.5);
        }
        other => panic!("expected weightlift detail, got {other:?}"),
    }

    let listing = workouts::get_all_workouts(pool).await.unwrap();
    assert_eq!(listing[0].distance, None);
}

#[tokio::test]
async fn test_delete_workout_removes_its_detail_rows() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let user = add_user(pool, "Ann", "Lee").await;
    let run = add_run(
        pool,
        user.user_id,
        "2024-01-01T08:00:00",
        "2024-01-01T08:30:00",
        vec![interval(1, 2.0, "05:00"), interval(2, 2.0, "04:50")],
    )
    .await;

    workouts::delete_workout(pool, run.workout_id).await.unwrap();

    assert_eq!(count(pool, "workouts").await, 0);
    assert_eq!(count(pool, "run_intervals").await, 0);
    let err = workouts::get_workout(pool, run.workout_id).await.unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { .. }));
    let err = workouts::delete_workout(pool, run.workout_id).await.unwrap_err();
    assert!(matches!(err, FitlogError::NotFound { .. }));
}

#[tokio::test]
async fn test_user_workouts_are_recent_first_and_limited() {
    let tracker = tracker().await;
    let pool = tracker.pool();
    let ann = add_user(pool, "Ann", "Lee").await;
    let bob = add_user(pool, "Bob", "Ray").await;

    for day in 1..=4 {
        add_run(
            pool,
            ann.user_id,
            &format!("2024-01-0{day}T08:00:00"),
            &format!("2024-01-0{day}T08:30:00"),
            vec![interval(1, day as f64, "05:00")],
        )
        .await;
    }
    add_run(
        pool,
        bob.user_id,
        "2024-01-09T08:00:00",
        "2024-01-09T08:30:00",
        vec![],
    )
    .await;

    let recent = workouts::get_user_workouts(pool, ann.user_id, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].start_time, dt("2024-01-04T08:00:00"));
    assert_eq!(recent[1].start_time, dt("2024-01-03T08:00:00"));
    assert!(recent.iter().all(|w| w.user_name == "Ann Lee"));
}
