use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenvy::dotenv;
use log::{debug, info};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use fitlog::db::models::{
    DisplayableSet, HealthMeasurements, HealthMetric, NewExercise, NewGoal, NewHealthRecord,
    NewRunInterval, NewUser, NewWeightliftSet, NewWorkout, NewWorkoutDetail, Sex, UpdateExercise,
    UpdateGoal, UpdateUser, WorkoutDetail,
};
use fitlog::db::{self, analysis, exercises, goals, health, users, workouts};
use fitlog::logging::{init_logger, parse_level};
use fitlog::{DatabaseConfig, Tracker};

#[derive(Parser, Debug)]
#[command(version, about = "Fitlog - Fitness Tracker CLI", long_about = None)]
struct Args {
    /// Database file or sqlite: URL. Overrides DATABASE_URL.
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Row counts and per-user progress
    Dashboard,
    /// Row counts per table
    Stats,
    /// Delete every row in every table
    Reset {
        #[arg(long)]
        yes: bool,
    },
    #[command(subcommand)]
    Users(UserCommand),
    #[command(subcommand)]
    Health(HealthCommand),
    #[command(subcommand)]
    Goals(GoalCommand),
    #[command(subcommand)]
    Workouts(WorkoutCommand),
    #[command(subcommand)]
    Exercises(ExerciseCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    List,
    Show {
        user_id: i64,
    },
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Body weight in kg
        #[arg(long)]
        weight: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        dob: NaiveDate,
        /// M or F
        #[arg(long)]
        sex: Sex,
    },
    Update {
        user_id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        dob: Option<NaiveDate>,
        #[arg(long)]
        sex: Option<Sex>,
    },
    /// Deletes the user with all health records, goals and workouts
    Delete {
        user_id: i64,
    },
}

#[derive(ClapArgs, Debug)]
struct MeasurementArgs {
    #[arg(long)]
    heart_rate: Option<i64>,
    #[arg(long)]
    vo2max: Option<f64>,
    #[arg(long)]
    hr_variation: Option<i64>,
    /// Hours
    #[arg(long)]
    sleep_time: Option<f64>,
    /// 1 to 10
    #[arg(long)]
    sleep_quality: Option<i64>,
}

impl From<MeasurementArgs> for HealthMeasurements {
    fn from(args: MeasurementArgs) -> Self {
        HealthMeasurements {
            heart_rate: args.heart_rate,
            vo2max: args.vo2max,
            hr_variation: args.hr_variation,
            sleep_time: args.sleep_time,
            sleep_quality: args.sleep_quality,
        }
    }
}

#[derive(Subcommand, Debug)]
enum HealthCommand {
    List {
        #[arg(short, long)]
        user: Option<i64>,
    },
    Add {
        #[arg(short, long)]
        user: i64,
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        measurements: MeasurementArgs,
    },
    Update {
        user_id: i64,
        date: NaiveDate,
        #[command(flatten)]
        measurements: MeasurementArgs,
    },
    Delete {
        user_id: i64,
        date: NaiveDate,
    },
    /// One metric over time, oldest first
    Trend {
        user_id: i64,
        /// heart-rate, vo2max, hr-variation, sleep-time or sleep-quality
        metric: HealthMetric,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    List {
        #[arg(short, long)]
        user: Option<i64>,
    },
    Add {
        #[arg(short, long)]
        user: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        metric: String,
        #[arg(long)]
        completed: bool,
    },
    Update {
        user_id: i64,
        name: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        metric: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    Complete {
        user_id: i64,
        name: String,
    },
    Delete {
        user_id: i64,
        name: String,
    },
    /// Suggested goal names and metrics
    Suggestions,
}

#[derive(Subcommand, Debug)]
enum WorkoutCommand {
    List {
        #[arg(short, long)]
        user: Option<i64>,
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
    Show {
        workout_id: i64,
    },
    /// Create a run. Intervals are given as DISTANCE@MM:SS, numbered in order.
    AddRun {
        #[arg(short, long)]
        user: i64,
        /// YYYY-MM-DDTHH:MM:SS
        #[arg(long)]
        start: NaiveDateTime,
        #[arg(long)]
        end: NaiveDateTime,
        #[arg(long)]
        max_hr: Option<i64>,
        #[arg(long = "interval")]
        intervals: Vec<String>,
    },
    /// Create a weightlifting session. Sets are given as EXERCISE_ID:REPSxWEIGHT.
    AddLift {
        #[arg(short, long)]
        user: i64,
        #[arg(long)]
        start: NaiveDateTime,
        #[arg(long)]
        end: NaiveDateTime,
        #[arg(long)]
        max_hr: Option<i64>,
        #[arg(long = "set")]
        sets: Vec<String>,
    },
    AddInterval {
        workout_id: i64,
        #[arg(long)]
        nr: i64,
        #[arg(long)]
        distance: f64,
        #[arg(long)]
        pace: String,
        #[arg(long)]
        incline: Option<f64>,
    },
    AddSet {
        workout_id: i64,
        #[arg(long)]
        exercise: i64,
        #[arg(long)]
        nr: i64,
        #[arg(long)]
        reps: i64,
        #[arg(long, default_value_t = 0.0)]
        weight: f64,
    },
    Delete {
        workout_id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ExerciseCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        muscle_group: Option<String>,
    },
    Update {
        exercise_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        muscle_group: Option<String>,
    },
    /// Refused while any workout set uses the exercise
    Delete {
        exercise_id: i64,
    },
    MuscleGroups,
}

#[derive(Subcommand, Debug)]
enum AnalyticsCommand {
    Progress,
    Effectiveness {
        /// Goal whose completions are correlated
        #[arg(long)]
        goal: Option<String>,
    },
    Durations,
    Activity,
}

/// Prints `rows` as JSON or one line each.
fn emit<T, F>(json: bool, rows: &[T], line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else if rows.is_empty() {
        println!("(none)");
    } else {
        for row in rows {
            println!("{}", line(row));
        }
    }
    Ok(())
}

fn emit_one<T, F>(json: bool, row: &T, line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(row)?);
    } else {
        println!("{}", line(row));
    }
    Ok(())
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn parse_interval(nr: i64, raw: &str) -> Result<NewRunInterval> {
    let (distance, pace) = raw
        .split_once('@')
        .with_context(|| format!("interval {raw:?} must look like DISTANCE@MM:SS"))?;
    Ok(NewRunInterval {
        interval_nr: nr,
        distance: distance
            .trim()
            .parse()
            .with_context(|| format!("bad distance in {raw:?}"))?,
        pace: pace.trim().to_string(),
        incline: None,
    })
}

/// `EXERCISE_ID:REPSxWEIGHT`; set numbers count up per exercise.
fn parse_sets(raw: &[String]) -> Result<Vec<NewWeightliftSet>> {
    let mut next_nr: HashMap<i64, i64> = HashMap::new();
    let mut sets = Vec::with_capacity(raw.len());
    for entry in raw {
        let (exercise, rest) = entry
            .split_once(':')
            .with_context(|| format!("set {entry:?} must look like EXERCISE_ID:REPSxWEIGHT"))?;
        let (reps, weight) = rest
            .split_once(['x', 'X'])
            .with_context(|| format!("set {entry:?} must look like EXERCISE_ID:REPSxWEIGHT"))?;
        let exercise_id: i64 = exercise.trim().parse()?;
        let nr = next_nr.entry(exercise_id).or_insert(0);
        *nr += 1;
        sets.push(NewWeightliftSet {
            exercise_id,
            set_nr: *nr,
            reps: reps.trim().parse()?,
            weight: weight.trim().parse()?,
        });
    }
    Ok(sets)
}

async fn show_workout(pool: &SqlitePool, workout_id: i64, json: bool) -> Result<()> {
    let workout = workouts::get_workout(pool, workout_id).await?;
    if json {
        return emit_one(true, &workout, |_| String::new());
    }

    println!(
        "Workout #{} ({}) for user {}: {} to {} ({:.0} min, max HR {})",
        workout.workout_id,
        workout.workout_type(),
        workout.user_id,
        workout.start_time,
        workout.end_time,
        workout.duration_minutes(),
        opt(workout.max_hr)
    );
    match &workout.detail {
        WorkoutDetail::Run(intervals) => {
            for interval in intervals {
                println!("  {}", interval);
            }
            if let Some(total) = workout.total_distance() {
                println!("  Total: {:.2}km", total);
            }
        }
        WorkoutDetail::Weightlift(sets) => {
            let names: HashMap<i64, String> = exercises::get_all_exercises(pool)
                .await?
                .into_iter()
                .map(|e| (e.exercise_id, e.name))
                .collect();
            for set in sets {
                match names.get(&set.exercise_id) {
                    Some(name) => println!("  {}", DisplayableSet::new(set, name)),
                    None => println!("  {}", set),
                }
            }
        }
    }
    Ok(())
}

async fn print_counts(pool: &SqlitePool, json: bool) -> Result<()> {
    let counts = db::table_counts(pool).await?;
    emit_one(json, &counts, |c| {
        format!(
            "Users: {}  Health records: {}  Workouts: {}  Goals: {}  Exercises: {}",
            c.users, c.health_records, c.workouts, c.goals, c.exercises
        )
    })
}

async fn print_progress(pool: &SqlitePool, json: bool) -> Result<()> {
    let rows = analysis::get_user_progress_overview(pool).await?;
    emit(json, &rows, |p| {
        format!(
            "#{} {} {}: {} workouts, {:.0} min, VO2max {}, HRV {}, sleep {}, goals {} done / {} pending",
            p.user_id,
            p.first_name,
            p.last_name,
            p.total_workouts,
            p.total_workout_minutes,
            opt(p.avg_vo2max.map(|v| format!("{v:.1}"))),
            opt(p.avg_hr_variation.map(|v| format!("{v:.0}"))),
            opt(p.avg_sleep_time.map(|v| format!("{v:.1}h"))),
            p.completed_goals,
            p.pending_goals
        )
    })
}

async fn run(command: Commands, pool: &SqlitePool, json: bool) -> Result<()> {
    match command {
        Commands::Dashboard => {
            print_counts(pool, json).await?;
            print_progress(pool, json).await?;
        }
        Commands::Stats => print_counts(pool, json).await?,
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to delete all data without --yes");
            }
            db::clear_all_tables(pool).await?;
            println!("All data deleted");
        }

        Commands::Users(cmd) => match cmd {
            UserCommand::List => {
                let rows = users::get_all_users(pool).await?;
                emit(json, &rows, |u| u.to_string())?;
            }
            UserCommand::Show { user_id } => {
                let user = users::get_user_by_id(pool, user_id).await?;
                emit_one(json, &user, |u| u.to_string())?;
            }
            UserCommand::Add {
                first_name,
                last_name,
                weight,
                dob,
                sex,
            } => {
                let user = users::add_user(
                    pool,
                    &NewUser {
                        first_name,
                        last_name,
                        weight,
                        date_of_birth: dob,
                        sex,
                    },
                )
                .await?;
                emit_one(json, &user, |u| format!("Added {u}"))?;
            }
            UserCommand::Update {
                user_id,
                first_name,
                last_name,
                weight,
                dob,
                sex,
            } => {
                let user = users::update_user(
                    pool,
                    user_id,
                    &UpdateUser {
                        first_name,
                        last_name,
                        weight,
                        date_of_birth: dob,
                        sex,
                    },
                )
                .await?;
                emit_one(json, &user, |u| format!("Updated {u}"))?;
            }
            UserCommand::Delete { user_id } => {
                users::delete_user(pool, user_id).await?;
                println!("Deleted user {user_id}");
            }
        },

        Commands::Health(cmd) => match cmd {
            HealthCommand::List { user: Some(user_id) } => {
                let rows = health::get_user_health_records(pool, user_id).await?;
                emit(json, &rows, |h| {
                    format!(
                        "{}: HR {}, VO2max {}, HRV {}, sleep {}h (quality {})",
                        h.record_date,
                        opt(h.heart_rate),
                        opt(h.vo2max),
                        opt(h.hr_variation),
                        opt(h.sleep_time),
                        opt(h.sleep_quality)
                    )
                })?;
            }
            HealthCommand::List { user: None } => {
                let rows = health::get_all_health_records(pool).await?;
                emit(json, &rows, |h| {
                    format!(
                        "{} {}: HR {}, VO2max {}, HRV {}, sleep {}h (quality {})",
                        h.record.record_date,
                        h.user_name,
                        opt(h.record.heart_rate),
                        opt(h.record.vo2max),
                        opt(h.record.hr_variation),
                        opt(h.record.sleep_time),
                        opt(h.record.sleep_quality)
                    )
                })?;
            }
            HealthCommand::Add {
                user,
                date,
                measurements,
            } => {
                let record = health::add_health_record(
                    pool,
                    &NewHealthRecord {
                        user_id: user,
                        record_date: date,
                        measurements: measurements.into(),
                    },
                )
                .await?;
                emit_one(json, &record, |r| {
                    format!("Recorded health data for user {} on {}", r.user_id, r.record_date)
                })?;
            }
            HealthCommand::Update {
                user_id,
                date,
                measurements,
            } => {
                let record =
                    health::update_health_record(pool, user_id, date, &measurements.into())
                        .await?;
                emit_one(json, &record, |r| {
                    format!("Updated health data for user {} on {}", r.user_id, r.record_date)
                })?;
            }
            HealthCommand::Delete { user_id, date } => {
                health::delete_health_record(pool, user_id, date).await?;
                println!("Deleted health record of user {user_id} on {date}");
            }
            HealthCommand::Trend { user_id, metric } => {
                let points = health::get_health_trend(pool, user_id, metric).await?;
                emit(json, &points, |p| {
                    format!("{} {}: {}", p.record_date, metric.label(), opt(p.value))
                })?;
            }
        },

        Commands::Goals(cmd) => match cmd {
            GoalCommand::List { user: Some(user_id) } => {
                let rows = goals::get_goals_by_user(pool, user_id).await?;
                emit(json, &rows, |g| g.to_string())?;
            }
            GoalCommand::List { user: None } => {
                let rows = goals::get_all_goals(pool).await?;
                emit(json, &rows, |g| format!("{}: {}", g.user_name, g.goal))?;
            }
            GoalCommand::Add {
                user,
                name,
                amount,
                metric,
                completed,
            } => {
                let goal = goals::add_goal(
                    pool,
                    &NewGoal {
                        user_id: user,
                        goal_name: name,
                        amount,
                        metric,
                        completed,
                    },
                )
                .await?;
                emit_one(json, &goal, |g| format!("Added goal {g}"))?;
            }
            GoalCommand::Update {
                user_id,
                name,
                amount,
                metric,
                completed,
            } => {
                let goal = goals::update_goal(
                    pool,
                    user_id,
                    &name,
                    &UpdateGoal {
                        amount,
                        metric,
                        completed,
                    },
                )
                .await?;
                emit_one(json, &goal, |g| format!("Updated goal {g}"))?;
            }
            GoalCommand::Complete { user_id, name } => {
                let goal = goals::mark_goal_completed(pool, user_id, &name).await?;
                emit_one(json, &goal, |g| format!("Completed goal {g}"))?;
            }
            GoalCommand::Delete { user_id, name } => {
                goals::delete_goal(pool, user_id, &name).await?;
                println!("Deleted goal {name:?} of user {user_id}");
            }
            GoalCommand::Suggestions => {
                println!("Goals: {}", goals::common_goal_names().join(", "));
                println!("Metrics: {}", goals::common_metrics().join(", "));
            }
        },

        Commands::Workouts(cmd) => match cmd {
            WorkoutCommand::List { user, limit } => {
                let rows = match user {
                    Some(user_id) => workouts::get_user_workouts(pool, user_id, limit).await?,
                    None => workouts::get_all_workouts(pool).await?,
                };
                emit(json, &rows, |w| {
                    format!(
                        "#{} {} {} {} to {}{}",
                        w.workout_id,
                        w.user_name,
                        w.workout_type,
                        w.start_time,
                        w.end_time,
                        w.distance
                            .map(|d| format!(" ({d:.2}km)"))
                            .unwrap_or_default()
                    )
                })?;
            }
            WorkoutCommand::Show { workout_id } => show_workout(pool, workout_id, json).await?,
            WorkoutCommand::AddRun {
                user,
                start,
                end,
                max_hr,
                intervals,
            } => {
                let intervals = intervals
                    .iter()
                    .zip(1..)
                    .map(|(raw, nr)| parse_interval(nr, raw))
                    .collect::<Result<Vec<_>>>()?;
                let workout = workouts::add_workout(
                    pool,
                    &NewWorkout {
                        user_id: user,
                        start_time: start,
                        end_time: end,
                        max_hr,
                        detail: NewWorkoutDetail::Run(intervals),
                    },
                )
                .await?;
                show_workout(pool, workout.workout_id, json).await?;
            }
            WorkoutCommand::AddLift {
                user,
                start,
                end,
                max_hr,
                sets,
            } => {
                let workout = workouts::add_workout(
                    pool,
                    &NewWorkout {
                        user_id: user,
                        start_time: start,
                        end_time: end,
                        max_hr,
                        detail: NewWorkoutDetail::Weightlift(parse_sets(&sets)?),
                    },
                )
                .await?;
                show_workout(pool, workout.workout_id, json).await?;
            }
            WorkoutCommand::AddInterval {
                workout_id,
                nr,
                distance,
                pace,
                incline,
            } => {
                let interval = workouts::add_run_interval(
                    pool,
                    workout_id,
                    &NewRunInterval {
                        interval_nr: nr,
                        distance,
                        pace,
                        incline,
                    },
                )
                .await?;
                emit_one(json, &interval, |i| format!("Added {i}"))?;
            }
            WorkoutCommand::AddSet {
                workout_id,
                exercise,
                nr,
                reps,
                weight,
            } => {
                let set = workouts::add_weightlift_set(
                    pool,
                    workout_id,
                    &NewWeightliftSet {
                        exercise_id: exercise,
                        set_nr: nr,
                        reps,
                        weight,
                    },
                )
                .await?;
                let name = exercises::get_exercise_by_id(pool, set.exercise_id).await?.name;
                emit_one(json, &set, |s| format!("Added {}", DisplayableSet::new(s, &name)))?;
            }
            WorkoutCommand::Delete { workout_id } => {
                workouts::delete_workout(pool, workout_id).await?;
                println!("Deleted workout {workout_id}");
            }
        },

        Commands::Exercises(cmd) => match cmd {
            ExerciseCommand::List => {
                let rows = exercises::get_all_exercises(pool).await?;
                emit(json, &rows, |e| e.to_string())?;
            }
            ExerciseCommand::Add { name, muscle_group } => {
                let exercise =
                    exercises::add_exercise(pool, &NewExercise { name, muscle_group }).await?;
                emit_one(json, &exercise, |e| format!("Added {e}"))?;
            }
            ExerciseCommand::Update {
                exercise_id,
                name,
                muscle_group,
            } => {
                let exercise = exercises::update_exercise(
                    pool,
                    exercise_id,
                    &UpdateExercise { name, muscle_group },
                )
                .await?;
                emit_one(json, &exercise, |e| format!("Updated {e}"))?;
            }
            ExerciseCommand::Delete { exercise_id } => {
                exercises::delete_exercise(pool, exercise_id).await?;
                println!("Deleted exercise {exercise_id}");
            }
            ExerciseCommand::MuscleGroups => println!("{}", exercises::muscle_groups().join(", ")),
        },

        Commands::Analytics(cmd) => match cmd {
            AnalyticsCommand::Progress => print_progress(pool, json).await?,
            AnalyticsCommand::Effectiveness { goal } => {
                let rows = match goal.as_deref() {
                    Some(goal) => analysis::get_exercise_effectiveness_for_goal(pool, goal).await?,
                    None => analysis::get_exercise_effectiveness(pool).await?,
                };
                emit(json, &rows, |e| {
                    format!(
                        "{} ({}): {} workouts by {} users, avg {:.1}kg x {:.1}, {} related goals completed",
                        e.exercise_name,
                        opt(e.muscle_group.as_deref()),
                        e.times_performed,
                        e.users_performed,
                        e.avg_weight,
                        e.avg_reps,
                        e.related_goals_completed
                    )
                })?;
            }
            AnalyticsCommand::Durations => {
                let rows = analysis::get_workout_duration_stats(pool).await?;
                emit(json, &rows, |d| {
                    format!(
                        "{} {}: {} workouts, avg {:.1} min",
                        d.user_name, d.workout_type, d.workouts, d.avg_duration_minutes
                    )
                })?;
            }
            AnalyticsCommand::Activity => {
                let rows = analysis::get_user_activity_summary(pool).await?;
                emit(json, &rows, |a| {
                    format!(
                        "{}: {} workouts ({} runs, {} weightlifting)",
                        a.user_name, a.total_workouts, a.run_workouts, a.weightlift_workouts
                    )
                })?;
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let level = parse_level(&args.log_level)
        .with_context(|| format!("unknown log level {:?}", args.log_level))?;
    init_logger(level);

    let config = DatabaseConfig::from_env_with(args.database.as_deref())?;
    debug!("Using {:?}", config);

    let tracker = Tracker::open(&config).await?;
    let result = run(args.command, tracker.pool(), args.json).await;
    tracker.close().await;
    info!("Closed database");
    result
}
