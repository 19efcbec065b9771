use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{FitlogError, ParseEnumError, Result};

const NAME_MAX_CHARS: usize = 32;
const METRIC_MAX_CHARS: usize = 8;
const MAX_HEART_RATE: i64 = 250;

static PACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-5][0-9]$").expect("pace pattern is valid"));

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FitlogError::invalid(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(FitlogError::invalid(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FitlogError::invalid(format!("{field} must be greater than 0")));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FitlogError::invalid(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Running pace as `MM:SS` per kilometre.
pub fn validate_pace(pace: &str) -> Result<()> {
    if PACE_RE.is_match(pace) {
        Ok(())
    } else {
        Err(FitlogError::invalid(format!(
            "pace must look like MM:SS, got {pace:?}"
        )))
    }
}

// Users

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Ok(Sex::Male),
            "F" | "FEMALE" => Ok(Sex::Female),
            _ => Err(ParseEnumError {
                kind: "sex",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = ParseEnumError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub weight: f64,
    pub date_of_birth: NaiveDate,
    #[sqlx(try_from = "String")]
    pub sex: Sex,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}, born {}, {:.1}kg)",
            self.user_id,
            self.full_name(),
            self.sex,
            self.date_of_birth,
            self.weight
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub weight: f64,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        check_text("first name", &self.first_name, NAME_MAX_CHARS)?;
        check_text("last name", &self.last_name, NAME_MAX_CHARS)?;
        check_positive("weight", self.weight)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub weight: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.weight.is_none()
            && self.date_of_birth.is_none()
            && self.sex.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(first_name) = &self.first_name {
            check_text("first name", first_name, NAME_MAX_CHARS)?;
        }
        if let Some(last_name) = &self.last_name {
            check_text("last name", last_name, NAME_MAX_CHARS)?;
        }
        if let Some(weight) = self.weight {
            check_positive("weight", weight)?;
        }
        Ok(())
    }
}

// Health

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HealthRecord {
    pub user_id: i64,
    pub record_date: NaiveDate,
    pub heart_rate: Option<i64>,
    pub vo2max: Option<f64>,
    pub hr_variation: Option<i64>,
    pub sleep_time: Option<f64>,
    pub sleep_quality: Option<i64>,
}

/// A health record together with the owner's display name.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HealthRecordListing {
    pub user_name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: HealthRecord,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthMeasurements {
    pub heart_rate: Option<i64>,
    pub vo2max: Option<f64>,
    pub hr_variation: Option<i64>,
    pub sleep_time: Option<f64>,
    pub sleep_quality: Option<i64>,
}

impl HealthMeasurements {
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.vo2max.is_none()
            && self.hr_variation.is_none()
            && self.sleep_time.is_none()
            && self.sleep_quality.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(hr) = self.heart_rate {
            if !(1..=MAX_HEART_RATE).contains(&hr) {
                return Err(FitlogError::invalid(format!(
                    "heart rate must be between 1 and {MAX_HEART_RATE}"
                )));
            }
        }
        if let Some(vo2max) = self.vo2max {
            check_positive("VO2max", vo2max)?;
        }
        if let Some(hrv) = self.hr_variation {
            if hrv < 0 {
                return Err(FitlogError::invalid("HR variation must not be negative"));
            }
        }
        if let Some(sleep) = self.sleep_time {
            check_non_negative("sleep time", sleep)?;
            if sleep > 24.0 {
                return Err(FitlogError::invalid("sleep time must be at most 24 hours"));
            }
        }
        if let Some(quality) = self.sleep_quality {
            if !(1..=10).contains(&quality) {
                return Err(FitlogError::invalid("sleep quality must be between 1 and 10"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthRecord {
    pub user_id: i64,
    pub record_date: NaiveDate,
    pub measurements: HealthMeasurements,
}

/// Fields left as `None` keep their stored value.
pub type UpdateHealthRecord = HealthMeasurements;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthMetric {
    HeartRate,
    Vo2Max,
    HrVariation,
    SleepTime,
    SleepQuality,
}

impl HealthMetric {
    pub const ALL: [HealthMetric; 5] = [
        HealthMetric::HeartRate,
        HealthMetric::Vo2Max,
        HealthMetric::HrVariation,
        HealthMetric::SleepTime,
        HealthMetric::SleepQuality,
    ];

    pub(crate) fn column(&self) -> &'static str {
        match self {
            HealthMetric::HeartRate => "heart_rate",
            HealthMetric::Vo2Max => "vo2max",
            HealthMetric::HrVariation => "hr_variation",
            HealthMetric::SleepTime => "sleep_time",
            HealthMetric::SleepQuality => "sleep_quality",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthMetric::HeartRate => "Heart Rate",
            HealthMetric::Vo2Max => "VO2max",
            HealthMetric::HrVariation => "HR Variation",
            HealthMetric::SleepTime => "Sleep Time",
            HealthMetric::SleepQuality => "Sleep Quality",
        }
    }
}

impl FromStr for HealthMetric {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "heartrate" | "hr" => Ok(HealthMetric::HeartRate),
            "vo2max" => Ok(HealthMetric::Vo2Max),
            "hrvariation" | "hrv" => Ok(HealthMetric::HrVariation),
            "sleeptime" | "sleep" => Ok(HealthMetric::SleepTime),
            "sleepquality" => Ok(HealthMetric::SleepQuality),
            _ => Err(ParseEnumError {
                kind: "health metric",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HealthTrendPoint {
    pub record_date: NaiveDate,
    pub value: Option<f64>,
}

// Goals

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Goal {
    pub user_id: i64,
    pub goal_name: String,
    pub amount: f64,
    pub metric: String,
    pub completed: bool,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} [{}]",
            self.goal_name,
            self.amount,
            self.metric,
            if self.completed { "done" } else { "pending" }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GoalListing {
    pub user_name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub goal: Goal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id: i64,
    pub goal_name: String,
    pub amount: f64,
    pub metric: String,
    pub completed: bool,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        check_text("goal name", &self.goal_name, NAME_MAX_CHARS)?;
        check_text("metric", &self.metric, METRIC_MAX_CHARS)?;
        check_positive("amount", self.amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateGoal {
    pub amount: Option<f64>,
    pub metric: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateGoal {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.metric.is_none() && self.completed.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            check_positive("amount", amount)?;
        }
        if let Some(metric) = &self.metric {
            check_text("metric", metric, METRIC_MAX_CHARS)?;
        }
        Ok(())
    }
}

pub const COMMON_GOAL_NAMES: &[&str] = &[
    "Run Distance",
    "Daily Steps",
    "Weight Loss",
    "Muscle Gain",
    "Exercise Time",
    "Calorie Burn",
    "Lift Weights",
    "Improve Cardio",
    "Lower Body Fat",
    "Increase Strength",
    "Improve Flexibility",
];

pub const COMMON_METRICS: &[&str] = &[
    "kg", "lbs", "km", "mi", "steps", "min", "hrs", "cal", "%", "reps", "sessions",
];

// Workouts

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
    Run,
    Weightlift,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Run => "Run",
            WorkoutType::Weightlift => "Weightlift",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "run" => Ok(WorkoutType::Run),
            "weightlift" => Ok(WorkoutType::Weightlift),
            _ => Err(ParseEnumError {
                kind: "workout type",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for WorkoutType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct WorkoutRow {
    pub workout_id: i64,
    pub user_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub max_hr: Option<i64>,
    #[sqlx(try_from = "String")]
    pub workout_type: WorkoutType,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RunInterval {
    pub workout_id: i64,
    pub interval_nr: i64,
    pub distance: f64,
    pub pace: String,
    pub incline: Option<f64>,
}

impl fmt::Display for RunInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let incline_str = self
            .incline
            .map(|i| format!(" @{:.1}%", i))
            .unwrap_or_default();
        write!(
            f,
            "Interval {}: {:.2}km at {}/km{}",
            self.interval_nr, self.distance, self.pace, incline_str
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WeightliftSet {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub set_nr: i64,
    pub reps: i64,
    pub weight: f64,
}

impl fmt::Display for WeightliftSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exercise #{} set {}: {:.1}kg x {} reps",
            self.exercise_id, self.set_nr, self.weight, self.reps
        )
    }
}

// Helper struct for displaying sets with exercise names
pub struct DisplayableSet<'a> {
    pub set: &'a WeightliftSet,
    pub exercise_name: &'a str,
}

impl<'a> DisplayableSet<'a> {
    pub fn new(set: &'a WeightliftSet, exercise_name: &'a str) -> Self {
        Self { set, exercise_name }
    }
}

impl fmt::Display for DisplayableSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} set {}: {:.1}kg x {} reps",
            self.exercise_name, self.set.set_nr, self.set.weight, self.set.reps
        )
    }
}

/// Type-specific detail of a workout. The variant is the workout type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "entries")]
pub enum WorkoutDetail {
    Run(Vec<RunInterval>),
    Weightlift(Vec<WeightliftSet>),
}

impl WorkoutDetail {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutDetail::Run(_) => WorkoutType::Run,
            WorkoutDetail::Weightlift(_) => WorkoutType::Weightlift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub workout_id: i64,
    pub user_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub max_hr: Option<i64>,
    pub detail: WorkoutDetail,
}

impl Workout {
    pub fn workout_type(&self) -> WorkoutType {
        self.detail.workout_type()
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 60.0
    }

    pub fn total_distance(&self) -> Option<f64> {
        match &self.detail {
            WorkoutDetail::Run(intervals) => Some(intervals.iter().map(|i| i.distance).sum()),
            WorkoutDetail::Weightlift(_) => None,
        }
    }
}

/// One row of the workouts table view.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WorkoutListing {
    pub workout_id: i64,
    pub user_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub workout_type: WorkoutType,
    /// Sum of interval distances for runs, `None` for weightlifting.
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRunInterval {
    pub interval_nr: i64,
    pub distance: f64,
    pub pace: String,
    pub incline: Option<f64>,
}

impl NewRunInterval {
    pub fn validate(&self) -> Result<()> {
        if self.interval_nr <= 0 {
            return Err(FitlogError::invalid("interval number must be at least 1"));
        }
        check_non_negative("distance", self.distance)?;
        validate_pace(&self.pace)?;
        if let Some(incline) = self.incline {
            if !incline.is_finite() {
                return Err(FitlogError::invalid("incline must be a number"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWeightliftSet {
    pub exercise_id: i64,
    pub set_nr: i64,
    pub reps: i64,
    pub weight: f64,
}

impl NewWeightliftSet {
    pub fn validate(&self) -> Result<()> {
        if self.set_nr <= 0 {
            return Err(FitlogError::invalid("set number must be at least 1"));
        }
        if self.reps <= 0 {
            return Err(FitlogError::invalid("reps must be at least 1"));
        }
        check_non_negative("weight", self.weight)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewWorkoutDetail {
    Run(Vec<NewRunInterval>),
    Weightlift(Vec<NewWeightliftSet>),
}

impl NewWorkoutDetail {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            NewWorkoutDetail::Run(_) => WorkoutType::Run,
            NewWorkoutDetail::Weightlift(_) => WorkoutType::Weightlift,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub user_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub max_hr: Option<i64>,
    pub detail: NewWorkoutDetail,
}

impl NewWorkout {
    pub fn validate(&self) -> Result<()> {
        if self.end_time <= self.start_time {
            return Err(FitlogError::invalid("end time must be after start time"));
        }
        if let Some(max_hr) = self.max_hr {
            if !(0..=MAX_HEART_RATE).contains(&max_hr) {
                return Err(FitlogError::invalid(format!(
                    "maximum heart rate must be between 0 and {MAX_HEART_RATE}"
                )));
            }
        }
        match &self.detail {
            NewWorkoutDetail::Run(intervals) => {
                for interval in intervals {
                    interval.validate()?;
                }
            }
            NewWorkoutDetail::Weightlift(sets) => {
                for set in sets {
                    set.validate()?;
                }
            }
        }
        Ok(())
    }
}

// Exercises

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Exercise {
    pub exercise_id: i64,
    pub name: String,
    pub muscle_group: Option<String>,
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.muscle_group {
            Some(group) => write!(f, "{} ({})", self.name, group),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub muscle_group: Option<String>,
}

impl NewExercise {
    pub fn validate(&self) -> Result<()> {
        check_text("exercise name", &self.name, NAME_MAX_CHARS)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExercise {
    pub name: Option<String>,
    pub muscle_group: Option<String>,
}

impl UpdateExercise {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.muscle_group.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_text("exercise name", name, NAME_MAX_CHARS)?;
        }
        Ok(())
    }
}

pub const MUSCLE_GROUPS: &[&str] = &[
    "Chest",
    "Back",
    "Legs",
    "Shoulders",
    "Arms",
    "Core",
    "Full Body",
    "Cardio",
    "Other",
];

// Aggregates

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserProgress {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub total_workouts: i64,
    pub total_workout_minutes: f64,
    pub avg_vo2max: Option<f64>,
    pub avg_hr_variation: Option<f64>,
    pub avg_sleep_time: Option<f64>,
    pub completed_goals: i64,
    pub pending_goals: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ExerciseEffectiveness {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    pub times_performed: i64,
    pub users_performed: i64,
    pub avg_weight: f64,
    pub avg_reps: f64,
    pub related_goals_completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WorkoutDurationStat {
    pub user_id: i64,
    pub user_name: String,
    #[sqlx(try_from = "String")]
    pub workout_type: WorkoutType,
    pub workouts: i64,
    pub avg_duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserActivitySummary {
    pub user_id: i64,
    pub user_name: String,
    pub total_workouts: i64,
    pub run_workouts: i64,
    pub weightlift_workouts: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn sex_parses_codes_and_words() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("X".parse::<Sex>().is_err());
        assert_eq!(Sex::Female.as_str(), "F");
    }

    #[test]
    fn workout_type_is_restricted_to_two_variants() {
        assert_eq!("Run".parse::<WorkoutType>().unwrap(), WorkoutType::Run);
        assert_eq!(
            "weightlift".parse::<WorkoutType>().unwrap(),
            WorkoutType::Weightlift
        );
        let err = "Swim".parse::<WorkoutType>().unwrap_err();
        assert_eq!(err.kind, "workout type");
    }

    #[test]
    fn pace_format() {
        assert!(validate_pace("05:00").is_ok());
        assert!(validate_pace("12:59").is_ok());
        assert!(validate_pace("5:00").is_err());
        assert!(validate_pace("05:60").is_err());
        assert!(validate_pace("05-00").is_err());
    }

    #[test]
    fn new_user_rejects_non_positive_weight() {
        let user = NewUser {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            weight: 0.0,
            date_of_birth: NaiveDate::from_ymd_opt(1995, 5, 1).unwrap(),
            sex: Sex::Female,
        };
        assert!(matches!(user.validate(), Err(FitlogError::InvalidInput(_))));
    }

    #[test]
    fn new_user_rejects_long_names() {
        let user = NewUser {
            first_name: "A".repeat(33),
            last_name: "Lee".into(),
            weight: 60.0,
            date_of_birth: NaiveDate::from_ymd_opt(1995, 5, 1).unwrap(),
            sex: Sex::Female,
        };
        assert!(user.validate().is_err());
    }

    #[test]
    fn workout_must_end_after_it_starts() {
        let mut workout = NewWorkout {
            user_id: 1,
            start_time: at(8, 0),
            end_time: at(8, 0),
            max_hr: Some(150),
            detail: NewWorkoutDetail::Run(vec![]),
        };
        assert!(workout.validate().is_err());

        workout.end_time = at(7, 30);
        assert!(workout.validate().is_err());

        workout.end_time = at(8, 30);
        assert!(workout.validate().is_ok());
    }

    #[test]
    fn workout_validates_its_detail_rows() {
        let workout = NewWorkout {
            user_id: 1,
            start_time: at(8, 0),
            end_time: at(9, 0),
            max_hr: None,
            detail: NewWorkoutDetail::Weightlift(vec![NewWeightliftSet {
                exercise_id: 1,
                set_nr: 1,
                reps: 0,
                weight: 20.0,
            }]),
        };
        assert!(workout.validate().is_err());
    }

    #[test]
    fn health_measurements_ranges() {
        let ok = HealthMeasurements {
            heart_rate: Some(60),
            sleep_quality: Some(7),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = HealthMeasurements {
            sleep_quality: Some(11),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn health_metric_names() {
        assert_eq!(
            "Heart Rate".parse::<HealthMetric>().unwrap(),
            HealthMetric::HeartRate
        );
        assert_eq!("hrv".parse::<HealthMetric>().unwrap(), HealthMetric::HrVariation);
        assert_eq!("VO2max".parse::<HealthMetric>().unwrap().column(), "vo2max");
        for metric in HealthMetric::ALL {
            assert_eq!(metric.label().parse::<HealthMetric>().unwrap(), metric);
        }
    }

    #[test]
    fn workout_duration_and_distance() {
        let workout = Workout {
            workout_id: 1,
            user_id: 1,
            start_time: at(8, 0),
            end_time: at(8, 45),
            max_hr: None,
            detail: WorkoutDetail::Run(vec![
                RunInterval {
                    workout_id: 1,
                    interval_nr: 1,
                    distance: 2.5,
                    pace: "05:00".into(),
                    incline: None,
                },
                RunInterval {
                    workout_id: 1,
                    interval_nr: 2,
                    distance: 3.0,
                    pace: "05:30".into(),
                    incline: Some(1.0),
                },
            ]),
        };
        assert_eq!(workout.duration_minutes(), 45.0);
        assert_eq!(workout.total_distance(), Some(5.5));
        assert_eq!(workout.workout_type(), WorkoutType::Run);
    }
}
