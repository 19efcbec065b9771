use sqlx::error::ErrorKind;
use thiserror::Error as ThisError;

pub type Result<T, E = FitlogError> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum FitlogError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Unique, foreign key, check or not-null violation reported by SQLite.
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error(
        "Cannot delete exercise that is used in {set_count} workout sets. Remove those workout records first."
    )]
    ExerciseInUse { exercise_id: i64, set_count: i64 },

    #[error("workout {workout_id} is a {actual} workout, cannot attach {expected} details")]
    WorkoutTypeMismatch {
        workout_id: i64,
        expected: &'static str,
        actual: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("migration {name} failed: {message}")]
    Migration { name: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl FitlogError {
    pub fn not_found(entity: &'static str) -> Self {
        FitlogError::NotFound { entity }
    }

    pub fn invalid<D: std::fmt::Display>(d: D) -> Self {
        FitlogError::InvalidInput(d.to_string())
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, FitlogError::Constraint(_))
    }
}

impl From<sqlx::Error> for FitlogError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return FitlogError::Constraint(db_err.message().to_string());
                }
                _ => {}
            }
            // RESTRICT violations surface as SQLITE_CONSTRAINT_TRIGGER with kind Other
            if db_err.code().as_deref().is_some_and(is_sqlite_constraint_code) {
                return FitlogError::Constraint(db_err.message().to_string());
            }
        }
        FitlogError::Database(e)
    }
}

/// True for `SQLITE_CONSTRAINT` and all of its extended result codes.
fn is_sqlite_constraint_code(code: &str) -> bool {
    const SQLITE_CONSTRAINT: i32 = 19;
    code.parse::<i32>()
        .is_ok_and(|code| code & 0xff == SQLITE_CONSTRAINT)
}

/// Returned when a stored enum column holds a value outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl From<ParseEnumError> for FitlogError {
    fn from(e: ParseEnumError) -> Self {
        FitlogError::InvalidInput(e.to_string())
    }
}
