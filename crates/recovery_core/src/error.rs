use thiserror::Error;

/// Errors raised by the state engine when an input cannot be applied.
///
/// Duplicate completions and duplicate diary entries are not errors: they
/// resolve to a no-op transition instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{field} must be between 0 and 10, got {value}")]
    OutOfRange { field: &'static str, value: u8 },

    #[error("sleep quality must be 1 (poor), 2 (fair) or 3 (good), got {0}")]
    InvalidSleepQuality(u8),

    #[error("unknown workout day: {0}")]
    UnknownWorkout(String),

    #[error("unknown exercise '{exercise}' in {day_id}")]
    UnknownExercise { day_id: String, exercise: String },

    #[error("stored state could not be decoded: {0}")]
    StateDecode(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
