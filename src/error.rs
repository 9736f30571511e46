//! Error types shared across the plan, configuration and feedback layers.
//!
//! The session engine itself has no error type: every transition is total.
//! Everything that can fail lives at its boundary.

use thiserror::Error;

/// A plan that would leave the engine with undefined transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// A session always needs at least one work/rest pair.
    #[error("plan has no main steps")]
    NoMainSteps,

    /// Every step must last at least one time unit.
    #[error("{section} step {index} has a zero duration")]
    ZeroDuration { section: &'static str, index: usize },

    /// The embedded exercise catalog could not be read.
    #[error("exercise catalog {0} is missing or malformed")]
    Catalog(String),
}

/// Errors raised while validating or persisting user preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of an audio or visual feedback hook.
///
/// These are logged and swallowed by the engine; they never halt a session.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback output unavailable: {0}")]
    Unavailable(String),

    #[error("feedback output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while appending to the workout history log.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history encoding error: {0}")]
    Csv(#[from] csv::Error),
}
