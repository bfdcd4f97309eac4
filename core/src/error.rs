use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdrError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Configuration ─────────────────────────────
    #[error("Invalid range for {name}: min {min} is greater than max {max}")]
    InvalidRange { name: &'static str, min: u64, max: u64 },

    #[error("{name} of {value} exceeds the limit of {limit}")]
    AboveLimit { name: &'static str, value: u64, limit: u64 },

    #[error("Subscriber population is empty")]
    EmptyPopulation,

    // ── User input ────────────────────────────────
    #[error("Invalid phone number format: '{0}'")]
    InvalidMsisdn(String),

    #[error("Invalid month: '{0}' (expected 1-12)")]
    InvalidMonth(String),

    #[error("Subscriber {0} not found")]
    UnknownSubscriber(String),

    #[error("No CDR data for month {month}: only {available} month(s) generated")]
    MonthNotGenerated { month: u32, available: usize },

    #[error("Call starting at {start} with duration {duration}s ends past the representable range")]
    TimestampOverflow { start: i64, duration: u64 },

    #[error("Malformed CDR line: '{0}'")]
    MalformedRecord(String),
}

impl CdrError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Rejected requests the caller can report and move past.
    /// Everything else aborts the run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMsisdn(_)
                | Self::InvalidMonth(_)
                | Self::UnknownSubscriber(_)
                | Self::MonthNotGenerated { .. }
        )
    }
}

pub type CdrResult<T> = Result<T, CdrError>;
