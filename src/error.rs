use thiserror::Error;

/// Errors raised while turning caller input into schedule data
///
/// The allocators themselves never fail; every check happens when the
/// input types are constructed.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time of day '{0}' (expected HH:MM between 00:00 and 23:59)")]
    InvalidTime(String),

    #[error("Invalid time window {start}-{end}: start must be before end")]
    InvalidWindow { start: String, end: String },

    #[error("Invalid availability submission: {0}")]
    InvalidSubmission(String),

    #[error("Invalid shift block catalog: {0}")]
    InvalidCatalog(String),

    #[error("Unknown day of week '{0}'")]
    UnknownDay(String),

    #[error("Failed to read/write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to process CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;
