use thiserror::Error;

/// Everything that can go wrong outside of the pure table filters.
///
/// Mask/table length mismatches are deliberately absent: the filters fall back to the
/// unfiltered input instead of failing.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("unknown time zone '{0}'")]
    InvalidTimeZone(String),

    #[error("invalid options: {0}")]
    Config(String),

    #[error("could not (de)serialize: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not get a database connection: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed table: {0}")]
    TableFormat(String),

    #[error("unknown service '{0}'")]
    UnknownEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
