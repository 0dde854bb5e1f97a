use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the conference schedule crates.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The HTTP request for the schedule document failed before a response.
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// A schedule source string is neither a URL nor a usable path.
    #[error("Invalid schedule source: {0}")]
    InvalidSource(String),

    /// A segment name is not `all` or `favorites`.
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// A day index does not exist in the loaded schedule.
    #[error("Day {index} out of range ({count} days loaded)")]
    DayOutOfRange { index: usize, count: usize },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the schedule crates.
pub type Result<T> = std::result::Result<T, ScheduleError>;
