/// Error types for the library manager
///
/// User-correctable failures (`ValidationError`, `ConcurrentSortError`) are
/// returned to the caller as values. `IndexError` marks an internal defect.

use std::path::PathBuf;
use thiserror::Error;

/// A book could not be inserted because one of its fields is invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The id text is not an integer
    #[error("Book ID must be a number (got '{value}')")]
    InvalidId {
        /// The rejected id text
        value: String,
    },

    /// A required text field was left empty
    #[error("Field '{field}' must not be empty")]
    MissingField {
        /// Name of the empty field
        field: &'static str,
    },
}

/// A store position outside the current bounds was accessed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Index {index} is out of bounds for a store of {len} records")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// A sort was requested while another one is still running
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("A sort is already running; wait for it to finish or stop it first")]
pub struct ConcurrentSortError;

/// The configuration file could not be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Delays must be finite and non-negative
    #[error("Invalid value for '{name}': {value} (must be a non-negative number of seconds)")]
    InvalidDelay {
        name: &'static str,
        value: f64,
    },
}

/// Anything that prevents the application from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to start the sort worker runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("User interface error: {0}")]
    Ui(#[from] iced::Error),
}
