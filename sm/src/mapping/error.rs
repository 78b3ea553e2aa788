//! Mapping error types

use thiserror::Error;

/// Placeholder used when a failed response carries no `detail`
pub const UNKNOWN_ERROR: &str = "Unknown Error";

/// Errors that can occur while building or submitting a mapping request
///
/// None of these are retried; a fresh user action is required.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A column list was empty when the request was built
    #[error("cannot build mapping request: {0}")]
    Precondition(String),

    /// The service answered with a status other than 200
    #[error("Failed to generate mapping: {status} - {message}")]
    Remote { status: u16, message: String },

    /// The request never produced a usable response
    #[error("Error during API call: {0}")]
    Transport(String),
}

impl MappingError {
    /// HTTP status of a remote failure
    pub fn status(&self) -> Option<u16> {
        match self {
            MappingError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MappingError {
    fn from(err: reqwest::Error) -> Self {
        MappingError::Transport(err.to_string())
    }
}
