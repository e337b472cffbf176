//! Error types shared across the tutor
//!
//! Library seams return these typed errors; the CLI and startup paths wrap
//! them in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

use crate::tutor::session::SessionMode;
use crate::tutor::Mode;

/// Message shown to the learner whenever generation fails
pub const RETRY_MESSAGE: &str = "The tutor could not generate feedback right now. Please try again.";

/// Why a data file could not be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("expected a JSON array of records: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the external text-generation capability
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation server unavailable: {0}")]
    Unavailable(String),
    #[error("generation timed out: {0}")]
    Timeout(String),
    #[error("generation returned no candidates")]
    Empty,
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else if err.is_decode() {
            GenerationError::InvalidResponse(err.to_string())
        } else {
            GenerationError::Unavailable(err.to_string())
        }
    }
}

/// Tutor error taxonomy
#[derive(Error, Debug)]
pub enum TutorError {
    /// Missing or malformed data file; fatal at startup
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    /// Not enough records to serve the request
    #[error("not enough {kind}: need {required}, have {available}")]
    InsufficientData {
        kind: &'static str,
        required: usize,
        available: usize,
    },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// A submission arrived for a mode the session is not in
    #[error("this action needs {expected} mode, but the session is in {actual} mode")]
    ModeMismatch { expected: Mode, actual: SessionMode },
    #[error("unknown mode '{0}' (expected \"Knowledge Check\" or \"Scenario-Based Activity\")")]
    UnknownMode(String),
}

impl TutorError {
    /// Wrap a load failure with the offending path
    pub fn load(path: impl Into<PathBuf>, source: impl Into<LoadError>) -> Self {
        TutorError::Load {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Text suitable for showing to the learner
    pub fn user_message(&self) -> String {
        match self {
            TutorError::Generation(_) => RETRY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
