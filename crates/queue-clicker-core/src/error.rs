//! Error taxonomy with actionable suggestions.
//!
//! [`Error::Recognition`] and [`Error::Inspection`] are recoverable. The first
//! never leaves the text verifier: a failed recognition is a non-match for
//! that one region. The second is logged by the monitor and the tick goes on.
//! Every other variant is fatal to the monitor loop and is handed back to the
//! caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable error codes, suitable for machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    CaptureFailed,
    ActuatorFailed,
    RecognitionFailed,
    InvalidConfig,
    AlreadyFinished,
    InspectionFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::CaptureFailed => write!(f, "CAPTURE_FAILED"),
            ErrorCode::ActuatorFailed => write!(f, "ACTUATOR_FAILED"),
            ErrorCode::RecognitionFailed => write!(f, "RECOGNITION_FAILED"),
            ErrorCode::InvalidConfig => write!(f, "INVALID_CONFIG"),
            ErrorCode::AlreadyFinished => write!(f, "ALREADY_FINISHED"),
            ErrorCode::InspectionFailed => write!(f, "INSPECTION_FAILED"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The frame source could not produce a frame.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// The pointer actuator rejected a move, click, press or release.
    #[error("pointer actuator failed: {0}")]
    Actuator(String),

    /// The text recognizer failed on one crop.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `run()` was called on a monitor that already reached a terminal state.
    #[error("monitor already finished in state {0}")]
    AlreadyFinished(String),

    /// A diagnostic frame inspector could not record a frame.
    #[error("frame inspection failed: {0}")]
    Inspection(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    pub fn actuator(message: impl Into<String>) -> Self {
        Self::Actuator(message.into())
    }

    pub fn recognition(message: impl Into<String>) -> Self {
        Self::Recognition(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn inspection(message: impl Into<String>) -> Self {
        Self::Inspection(message.into())
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Capture(_) => ErrorCode::CaptureFailed,
            Error::Actuator(_) => ErrorCode::ActuatorFailed,
            Error::Recognition(_) => ErrorCode::RecognitionFailed,
            Error::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Error::AlreadyFinished(_) => ErrorCode::AlreadyFinished,
            Error::Inspection(_) => ErrorCode::InspectionFailed,
        }
    }

    /// Whether the monitor loop may keep going after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Recognition(_) | Error::Inspection(_))
    }

    /// A hint for the person running the tool.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Error::Capture(_) => {
                "Check that screen recording is permitted for this terminal and a display is attached"
            }
            Error::Actuator(_) => {
                "Check that accessibility/input permissions are granted for this terminal"
            }
            Error::Recognition(_) => {
                "Install tesseract and make sure it is on PATH, or run with --no-ocr"
            }
            Error::InvalidConfig(_) => {
                "Run 'queue-clicker defaults' to see every option with its default value"
            }
            Error::AlreadyFinished(_) => "Create a new monitor to start another run",
            Error::Inspection(_) => "Check that the debug directory exists and is writable",
        }
    }
}
