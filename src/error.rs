// Error types for the capture pipeline
//
// This module defines custom error types for session and transmission
// operations, providing structured error handling with numeric error codes.

use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling at the
/// connector boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Session-level errors
///
/// These errors cover session bootstrap (reference list, audio source,
/// output directory) and measure persistence. Bootstrap errors are fatal:
/// no frame is processed and no partial state is created.
///
/// Error code ranges: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Reference symbol list could not be read
    ReferenceUnreadable { path: String, reason: String },

    /// Reference symbol list was read but is not a valid symbol array
    ReferenceInvalid { path: String, reason: String },

    /// Audio source could not be opened or decoded
    AudioSourceUnreadable { path: String, reason: String },

    /// Durable measure record could not be written or cleared
    StoreFailed { details: String },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::ReferenceUnreadable { .. } => 1001,
            SessionError::ReferenceInvalid { .. } => 1002,
            SessionError::AudioSourceUnreadable { .. } => 1003,
            SessionError::StoreFailed { .. } => 1004,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::ReferenceUnreadable { path, reason } => {
                format!("Failed to read reference list {}: {}", path, reason)
            }
            SessionError::ReferenceInvalid { path, reason } => {
                format!("Reference list {} is invalid: {}", path, reason)
            }
            SessionError::AudioSourceUnreadable { path, reason } => {
                format!("Failed to open audio source {}: {}", path, reason)
            }
            SessionError::StoreFailed { details } => {
                format!("Measure store failure: {}", details)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for SessionError {}

/// Convert from std::io::Error to SessionError
impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::StoreFailed {
            details: err.to_string(),
        }
    }
}

/// Transmission errors
///
/// Surfaced to the caller of the measure batcher and the reconciler as a
/// recoverable condition: persistence still succeeds when transmission
/// fails, and capture continues.
///
/// Error code ranges: 2001-2002
#[derive(Debug, Clone, PartialEq)]
pub enum TransmitError {
    /// The outbound channel has no connected consumer
    ChannelClosed,

    /// The connector rejected or could not deliver the record
    Unavailable { reason: String },
}

impl ErrorCode for TransmitError {
    fn code(&self) -> i32 {
        match self {
            TransmitError::ChannelClosed => 2001,
            TransmitError::Unavailable { .. } => 2002,
        }
    }

    fn message(&self) -> String {
        match self {
            TransmitError::ChannelClosed => {
                "Outbound channel closed: no connected consumer".to_string()
            }
            TransmitError::Unavailable { reason } => {
                format!("Transmitter unavailable: {}", reason)
            }
        }
    }
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransmitError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TransmitError {}
