//! Per-request status model shared by the gateway and its plugins

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status codes, mirroring the canonical RPC status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    /// The operation was cancelled, typically by the caller
    Cancelled,
    /// Unknown error
    Unknown,
    /// The caller supplied an invalid argument
    InvalidArgument,
    /// The deadline expired before the operation completed
    DeadlineExceeded,
    /// Some requested entity was not found
    NotFound,
    /// The entity the caller attempted to create already exists
    AlreadyExists,
    /// The caller lacks permission for the operation
    PermissionDenied,
    /// Some resource has been exhausted
    ResourceExhausted,
    /// The system is not in a state required for the operation
    FailedPrecondition,
    /// The operation was aborted
    Aborted,
    /// The operation was attempted past the valid range
    OutOfRange,
    /// The operation is not implemented by this plugin
    Unimplemented,
    /// Internal error
    Internal,
    /// The service is currently unavailable
    Unavailable,
    /// Unrecoverable data loss or corruption
    DataLoss,
    /// The request lacks valid authentication credentials
    Unauthenticated,
}

impl Code {
    /// HTTP status code used when this code crosses the HTTP surface
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::Cancelled => 499,
            Self::InvalidArgument | Self::FailedPrecondition | Self::OutOfRange => 400,
            Self::DeadlineExceeded => 504,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Aborted => 409,
            Self::PermissionDenied => 403,
            Self::ResourceExhausted => 429,
            Self::Unimplemented => 501,
            Self::Unavailable => 503,
            Self::Unauthenticated => 401,
            Self::Unknown | Self::Internal | Self::DataLoss => 500,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
            Self::InvalidArgument => "InvalidArgument",
            Self::DeadlineExceeded => "DeadlineExceeded",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::PermissionDenied => "PermissionDenied",
            Self::ResourceExhausted => "ResourceExhausted",
            Self::FailedPrecondition => "FailedPrecondition",
            Self::Aborted => "Aborted",
            Self::OutOfRange => "OutOfRange",
            Self::Unimplemented => "Unimplemented",
            Self::Internal => "Internal",
            Self::Unavailable => "Unavailable",
            Self::DataLoss => "DataLoss",
            Self::Unauthenticated => "Unauthenticated",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call: a status code plus a human-readable message.
///
/// Plugins return this from every contract method and the gateway forwards
/// it to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("code = {code} desc = {message}")]
pub struct Status {
    /// Status code
    pub code: Code,
    /// Error message
    pub message: String,
}

impl Status {
    /// Create a status with an arbitrary code
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `InvalidArgument` status
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// `Unauthenticated` status
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(Code::Unauthenticated, message)
    }

    /// `NotFound` status
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    /// `Internal` status
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    /// `Unimplemented` status
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    /// `DeadlineExceeded` status
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(Code::DeadlineExceeded, message)
    }

    /// Status code
    #[must_use]
    pub fn code(&self) -> Code {
        self.code
    }

    /// Status message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let status = Status::unauthenticated("invalid authorization metadata: bad");
        assert_eq!(
            status.to_string(),
            "code = Unauthenticated desc = invalid authorization metadata: bad"
        );
    }

    #[test]
    fn test_http_mapping() {
        assert_eq!(Code::InvalidArgument.http_status(), 400);
        assert_eq!(Code::Unauthenticated.http_status(), 401);
        assert_eq!(Code::NotFound.http_status(), 404);
        assert_eq!(Code::Internal.http_status(), 500);
    }

    #[test]
    fn test_code_serializes_screaming() {
        let json = serde_json::to_string(&Code::InvalidArgument).unwrap();
        assert_eq!(json, "\"INVALID_ARGUMENT\"");
    }
}
