//! Error classification for retry decisions

use std::fmt;
use thiserror::Error;

/// Coarse category of an operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Network,
    Timeout,
    Connection,
    /// Response with an HTTP status code
    Status(u16),
    Other,
}

impl ErrorClass {
    pub fn is_server_error(&self) -> bool {
        matches!(self, ErrorClass::Status(code) if (500..600).contains(code))
    }

    /// Network, timeout and 5xx failures
    pub fn is_transient(&self) -> bool {
        match self {
            ErrorClass::Network | ErrorClass::Timeout | ErrorClass::Connection => true,
            ErrorClass::Status(_) => self.is_server_error(),
            ErrorClass::Other => false,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Network => f.write_str("network"),
            ErrorClass::Timeout => f.write_str("timeout"),
            ErrorClass::Connection => f.write_str("connection"),
            ErrorClass::Status(code) => write!(f, "status {}", code),
            ErrorClass::Other => f.write_str("other"),
        }
    }
}

/// Errors that can tell the retry handler what kind of failure they are
pub trait ClassifyError {
    fn classify(&self) -> ErrorClass;
}

impl ClassifyError for std::io::Error {
    fn classify(&self) -> ErrorClass {
        use std::io::ErrorKind;
        match self.kind() {
            ErrorKind::TimedOut => ErrorClass::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => ErrorClass::Connection,
            ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof | ErrorKind::AddrNotAvailable => {
                ErrorClass::Network
            }
            _ => ErrorClass::Other,
        }
    }
}

/// General-purpose failure for wrapped remote operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

impl OperationError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        OperationError::Status {
            status,
            message: message.into(),
        }
    }
}

impl ClassifyError for OperationError {
    fn classify(&self) -> ErrorClass {
        match self {
            OperationError::Network(_) => ErrorClass::Network,
            OperationError::Timeout(_) => ErrorClass::Timeout,
            OperationError::Connection(_) => ErrorClass::Connection,
            OperationError::Status { status, .. } => ErrorClass::Status(*status),
            OperationError::Other(_) => ErrorClass::Other,
        }
    }
}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        match err.classify() {
            ErrorClass::Timeout => OperationError::Timeout(err.to_string()),
            ErrorClass::Connection => OperationError::Connection(err.to_string()),
            ErrorClass::Network => OperationError::Network(err.to_string()),
            _ => OperationError::Other(err.to_string()),
        }
    }
}
