//! Error types for envelope construction and delivery.
//!
//! Construction errors (`Configuration`, `Randomness`, `Serialization`,
//! `Crypto`) are terminal for the request that raised them. Transport errors
//! describe what happened after a complete envelope left the builder.

use std::fmt;

/// Error codes for FFI and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SealErrorCode {
    /// Feature not compiled in
    Unimplemented = 1000,
    /// Malformed or missing protocol constants
    Configuration = 2000,
    /// Secure random source unavailable
    Randomness = 3000,
    /// Caller supplied a value that cannot be encoded as JSON
    Serialization = 4000,
    /// Cipher or key-wrap failure
    Crypto = 5000,
    /// Transport/network layer error
    Transport = 6000,
    /// Connection failed
    ConnectionFailed = 6001,
    /// Connection timeout
    ConnectionTimeout = 6002,
    /// Remote answered with a non-success status
    Http = 6003,
}

/// Error type for sealkit operations.
#[derive(Debug)]
pub enum SealError {
    /// Feature not compiled in.
    Unimplemented(&'static str),

    /// A protocol constant is missing or malformed.
    Configuration {
        /// Configuration field name
        field: String,
        /// Reason it was rejected
        reason: String,
    },

    /// The secure random source failed.
    Randomness(String),

    /// A parameter value could not be encoded as JSON.
    Serialization(String),

    /// Block cipher or key-wrap failure.
    Crypto(String),

    /// Transport/network layer error.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The remote service answered with a non-success status.
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },
}

impl SealError {
    /// Get the error code.
    pub fn code(&self) -> SealErrorCode {
        match self {
            Self::Unimplemented(_) => SealErrorCode::Unimplemented,
            Self::Configuration { .. } => SealErrorCode::Configuration,
            Self::Randomness(_) => SealErrorCode::Randomness,
            Self::Serialization(_) => SealErrorCode::Serialization,
            Self::Crypto(_) => SealErrorCode::Crypto,
            Self::Transport(_) => SealErrorCode::Transport,
            Self::ConnectionFailed { .. } => SealErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => SealErrorCode::ConnectionTimeout,
            Self::Http { .. } => SealErrorCode::Http,
        }
    }

    /// Returns true if the calling layer may retry.
    ///
    /// Only delivery failures qualify. A retry must seal a new envelope;
    /// construction failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. } => {
                true
            }
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Returns true if the error happened while building the envelope.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::Randomness(_)
                | Self::Serialization(_)
                | Self::Crypto(_)
        )
    }

    /// Create a configuration error.
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented(label) => write!(f, "{} is not available in this build", label),
            Self::Configuration { field, reason } => {
                write!(f, "invalid configuration `{}`: {}", field, reason)
            }
            Self::Randomness(msg) => write!(f, "secure random source failed: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Crypto(msg) => write!(f, "crypto error: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
            Self::Http { status, body } => write!(f, "remote returned {}: {}", status, body),
        }
    }
}

impl std::error::Error for SealError {}

impl From<serde_json::Error> for SealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
