//! Shared error type across echoscope crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration input.
    Config,
    /// Listening socket could not be bound.
    Bind,
    /// Serving loop failed after startup.
    Serve,
    /// Drain / close of listening resources failed.
    Shutdown,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::Bind => "BIND",
            ErrorCode::Serve => "SERVE",
            ErrorCode::Shutdown => "SHUTDOWN",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, EchoscopeError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum EchoscopeError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("listen on {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("serve failed: {0}")]
    Serve(String),
    #[error("shutdown failed: {0}")]
    Shutdown(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl EchoscopeError {
    /// Map error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            EchoscopeError::Config(_) => ErrorCode::Config,
            EchoscopeError::Bind { .. } => ErrorCode::Bind,
            EchoscopeError::Serve(_) => ErrorCode::Serve,
            EchoscopeError::Shutdown(_) => ErrorCode::Shutdown,
            EchoscopeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
