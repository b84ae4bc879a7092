//! Error types for the scheduler client
//!
//! All errors use thiserror for structured error handling.
//! Transport failures are classified into a small taxonomy so callers can
//! decide how to surface them (re-login, inline banner, empty state).
//! These errors can be serialized to a UI layer.

use thiserror::Error;

/// Coarse classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Validation,
    Server,
    Network,
    Local,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// 401 from the API. The session has already been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other 4xx. `detail` is the server's message, shown verbatim.
    #[error("{detail}")]
    Validation { status: u16, detail: String },

    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// No response at all (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => AppError::Unauthorized(detail),
            404 => AppError::NotFound(detail),
            400..=499 => AppError::Validation { status, detail },
            _ => AppError::Server { status, detail },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::Server { .. } => ErrorKind::Server,
            AppError::Network(_) => ErrorKind::Network,
            _ => ErrorKind::Local,
        }
    }

    /// The server-provided `detail` message, if this error came from a response.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Unauthorized(d) | AppError::NotFound(d) => Some(d),
            AppError::Validation { detail, .. } | AppError::Server { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Reads worth retrying: the server or the network may recover on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Server | ErrorKind::Network)
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
