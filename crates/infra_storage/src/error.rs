//! Storage adapter errors

use reqwest::StatusCode;
use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The request never got a response
    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Storage service returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Storage configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Transport(e) => e.is_timeout() || e.is_connect(),
            StorageError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            StorageError::Config(_) => false,
        }
    }
}

impl From<StorageError> for PortError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Transport(e) if e.is_timeout() => PortError::Timeout {
                operation: "storage request".to_string(),
                duration_ms: 0,
            },
            StorageError::Transport(e) => PortError::connection(e.to_string()),
            StorageError::Status { status, message } => match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized { message },
                StatusCode::NOT_FOUND => PortError::not_found("Object", message),
                StatusCode::CONFLICT => PortError::conflict(message),
                StatusCode::PAYLOAD_TOO_LARGE | StatusCode::BAD_REQUEST => PortError::validation(message),
                s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => {
                    PortError::ServiceUnavailable {
                        service: format!("storage ({})", s),
                    }
                }
                _ => PortError::internal(message),
            },
            StorageError::Config(message) => PortError::internal(message),
        }
    }
}
