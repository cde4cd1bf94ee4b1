//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use core_kernel::PortError;
use domain_booking::BookingError;
use domain_customer::CustomerError;
use domain_fleet::FleetError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The wizard session is busy submitting or already submitted
    #[error("Locked: {0}")]
    Locked(String),

    #[error("Validation error: {message}")]
    Validation { message: String, details: Vec<String> },

    /// A file upload to the storage service failed
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Locked(_) => (StatusCode::LOCKED, "locked"),
            ApiError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Upload(_) => (StatusCode::BAD_GATEWAY, "upload_failed"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let (message, details) = match self {
            ApiError::Validation { message, details } if !details.is_empty() => (message, Some(details)),
            ApiError::Validation { message, .. } => (message, None),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Locked(msg)
            | ApiError::Upload(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Database(msg)
            | ApiError::Internal(msg) => (msg, None),
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
        };

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = error_type, %message, "request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Connection { .. }
            | PortError::Timeout { .. }
            | PortError::ServiceUnavailable { .. } => ApiError::Unavailable(err.to_string()),
            PortError::Unauthorized { message } => ApiError::Internal(message),
            PortError::Internal { message, .. } => ApiError::Database(message),
        }
    }
}

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::VehicleNotFound(_) => ApiError::NotFound(err.to_string()),
            FleetError::InvalidData(_) | FleetError::PhotoRejected(_) => ApiError::validation(err.to_string()),
            FleetError::Unavailable(_) => ApiError::Conflict(err.to_string()),
            FleetError::PhotoUpload(message) => ApiError::Upload(message),
            FleetError::Port(port) => port.into(),
        }
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::ClientNotFound(_) => ApiError::NotFound(err.to_string()),
            CustomerError::InvalidReliability(_) | CustomerError::InvalidData(_) => {
                ApiError::validation(err.to_string())
            }
            CustomerError::Port(port) => port.into(),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(report) => ApiError::Validation {
                message: "Please correct the highlighted fields".to_string(),
                details: report
                    .errors()
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect(),
            },
            BookingError::FileRejected { slot, message } => ApiError::Validation {
                details: vec![format!("{}: {}", slot.field_name(), message)],
                message,
            },
            BookingError::Upload { .. } => ApiError::Upload(err.to_string()),
            BookingError::Persistence { .. } => ApiError::Database(err.to_string()),
            BookingError::Conflict(_) | BookingError::InvalidTransition { .. } => {
                ApiError::Conflict(err.to_string())
            }
            BookingError::DraftLocked(message) => ApiError::Locked(message),
            BookingError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BookingError::Fleet(fleet) => fleet.into(),
            BookingError::Customer(customer) => customer.into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::Validation {
            message: "Invalid request".to_string(),
            details,
        }
    }
}
