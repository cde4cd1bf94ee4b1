//! Fleet domain errors

use thiserror::Error;
use validator::ValidationErrors;

use core_kernel::PortError;

/// Errors that can occur in the fleet domain
#[derive(Debug, Error)]
pub enum FleetError {
    /// Vehicle with the given ID was not found
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    /// Invalid vehicle data provided
    #[error("Invalid vehicle data: {0}")]
    InvalidData(String),

    /// Vehicle exists but is not offered for rent
    #[error("Vehicle is not available: {0}")]
    Unavailable(String),

    /// Photo was refused before upload
    #[error("Photo rejected: {0}")]
    PhotoRejected(String),

    /// Photo upload failed at the storage service
    #[error("Photo upload failed: {0}")]
    PhotoUpload(String),

    /// Underlying port failure
    #[error(transparent)]
    Port(PortError),
}

impl FleetError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        FleetError::VehicleNotFound(id.to_string())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        FleetError::InvalidData(message.into())
    }
}

impl From<PortError> for FleetError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => FleetError::VehicleNotFound(id),
            other => FleetError::Port(other),
        }
    }
}

impl From<ValidationErrors> for FleetError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        FleetError::InvalidData(messages.join("; "))
    }
}
