//! Booking domain errors
//!
//! Every abort path of the wizard and the commit sequence ends in one of
//! these variants. None of them discards the draft.

use thiserror::Error;

use core_kernel::PortError;
use domain_customer::CustomerError;
use domain_fleet::FleetError;

use crate::documents::DocumentSlot;
use crate::validation::ValidationReport;

#[derive(Debug, Error)]
pub enum BookingError {
    /// One or more fields fail their rule; nothing moved
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// The file was not attached
    #[error("{slot} rejected: {message}")]
    FileRejected { slot: DocumentSlot, message: String },

    /// The storage service refused or failed a document upload
    #[error("Upload of {slot} failed: {message}")]
    Upload { slot: DocumentSlot, message: String },

    /// A client or reservation write failed
    #[error("Could not save {entity}: {message}")]
    Persistence { entity: &'static str, message: String },

    /// The vehicle is already booked for overlapping dates
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The draft cannot be edited in the current state
    #[error("Reservation draft is locked ({0})")]
    DraftLocked(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Customer(#[from] CustomerError),
}

impl BookingError {
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        BookingError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn persistence(entity: &'static str, err: PortError) -> Self {
        BookingError::Persistence {
            entity,
            message: err.to_string(),
        }
    }

    /// The validation report, when this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            BookingError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ValidationReport> for BookingError {
    fn from(report: ValidationReport) -> Self {
        BookingError::Validation(report)
    }
}

impl From<PortError> for BookingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                BookingError::NotFound(format!("{} {}", entity_type, id))
            }
            PortError::Conflict { message } => BookingError::Conflict(message),
            other => BookingError::Persistence {
                entity: "record",
                message: other.to_string(),
            },
        }
    }
}
