//! Customer domain errors

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Reliability score must be between 0 and 5, got {0}")]
    InvalidReliability(i32),

    #[error("Invalid client data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for CustomerError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => CustomerError::ClientNotFound(id),
            other => CustomerError::Port(other),
        }
    }
}
