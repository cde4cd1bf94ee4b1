//! Request handlers

pub mod health;
pub mod catalog;
pub mod wizard;
pub mod admin;

use uuid::Uuid;

use core_kernel::{ClientId, ReservationId, VehicleId, WizardSessionId};

pub(crate) fn vehicle_id(id: Uuid) -> VehicleId {
    VehicleId::from_uuid(id)
}

pub(crate) fn session_id(id: Uuid) -> WizardSessionId {
    WizardSessionId::from_uuid(id)
}

pub(crate) fn reservation_id(id: Uuid) -> ReservationId {
    ReservationId::from_uuid(id)
}

pub(crate) fn client_id(id: Uuid) -> ClientId {
    ClientId::from_uuid(id)
}
