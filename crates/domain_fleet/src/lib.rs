//! Fleet Domain
//!
//! The vehicles the agency rents out: catalog listing, availability,
//! daily rates and deposits, and one photo per vehicle.

pub mod vehicle;
pub mod error;
pub mod ports;
pub mod photos;
pub mod services;

pub use vehicle::{FuelType, NewVehicle, Transmission, Vehicle, VehicleUpdate, DEFAULT_MILEAGE_POLICY};
pub use error::FleetError;
pub use ports::{VehiclePort, VehiclePortExt, VehicleQuery};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockVehiclePort;
pub use photos::{PhotoFile, VehiclePhotoGateway, VEHICLE_PHOTOS_BUCKET};
pub use services::FleetService;
