//! Repository implementations
//!
//! Each repository owns the SQL of one table and works in row types; the
//! adapters translate rows to and from domain models.

pub mod vehicles;
pub mod clients;
pub mod reservations;

pub use vehicles::VehicleRepository;
pub use clients::ClientRepository;
pub use reservations::ReservationRepository;
