//! Customer Domain
//!
//! Clients of the agency as recorded by reservation submissions, with the
//! admin-assigned reliability rating and the client search used by the
//! console.

pub mod client;
pub mod reliability;
pub mod error;
pub mod ports;

pub use client::{filter_clients, Client, NewClient};
pub use reliability::ReliabilityScore;
pub use error::CustomerError;
pub use ports::{ClientPort, ClientQuery};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockClientPort;
