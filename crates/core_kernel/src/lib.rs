//! Core Kernel - Foundational types for the rental system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Business calendar and injectable clock
//! - Port error types and the object storage port

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod storage;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{
    Clock, DateRange, FixedClock, SharedClock, SystemClock, TemporalError, Timezone,
};
pub use identifiers::{ClientId, ReservationId, SubmissionId, VehicleId, WizardSessionId};
pub use error::CoreError;
pub use ports::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
pub use storage::{ObjectStore, ObjectUpload, StoredObject};
