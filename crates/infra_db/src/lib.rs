//! Infrastructure Database Layer
//!
//! PostgreSQL storage for vehicles, clients and reservations using SQLx.
//!
//! # Architecture
//!
//! Repositories hold the SQL and work in row types. Adapters implement the
//! domain ports on top of them, so the domain crates never see SQLx.
//!
//! Client and reservation inserts are idempotent on `submission_id`: a
//! retried submission finds the rows its earlier attempt wrote.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresReservationAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/klk_rental")).await?;
//! let reservations = PostgresReservationAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PostgresClientAdapter, PostgresReservationAdapter, PostgresVehicleAdapter};
