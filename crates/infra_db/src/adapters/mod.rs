//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps the
//! repository of its table, converts rows to domain models and reports
//! `DatabaseError`s as `PortError`s.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresVehicleAdapter;
//! use domain_fleet::VehiclePort;
//!
//! let vehicles: Arc<dyn VehiclePort> = Arc::new(PostgresVehicleAdapter::new(pool));
//! ```

pub mod fleet;
pub mod customer;
pub mod booking;

pub use fleet::PostgresVehicleAdapter;
pub use customer::PostgresClientAdapter;
pub use booking::PostgresReservationAdapter;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Runs `SELECT 1` and times it
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, start.elapsed().as_millis() as u64),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, format!("Database error: {}", e)),
    }
}
