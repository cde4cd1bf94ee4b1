//! Fleet Domain Ports
//!
//! The `VehiclePort` trait is everything the catalog and the admin console
//! need from the vehicle store. The PostgreSQL adapter lives in `infra_db`;
//! an in-memory implementation is available behind the `mock` feature.
//!
//! ```rust,ignore
//! use domain_fleet::ports::{VehiclePort, VehicleQuery};
//!
//! let offered = vehicles.list_vehicles(VehicleQuery::available_only(), None).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError, VehicleId};

use crate::vehicle::{NewVehicle, Vehicle, VehicleUpdate};

/// Query parameters for listing vehicles
#[derive(Debug, Clone, Default)]
pub struct VehicleQuery {
    /// Filter on availability
    pub available: Option<bool>,
    /// Limit results
    pub limit: Option<u32>,
}

impl VehicleQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// Vehicles currently offered for rent
    pub fn available_only() -> Self {
        Self {
            available: Some(true),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Port for vehicle persistence
///
/// Listings are ordered by model name.
#[async_trait]
pub trait VehiclePort: DomainPort + HealthCheckable {
    async fn list_vehicles(
        &self,
        query: VehicleQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Vehicle>, PortError>;

    /// Retrieves a vehicle, or `PortError::NotFound`
    async fn get_vehicle(
        &self,
        id: VehicleId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError>;

    async fn insert_vehicle(
        &self,
        vehicle: NewVehicle,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError>;

    async fn update_vehicle(
        &self,
        id: VehicleId,
        update: VehicleUpdate,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError>;

    async fn delete_vehicle(
        &self,
        id: VehicleId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Number of vehicles, optionally only the available ones
    async fn count_vehicles(
        &self,
        available_only: bool,
        metadata: Option<OperationMetadata>,
    ) -> Result<i64, PortError>;
}

/// Convenience operations built on [`VehiclePort`]
#[async_trait]
pub trait VehiclePortExt: VehiclePort {
    /// Flips the availability flag and returns the updated vehicle
    async fn toggle_availability(
        &self,
        id: VehicleId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError> {
        let current = self.get_vehicle(id, metadata.clone()).await?;
        self.update_vehicle(id, VehicleUpdate::availability(!current.available), metadata)
            .await
    }

    async fn set_image_url(
        &self,
        id: VehicleId,
        url: String,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError> {
        self.update_vehicle(id, VehicleUpdate::image(url), metadata).await
    }
}

impl<T: VehiclePort + ?Sized> VehiclePortExt for T {}

/// In-memory vehicle store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockVehiclePort {
        vehicles: Arc<RwLock<HashMap<VehicleId, Vehicle>>>,
    }

    impl MockVehiclePort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with vehicles for testing
        pub async fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
            let port = Self::new();
            {
                let mut store = port.vehicles.write().await;
                for vehicle in vehicles {
                    store.insert(vehicle.id, vehicle);
                }
            }
            port
        }
    }

    impl DomainPort for MockVehiclePort {}

    #[async_trait]
    impl HealthCheckable for MockVehiclePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-vehicle-port", 0)
        }
    }

    #[async_trait]
    impl VehiclePort for MockVehiclePort {
        async fn list_vehicles(
            &self,
            query: VehicleQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Vehicle>, PortError> {
            let vehicles = self.vehicles.read().await;
            let mut results: Vec<Vehicle> = vehicles
                .values()
                .filter(|v| query.available.map_or(true, |a| v.available == a))
                .cloned()
                .collect();
            results.sort_by(|a, b| a.model.cmp(&b.model));

            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn get_vehicle(
            &self,
            id: VehicleId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vehicle, PortError> {
            self.vehicles
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Vehicle", id))
        }

        async fn insert_vehicle(
            &self,
            vehicle: NewVehicle,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vehicle, PortError> {
            let vehicle = Vehicle::from_new(VehicleId::new_v7(), vehicle);
            self.vehicles.write().await.insert(vehicle.id, vehicle.clone());
            Ok(vehicle)
        }

        async fn update_vehicle(
            &self,
            id: VehicleId,
            update: VehicleUpdate,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vehicle, PortError> {
            let mut vehicles = self.vehicles.write().await;
            let vehicle = vehicles
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Vehicle", id))?;
            vehicle.apply(update);
            Ok(vehicle.clone())
        }

        async fn delete_vehicle(
            &self,
            id: VehicleId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.vehicles
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Vehicle", id))
        }

        async fn count_vehicles(
            &self,
            available_only: bool,
            _metadata: Option<OperationMetadata>,
        ) -> Result<i64, PortError> {
            let vehicles = self.vehicles.read().await;
            Ok(vehicles
                .values()
                .filter(|v| !available_only || v.available)
                .count() as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockVehiclePort;
    use super::*;

    #[tokio::test]
    async fn test_toggle_availability_flips_flag() {
        let port = MockVehiclePort::new();
        let vehicle = port
            .insert_vehicle(NewVehicle::new("Peugeot 208", "Gris"), None)
            .await
            .unwrap();
        assert!(vehicle.available);

        let toggled = port.toggle_availability(vehicle.id, None).await.unwrap();
        assert!(!toggled.available);
        assert_eq!(port.count_vehicles(true, None).await.unwrap(), 0);
        assert_eq!(port.count_vehicles(false, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_model() {
        let port = MockVehiclePort::new();
        port.insert_vehicle(NewVehicle::new("Renault Clio", "Noir"), None).await.unwrap();
        port.insert_vehicle(NewVehicle::new("Dacia Logan", "Blanc"), None).await.unwrap();

        let models: Vec<String> = port
            .list_vehicles(VehicleQuery::all(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.model)
            .collect();
        assert_eq!(models, vec!["Dacia Logan", "Renault Clio"]);
    }

    #[tokio::test]
    async fn test_missing_vehicle_is_not_found() {
        let port = MockVehiclePort::new();
        let err = port.get_vehicle(VehicleId::new(), None).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
