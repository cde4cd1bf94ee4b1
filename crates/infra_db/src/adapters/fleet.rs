//! PostgreSQL vehicle adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError, VehicleId};
use domain_fleet::{FuelType, NewVehicle, Transmission, Vehicle, VehiclePort, VehicleQuery, VehicleUpdate};

use crate::error::DatabaseError;
use crate::repositories::vehicles::{NewVehicleRow, VehiclePatch, VehicleRow};
use crate::repositories::VehicleRepository;

#[derive(Debug, Clone)]
pub struct PostgresVehicleAdapter {
    repository: VehicleRepository,
    pool: PgPool,
}

impl PostgresVehicleAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresVehicleAdapter {}

#[async_trait]
impl HealthCheckable for PostgresVehicleAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-vehicle-adapter").await
    }
}

#[async_trait]
impl VehiclePort for PostgresVehicleAdapter {
    #[instrument(skip(self, _metadata))]
    async fn list_vehicles(
        &self,
        query: VehicleQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Vehicle>, PortError> {
        let rows = self
            .repository
            .list(query.available, query.limit.map(i64::from))
            .await?;
        debug!(count = rows.len(), "vehicles listed");
        rows.into_iter().map(row_to_vehicle).collect()
    }

    #[instrument(skip(self, _metadata), fields(vehicle_id = %id))]
    async fn get_vehicle(
        &self,
        id: VehicleId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError> {
        row_to_vehicle(self.repository.get_by_id(id.into()).await?)
    }

    #[instrument(skip(self, vehicle, _metadata), fields(model = %vehicle.model))]
    async fn insert_vehicle(
        &self,
        vehicle: NewVehicle,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError> {
        let row = NewVehicleRow {
            id: VehicleId::new_v7().into(),
            model: vehicle.model,
            color: vehicle.color,
            price_per_day: vehicle.price_per_day,
            deposit: vehicle.deposit,
            mileage: vehicle.mileage_policy,
            fuel: vehicle.fuel.as_str().to_string(),
            transmission: vehicle.transmission.as_str().to_string(),
            seats: vehicle.seats,
            available: vehicle.available,
            insurance_included: vehicle.insurance_included,
        };
        row_to_vehicle(self.repository.insert(row).await?)
    }

    #[instrument(skip(self, update, _metadata), fields(vehicle_id = %id))]
    async fn update_vehicle(
        &self,
        id: VehicleId,
        update: VehicleUpdate,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, PortError> {
        let patch = VehiclePatch {
            model: update.model,
            color: update.color,
            price_per_day: update.price_per_day,
            deposit: update.deposit,
            mileage: update.mileage_policy,
            fuel: update.fuel.map(|f| f.as_str().to_string()),
            transmission: update.transmission.map(|t| t.as_str().to_string()),
            seats: update.seats,
            available: update.available,
            insurance_included: update.insurance_included,
            image_url: update.image_url,
        };
        row_to_vehicle(self.repository.update(id.into(), patch).await?)
    }

    #[instrument(skip(self, _metadata), fields(vehicle_id = %id))]
    async fn delete_vehicle(
        &self,
        id: VehicleId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        Ok(self.repository.delete(id.into()).await?)
    }

    async fn count_vehicles(
        &self,
        available_only: bool,
        _metadata: Option<OperationMetadata>,
    ) -> Result<i64, PortError> {
        Ok(self.repository.count(available_only).await?)
    }
}

fn row_to_vehicle(row: VehicleRow) -> Result<Vehicle, PortError> {
    let fuel: FuelType = row
        .fuel
        .parse()
        .map_err(|_| DatabaseError::invalid_column("vehicles.fuel", &row.fuel))?;
    let transmission: Transmission = row
        .transmission
        .parse()
        .map_err(|_| DatabaseError::invalid_column("vehicles.transmission", &row.transmission))?;

    Ok(Vehicle {
        id: VehicleId::from(row.id),
        model: row.model,
        color: row.color,
        price_per_day: row.price_per_day,
        deposit: row.deposit,
        mileage_policy: row.mileage,
        fuel,
        transmission,
        seats: row.seats,
        available: row.available,
        insurance_included: row.insurance_included,
        image_url: row.image_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row(fuel: &str, transmission: &str) -> VehicleRow {
        VehicleRow {
            id: Uuid::now_v7(),
            model: "Peugeot 208".to_string(),
            color: "Rouge".to_string(),
            price_per_day: dec!(35),
            deposit: dec!(300),
            mileage: "Illimité".to_string(),
            fuel: fuel.to_string(),
            transmission: transmission.to_string(),
            seats: 5,
            available: true,
            insurance_included: false,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_labels_map_to_enums() {
        let vehicle = row_to_vehicle(row("Essence", "Automatique")).unwrap();
        assert_eq!(vehicle.fuel, FuelType::Essence);
        assert_eq!(vehicle.transmission, Transmission::Automatic);
        assert_eq!(vehicle.mileage_policy, "Illimité");
    }

    #[test]
    fn test_unknown_label_is_reported() {
        let err = row_to_vehicle(row("Hydrogène", "Manuelle")).unwrap_err();
        assert!(err.to_string().contains("vehicles.fuel"));
    }
}
