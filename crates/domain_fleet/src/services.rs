//! Fleet services
//!
//! The catalog (read side, used by the public site and the wizard) and the
//! admin operations that add, edit and retire vehicles.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{OperationMetadata, VehicleId};

use crate::error::FleetError;
use crate::photos::{PhotoFile, VehiclePhotoGateway};
use crate::ports::{VehiclePort, VehiclePortExt, VehicleQuery};
use crate::vehicle::{NewVehicle, Vehicle, VehicleUpdate};

/// Vehicle catalog and fleet administration
#[derive(Clone)]
pub struct FleetService {
    vehicles: Arc<dyn VehiclePort>,
    photos: VehiclePhotoGateway,
}

impl FleetService {
    pub fn new(vehicles: Arc<dyn VehiclePort>, photos: VehiclePhotoGateway) -> Self {
        Self { vehicles, photos }
    }

    pub fn port(&self) -> Arc<dyn VehiclePort> {
        Arc::clone(&self.vehicles)
    }

    /// Vehicles shown in the public catalog
    pub async fn catalog(&self) -> Result<Vec<Vehicle>, FleetError> {
        Ok(self
            .vehicles
            .list_vehicles(VehicleQuery::available_only(), None)
            .await?)
    }

    /// All vehicles, for the admin console
    pub async fn all_vehicles(&self) -> Result<Vec<Vehicle>, FleetError> {
        Ok(self.vehicles.list_vehicles(VehicleQuery::all(), None).await?)
    }

    pub async fn vehicle(&self, id: VehicleId) -> Result<Vehicle, FleetError> {
        Ok(self.vehicles.get_vehicle(id, None).await?)
    }

    /// A vehicle that can be booked right now
    pub async fn bookable_vehicle(&self, id: VehicleId) -> Result<Vehicle, FleetError> {
        let vehicle = self.vehicle(id).await?;
        if !vehicle.available {
            return Err(FleetError::Unavailable(id.to_string()));
        }
        Ok(vehicle)
    }

    /// Adds a vehicle, then its photo when one is given
    ///
    /// The vehicle row is kept if the photo upload fails; the error is
    /// returned so the admin can retry the upload from the edit form.
    pub async fn create_vehicle(
        &self,
        new: NewVehicle,
        photo: Option<PhotoFile>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, FleetError> {
        new.check()?;
        let vehicle = self.vehicles.insert_vehicle(new, metadata.clone()).await?;
        info!(vehicle_id = %vehicle.id, model = %vehicle.model, "vehicle added");

        match photo {
            Some(photo) => self.attach_photo(vehicle.id, photo, metadata).await,
            None => Ok(vehicle),
        }
    }

    pub async fn update_vehicle(
        &self,
        id: VehicleId,
        update: VehicleUpdate,
        photo: Option<PhotoFile>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, FleetError> {
        update.check()?;
        let vehicle = self.vehicles.update_vehicle(id, update, metadata.clone()).await?;

        match photo {
            Some(photo) => self.attach_photo(vehicle.id, photo, metadata).await,
            None => Ok(vehicle),
        }
    }

    pub async fn delete_vehicle(
        &self,
        id: VehicleId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), FleetError> {
        self.vehicles.delete_vehicle(id, metadata).await?;
        info!(vehicle_id = %id, "vehicle deleted");
        Ok(())
    }

    pub async fn toggle_availability(
        &self,
        id: VehicleId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, FleetError> {
        let vehicle = self.vehicles.toggle_availability(id, metadata).await?;
        info!(vehicle_id = %id, available = vehicle.available, "availability changed");
        Ok(vehicle)
    }

    /// Uploads a photo and records its URL on the vehicle
    pub async fn attach_photo(
        &self,
        id: VehicleId,
        photo: PhotoFile,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vehicle, FleetError> {
        let url = self.photos.upload(id, photo).await.map_err(|e| {
            warn!(vehicle_id = %id, error = %e, "vehicle photo upload failed");
            e
        })?;
        Ok(self.vehicles.set_image_url(id, url, metadata).await?)
    }
}
