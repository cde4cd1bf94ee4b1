//! Vehicle photos
//!
//! One photo per vehicle, stored at `{vehicle_id}.{ext}` in the photo bucket.
//! A new upload replaces the previous object.

use std::sync::Arc;

use tracing::{debug, instrument};

use core_kernel::storage::file_extension;
use core_kernel::{ObjectStore, ObjectUpload, VehicleId};

use crate::error::FleetError;

/// Default bucket for vehicle photos
pub const VEHICLE_PHOTOS_BUCKET: &str = "vehicle-photos";

/// Largest accepted photo
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// An image file as received from the admin form
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Uploads vehicle photos and resolves their public URLs
#[derive(Clone)]
pub struct VehiclePhotoGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl VehiclePhotoGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_bucket(store, VEHICLE_PHOTOS_BUCKET)
    }

    pub fn with_bucket(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn object_path(vehicle_id: VehicleId, file_name: &str) -> String {
        format!("{}.{}", vehicle_id.as_uuid(), file_extension(file_name))
    }

    /// Replaces the vehicle's photo and returns its public URL
    #[instrument(skip(self, photo), fields(vehicle_id = %vehicle_id, size = photo.bytes.len()))]
    pub async fn upload(&self, vehicle_id: VehicleId, photo: PhotoFile) -> Result<String, FleetError> {
        if !photo.content_type.starts_with("image/") {
            return Err(FleetError::PhotoRejected(format!(
                "{} is not an image",
                photo.content_type
            )));
        }
        if photo.bytes.len() > MAX_PHOTO_BYTES {
            return Err(FleetError::PhotoRejected("photo exceeds 5 MB".to_string()));
        }

        let path = Self::object_path(vehicle_id, &photo.file_name);
        self.store
            .remove_objects(&self.bucket, std::slice::from_ref(&path))
            .await
            .map_err(|e| FleetError::PhotoUpload(e.to_string()))?;

        let stored = self
            .store
            .put_public(ObjectUpload {
                bucket: self.bucket.clone(),
                path,
                content_type: photo.content_type,
                bytes: photo.bytes,
                upsert: true,
            })
            .await
            .map_err(|e| FleetError::PhotoUpload(e.to_string()))?;

        debug!(url = %stored.public_url, "vehicle photo stored");
        Ok(stored.public_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::storage::mock::MemoryObjectStore;

    fn photo(content_type: &str, size: usize) -> PhotoFile {
        PhotoFile {
            file_name: "front.JPG".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[tokio::test]
    async fn test_upload_uses_vehicle_path() {
        let store = Arc::new(MemoryObjectStore::new());
        let gateway = VehiclePhotoGateway::new(store.clone());
        let id = VehicleId::new();

        let url = gateway.upload(id, photo("image/jpeg", 10)).await.unwrap();
        assert_eq!(url, format!("memory://vehicle-photos/{}.jpg", id.as_uuid()));
        assert!(store.get("vehicle-photos", &format!("{}.jpg", id.as_uuid())).await.is_some());
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let store = Arc::new(MemoryObjectStore::new());
        let gateway = VehiclePhotoGateway::new(store.clone());

        let err = gateway.upload(VehicleId::new(), photo("application/pdf", 10)).await.unwrap_err();
        assert!(matches!(err, FleetError::PhotoRejected(_)));
        assert!(store.upload_log().await.is_empty());
    }
}
