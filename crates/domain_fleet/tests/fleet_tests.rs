//! Fleet service tests against the in-memory adapters

use std::sync::Arc;

use core_kernel::storage::mock::MemoryObjectStore;
use core_kernel::VehicleId;
use domain_fleet::{
    FleetError, FleetService, MockVehiclePort, NewVehicle, PhotoFile, VehiclePhotoGateway,
    VehicleUpdate,
};
use rust_decimal_macros::dec;

fn service() -> (FleetService, Arc<MemoryObjectStore>) {
    let store = Arc::new(MemoryObjectStore::new());
    let service = FleetService::new(
        Arc::new(MockVehiclePort::new()),
        VehiclePhotoGateway::new(store.clone()),
    );
    (service, store)
}

fn png() -> PhotoFile {
    PhotoFile {
        file_name: "side.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![1, 2, 3],
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_catalog_hides_unavailable_vehicles() {
        let (service, _) = service();
        let logan = service
            .create_vehicle(NewVehicle::new("Dacia Logan", "Blanc"), None, None)
            .await
            .unwrap();
        service
            .create_vehicle(NewVehicle::new("Renault Clio", "Noir"), None, None)
            .await
            .unwrap();

        service.toggle_availability(logan.id, None).await.unwrap();

        let catalog = service.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].model, "Renault Clio");
        assert_eq!(service.all_vehicles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bookable_vehicle_requires_availability() {
        let (service, _) = service();
        let mut new = NewVehicle::new("Fiat 500", "Rose");
        new.available = false;
        let vehicle = service.create_vehicle(new, None, None).await.unwrap();

        let err = service.bookable_vehicle(vehicle.id).await.unwrap_err();
        assert!(matches!(err, FleetError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unknown_vehicle() {
        let (service, _) = service();
        let err = service.vehicle(VehicleId::new()).await.unwrap_err();
        assert!(matches!(err, FleetError::VehicleNotFound(_)));
    }
}

mod administration {
    use super::*;

    #[tokio::test]
    async fn test_create_with_photo_sets_image_url() {
        let (service, store) = service();
        let vehicle = service
            .create_vehicle(NewVehicle::new("Hyundai Accent", "Bleu"), Some(png()), None)
            .await
            .unwrap();

        let expected = format!("memory://vehicle-photos/{}.png", vehicle.id.as_uuid());
        assert_eq!(vehicle.image_url.as_deref(), Some(expected.as_str()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_vehicle_is_not_stored() {
        let (service, _) = service();
        let invalid = NewVehicle::new("", "Blanc").with_rates(dec!(-5), dec!(200));

        let err = service.create_vehicle(invalid, None, None).await.unwrap_err();
        assert!(matches!(err, FleetError::InvalidData(_)));
        assert!(service.all_vehicles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rates() {
        let (service, _) = service();
        let vehicle = service
            .create_vehicle(NewVehicle::new("Kia Picanto", "Vert"), None, None)
            .await
            .unwrap();

        let update = VehicleUpdate {
            price_per_day: Some(dec!(35)),
            deposit: Some(dec!(500)),
            ..Default::default()
        };
        let updated = service.update_vehicle(vehicle.id, update, None, None).await.unwrap();
        assert_eq!(updated.price_per_day, dec!(35));
        assert_eq!(updated.deposit, dec!(500));
    }

    #[tokio::test]
    async fn test_delete_vehicle() {
        let (service, _) = service();
        let vehicle = service
            .create_vehicle(NewVehicle::new("Seat Ibiza", "Rouge"), None, None)
            .await
            .unwrap();

        service.delete_vehicle(vehicle.id, None).await.unwrap();
        assert!(service.delete_vehicle(vehicle.id, None).await.is_err());
    }
}
