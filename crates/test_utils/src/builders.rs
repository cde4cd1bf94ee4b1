//! Test Data Builders
//!
//! Builders that let a test name only the fields it cares about, and
//! [`MockBackend`], the full set of in-memory adapters wired into the
//! domain services.

use std::sync::Arc;

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::fr_fr::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::storage::mock::MemoryObjectStore;
use core_kernel::{Currency, SharedClock, Timezone, VehicleId};
use domain_booking::{
    AdminConsole, BookingService, CommitSequencer, CommitSettings, DocumentUploadGateway,
    MockReservationPort, PersonalInfo, RecordingNotifier, StepRules,
};
use domain_customer::MockClientPort;
use domain_fleet::{FleetService, FuelType, MockVehiclePort, NewVehicle, Transmission, Vehicle, VehiclePhotoGateway};

use crate::fixtures::{DraftFixtures, TemporalFixtures};

/// Builder for fleet vehicles
pub struct VehicleBuilder {
    new: NewVehicle,
    image_url: Option<String>,
}

impl Default for VehicleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleBuilder {
    pub fn new() -> Self {
        Self {
            new: NewVehicle::new("Dacia Logan", "Blanc"),
            image_url: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.new.model = model.into();
        self
    }

    pub fn rates(mut self, price_per_day: Decimal, deposit: Decimal) -> Self {
        self.new = self.new.with_rates(price_per_day, deposit);
        self
    }

    pub fn fuel(mut self, fuel: FuelType) -> Self {
        self.new.fuel = fuel;
        self
    }

    pub fn transmission(mut self, transmission: Transmission) -> Self {
        self.new.transmission = transmission;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.new.available = false;
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// The creation request, as an admin would send it
    pub fn new_vehicle(self) -> NewVehicle {
        self.new
    }

    pub fn build(self) -> Vehicle {
        let mut vehicle = Vehicle::from_new(VehicleId::new(), self.new);
        vehicle.image_url = self.image_url;
        vehicle
    }
}

/// Builder for the personal-info step with randomized identity fields
pub struct PersonalInfoBuilder {
    info: PersonalInfo,
}

impl Default for PersonalInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonalInfoBuilder {
    /// Valid details under a generated name and email
    pub fn new() -> Self {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let email: String = SafeEmail().fake();

        let mut info = DraftFixtures::personal_info();
        if first.chars().count() >= 2 {
            info.first_name = first;
        }
        if last.chars().count() >= 2 {
            info.last_name = last;
        }
        info.email = email;
        Self { info }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.info.phone = phone.into();
        self
    }

    pub fn national_id(mut self, id: impl Into<String>) -> Self {
        self.info.national_id = id.into();
        self
    }

    pub fn license_number(mut self, number: impl Into<String>) -> Self {
        self.info.license_number = number.into();
        self
    }

    pub fn license_expiry(mut self, expiry: chrono::NaiveDate) -> Self {
        self.info.license_expiry = Some(expiry);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.info.email = email.into();
        self
    }

    pub fn build(self) -> PersonalInfo {
        self.info
    }
}

/// In-memory adapters plus the services built on them
///
/// Every handle is shared, so a test can drive a service and then inspect
/// what reached the stores.
#[derive(Clone)]
pub struct MockBackend {
    pub vehicles: Arc<MockVehiclePort>,
    pub clients: Arc<MockClientPort>,
    pub reservations: Arc<MockReservationPort>,
    pub store: Arc<MemoryObjectStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: SharedClock,
}

impl MockBackend {
    /// Backend whose fleet holds `vehicles`, with the clock at the fixture instant
    pub async fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: Arc::new(MockVehiclePort::with_vehicles(vehicles).await),
            clients: Arc::new(MockClientPort::new()),
            reservations: Arc::new(MockReservationPort::new()),
            store: Arc::new(MemoryObjectStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            clock: TemporalFixtures::clock(),
        }
    }

    /// Swaps in a notifier that refuses every hand-off
    pub fn with_failing_notifier(mut self) -> Self {
        self.notifier = Arc::new(RecordingNotifier::failing());
        self
    }

    pub fn rules(&self) -> StepRules {
        StepRules::new(self.clock.clone(), Timezone::casablanca())
    }

    pub fn fleet_service(&self) -> FleetService {
        FleetService::new(self.vehicles.clone(), VehiclePhotoGateway::new(self.store.clone()))
    }

    pub fn booking_service(&self, settings: CommitSettings) -> BookingService {
        let sequencer = CommitSequencer::new(
            self.clients.clone(),
            self.reservations.clone(),
            DocumentUploadGateway::new(self.store.clone()),
            self.notifier.clone(),
            settings,
        );
        BookingService::new(self.vehicles.clone(), sequencer, self.rules())
    }

    pub fn admin_console(&self, currency: Currency) -> AdminConsole {
        AdminConsole::new(
            self.vehicles.clone(),
            self.clients.clone(),
            self.reservations.clone(),
            currency,
        )
    }
}
