//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the rental system. Every fixture is pinned to
//! the same frozen instant so that "future pickup" and "licence not expired"
//! rules give the same answer on every run.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, FixedClock, Money, SharedClock, Timezone, VehicleId};
use domain_booking::{PersonalInfo, RentalSchedule, StepRules};
use domain_fleet::{FuelType, NewVehicle, Transmission, Vehicle};

/// The instant every fixture treats as "now": 20 Feb 2025, 10:00 in Casablanca
pub static FIXED_NOW: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(2025, 2, 20, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
});

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn now() -> DateTime<Utc> {
        *FIXED_NOW
    }

    pub fn clock() -> SharedClock {
        Arc::new(FixedClock::at(Self::now()))
    }

    /// Step rules evaluated at [`FIXED_NOW`] in Casablanca
    pub fn rules() -> StepRules {
        StepRules::new(Self::clock(), Timezone::casablanca())
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }

    /// First day after the frozen instant
    pub fn tomorrow() -> NaiveDate {
        Self::date(2025, 2, 21)
    }

    /// A three-day rental starting tomorrow
    pub fn rental_period() -> (NaiveDate, NaiveDate) {
        (Self::date(2025, 2, 21), Self::date(2025, 2, 24))
    }

    pub fn yesterday() -> NaiveDate {
        Self::date(2025, 2, 19)
    }
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn eur(amount: i64) -> Money {
        Money::new(amount.into(), Currency::EUR)
    }

    /// Daily rate of the economy fixture vehicle
    pub fn economy_rate() -> Money {
        Money::new(dec!(20), Currency::EUR)
    }

    pub fn standard_deposit() -> Money {
        Money::new(dec!(200), Currency::EUR)
    }
}

/// Fixture for fleet test data
pub struct VehicleFixtures;

impl VehicleFixtures {
    /// Dacia Logan, 20€/day, 200€ deposit
    pub fn dacia_logan() -> Vehicle {
        Vehicle::from_new(
            VehicleId::new(),
            NewVehicle::new("Dacia Logan", "Blanc").with_rates(dec!(20), dec!(200)),
        )
    }

    /// Peugeot 208 automatic on petrol, 35€/day
    pub fn peugeot_208() -> Vehicle {
        let mut new = NewVehicle::new("Peugeot 208", "Gris").with_rates(dec!(35), dec!(300));
        new.fuel = FuelType::Essence;
        new.transmission = Transmission::Automatic;
        Vehicle::from_new(VehicleId::new(), new)
    }

    /// A vehicle marked unavailable by the agency
    pub fn in_maintenance() -> Vehicle {
        let mut new = NewVehicle::new("Renault Clio", "Rouge").with_rates(dec!(25), dec!(250));
        new.available = false;
        Vehicle::from_new(VehicleId::new(), new)
    }
}

/// Fixture for wizard input
pub struct DraftFixtures;

impl DraftFixtures {
    pub fn schedule(start: NaiveDate, end: NaiveDate) -> RentalSchedule {
        RentalSchedule {
            start_date: Some(start),
            end_date: Some(end),
            pickup_location: "Marrakesh Menara Airport".to_string(),
            return_location: "Marrakesh Menara Airport".to_string(),
            ..RentalSchedule::default()
        }
    }

    pub fn personal_info() -> PersonalInfo {
        PersonalInfo {
            first_name: "Yassine".to_string(),
            last_name: "Benali".to_string(),
            email: "yassine@example.ma".to_string(),
            phone: "0612345678".to_string(),
            address: "12 Rue de Fès, Marrakech".to_string(),
            national_id: "ab123456".to_string(),
            license_number: "MA12345678".to_string(),
            license_expiry: Some(TemporalFixtures::date(2027, 1, 1)),
            notes: Some("Vol AT800".to_string()),
        }
    }
}

/// Fixture for uploaded documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// JPEG magic bytes, enough for the type and size checks
    pub fn jpeg() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]
    }

    pub fn pdf() -> Vec<u8> {
        b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec()
    }

    pub fn jpeg_base64() -> String {
        STANDARD.encode(Self::jpeg())
    }

    /// Payload one byte over the 5 MB document limit
    pub fn oversized() -> Vec<u8> {
        vec![0u8; 5 * 1024 * 1024 + 1]
    }
}
