//! Reservation draft
//!
//! Everything the customer has entered so far. The draft lives only inside a
//! wizard session; it is persisted as a client and a reservation row when the
//! submission commits.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::SubmissionId;
use domain_fleet::Vehicle;

use crate::documents::DocumentSet;

/// A suggested pickup point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickupLocation {
    pub label: &'static str,
    pub value: &'static str,
}

/// Pickup points offered in the location picker; free text is also accepted
pub const PICKUP_LOCATIONS: [PickupLocation; 3] = [
    PickupLocation {
        label: "Marrakesh - Aéroport",
        value: "Marrakesh Menara Airport",
    },
    PickupLocation {
        label: "Casablanca - Aéroport",
        value: "Casablanca – Aéroport Mohammed V",
    },
    PickupLocation {
        label: "Bureau Direct",
        value: "KLK Auto Car - Bureau",
    },
];

pub fn default_pickup_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub fn default_return_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Dates, times and places of the rental
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalSchedule {
    pub start_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_date: Option<NaiveDate>,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
}

impl Default for RentalSchedule {
    fn default() -> Self {
        Self {
            start_date: None,
            start_time: default_pickup_time(),
            end_date: None,
            end_time: default_return_time(),
            pickup_location: String::new(),
            return_location: String::new(),
        }
    }
}

/// Customer identity and licence details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PersonalInfo {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: String,
    /// National ID card (CIN) number
    pub national_id: String,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    /// Free-text trip details
    pub notes: Option<String>,
}

impl PersonalInfo {
    /// The details as they are stored: surrounding whitespace removed, blank notes dropped
    pub fn normalized(&self) -> PersonalInfo {
        PersonalInfo {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            national_id: self.national_id.trim().to_string(),
            license_number: self.license_number.trim().to_string(),
            license_expiry: self.license_expiry,
            notes: self.trimmed_notes(),
        }
    }

    /// Notes with surrounding whitespace removed, `None` when blank
    pub fn trimmed_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// The full draft of one reservation
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDraft {
    /// Idempotency token shared by every submit attempt of this draft
    pub submission_id: SubmissionId,
    pub vehicle: Option<Vehicle>,
    pub schedule: RentalSchedule,
    pub personal: PersonalInfo,
    pub documents: DocumentSet,
    pub terms_accepted: bool,
}

impl ReservationDraft {
    pub fn new() -> Self {
        Self {
            submission_id: SubmissionId::new_v7(),
            vehicle: None,
            schedule: RentalSchedule::default(),
            personal: PersonalInfo::default(),
            documents: DocumentSet::default(),
            terms_accepted: false,
        }
    }

    pub fn with_vehicle(vehicle: Vehicle) -> Self {
        Self {
            vehicle: Some(vehicle),
            ..Self::new()
        }
    }
}

impl Default for ReservationDraft {
    fn default() -> Self {
        Self::new()
    }
}
