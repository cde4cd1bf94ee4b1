//! Reservation model and its status lifecycle

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClientId, DateRange, Money, ReservationId, SubmissionId, TemporalError, VehicleId};

use crate::documents::DocumentUrls;
use crate::error::BookingError;

/// Booking status, set by the admin after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Only pending reservations can be decided
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!((self, target), (Pending, Confirmed) | (Pending, Cancelled))
    }

    /// Transitions the console offers for this status
    pub fn available_transitions(&self) -> Vec<BookingStatus> {
        Self::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(*target))
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.available_transitions().is_empty()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::NotFound(format!("booking status '{}'", other))),
        }
    }
}

/// Payment status, tracked by hand at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(BookingError::NotFound(format!("payment status '{}'", other))),
        }
    }
}

/// A persisted reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub client_id: ClientId,
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
    /// Rental amount, deposit excluded
    pub total_amount: Money,
    /// Refundable deposit copied from the vehicle at submission
    pub deposit_amount: Money,
    pub document_urls: DocumentUrls,
    pub documents_verified: bool,
    pub comments: Option<String>,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub submission_id: Option<SubmissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn from_new(id: ReservationId, new: NewReservation) -> Self {
        let now = Utc::now();
        Self {
            id,
            documents_verified: new.documents_verified(),
            client_id: new.client_id,
            vehicle_id: new.vehicle_id,
            start_date: new.start_date,
            start_time: new.start_time,
            end_date: new.end_date,
            end_time: new.end_time,
            pickup_location: new.pickup_location,
            return_location: new.return_location,
            total_amount: new.total_amount,
            deposit_amount: new.deposit_amount,
            document_urls: new.document_urls,
            comments: new.comments,
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            submission_id: new.submission_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn period(&self) -> Result<DateRange, TemporalError> {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Moves to `target` if the lifecycle allows it
    pub fn change_status(&mut self, target: BookingStatus) -> Result<(), BookingError> {
        if !self.booking_status.can_transition_to(target) {
            return Err(BookingError::invalid_transition(self.booking_status, target));
        }
        self.booking_status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether `new` describes the same booking: vehicle, dates, places, amounts and notes
    pub fn same_booking(&self, new: &NewReservation) -> bool {
        self.vehicle_id == new.vehicle_id
            && self.start_date == new.start_date
            && self.start_time == new.start_time
            && self.end_date == new.end_date
            && self.end_time == new.end_time
            && self.pickup_location == new.pickup_location
            && self.return_location == new.return_location
            && self.total_amount == new.total_amount
            && self.deposit_amount == new.deposit_amount
            && self.comments == new.comments
    }

    /// Whether this reservation still holds the vehicle for `range`
    pub fn blocks(&self, vehicle_id: VehicleId, range: &DateRange) -> bool {
        self.vehicle_id == vehicle_id
            && self.booking_status != BookingStatus::Cancelled
            && self.period().map(|p| p.overlaps(range)).unwrap_or(false)
    }
}

/// Fields of a reservation about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub client_id: ClientId,
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
    pub total_amount: Money,
    pub deposit_amount: Money,
    pub document_urls: DocumentUrls,
    pub comments: Option<String>,
    pub submission_id: Option<SubmissionId>,
}

impl NewReservation {
    pub fn documents_verified(&self) -> bool {
        self.document_urls.all_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_confirmed_or_cancelled() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));
        assert_eq!(
            BookingStatus::Pending.available_transitions(),
            vec![BookingStatus::Confirmed, BookingStatus::Cancelled]
        );
    }

    #[test]
    fn test_decided_statuses_are_terminal() {
        for status in [BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert!(status.is_terminal());
            for target in BookingStatus::ALL {
                assert!(!status.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert!("archived".parse::<BookingStatus>().is_err());
        assert_eq!("partial".parse::<PaymentStatus>().unwrap(), PaymentStatus::Partial);
    }
}
