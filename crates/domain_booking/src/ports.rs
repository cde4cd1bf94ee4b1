//! Booking Domain Ports
//!
//! `ReservationPort` is the reservation store used by the commit sequence and
//! the admin console; `HandoffNotifier` receives the messaging deep link once
//! a reservation is saved.

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{
    DateRange, DomainPort, HealthCheckable, OperationMetadata, PortError, ReservationId,
    SubmissionId, VehicleId,
};

use crate::reservation::{BookingStatus, NewReservation, PaymentStatus, Reservation};

/// Query parameters for listing reservations
#[derive(Debug, Clone, Default)]
pub struct ReservationQuery {
    pub status: Option<BookingStatus>,
    pub limit: Option<u32>,
}

impl ReservationQuery {
    pub fn with_status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn recent(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationStats {
    pub total: i64,
    pub pending: i64,
    /// Sum of confirmed reservations' rental amounts
    pub confirmed_revenue: Decimal,
}

/// Port for reservation persistence
///
/// Listings are newest first.
#[async_trait]
pub trait ReservationPort: DomainPort + HealthCheckable {
    /// Inserts a pending reservation
    ///
    /// A reservation whose `submission_id` is already stored is not inserted
    /// again; the stored row is returned instead.
    async fn insert_reservation(
        &self,
        reservation: NewReservation,
        metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError>;

    async fn find_by_submission(
        &self,
        submission_id: SubmissionId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Option<Reservation>, PortError>;

    async fn get_reservation(
        &self,
        id: ReservationId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError>;

    async fn list_reservations(
        &self,
        query: ReservationQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Reservation>, PortError>;

    /// Sets the booking status only while the row still has status `from`
    ///
    /// Returns `None` when the reservation exists but was moved away from
    /// `from` in the meantime, so two concurrent decisions cannot both land.
    async fn update_reservation_status(
        &self,
        id: ReservationId,
        from: BookingStatus,
        to: BookingStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<Option<Reservation>, PortError>;

    async fn update_payment_status(
        &self,
        id: ReservationId,
        status: PaymentStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError>;

    /// True when a non-cancelled reservation of the vehicle overlaps `range`
    async fn has_overlap(
        &self,
        vehicle_id: VehicleId,
        range: DateRange,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    async fn reservation_stats(
        &self,
        metadata: Option<OperationMetadata>,
    ) -> Result<ReservationStats, PortError>;
}

/// Receives the messaging deep link of a committed reservation
///
/// Best effort: a failure is logged and reported on the receipt, the
/// reservation stays committed.
#[async_trait]
pub trait HandoffNotifier: Send + Sync {
    async fn hand_off(&self, url: &str) -> Result<(), PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::HealthCheckResult;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory reservation store; keeps insertion order
    #[derive(Debug, Default)]
    pub struct MockReservationPort {
        reservations: Arc<RwLock<Vec<Reservation>>>,
        fail_inserts: AtomicBool,
    }

    impl MockReservationPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_reservations(reservations: Vec<Reservation>) -> Self {
            let port = Self::new();
            port.reservations.write().await.extend(reservations);
            port
        }

        pub fn fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }

        pub async fn len(&self) -> usize {
            self.reservations.read().await.len()
        }

        pub async fn all(&self) -> Vec<Reservation> {
            self.reservations.read().await.clone()
        }

        async fn modify(
            &self,
            id: ReservationId,
            change: impl FnOnce(&mut Reservation),
        ) -> Result<Reservation, PortError> {
            let mut reservations = self.reservations.write().await;
            let reservation = reservations
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| PortError::not_found("Reservation", id))?;
            change(reservation);
            reservation.updated_at = Utc::now();
            Ok(reservation.clone())
        }
    }

    impl DomainPort for MockReservationPort {}

    #[async_trait]
    impl HealthCheckable for MockReservationPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-reservation-port", 0)
        }
    }

    #[async_trait]
    impl ReservationPort for MockReservationPort {
        async fn insert_reservation(
            &self,
            reservation: NewReservation,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Reservation, PortError> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(PortError::connection("reservation store unreachable"));
            }

            let mut reservations = self.reservations.write().await;
            if let Some(submission) = reservation.submission_id {
                if let Some(existing) = reservations.iter().find(|r| r.submission_id == Some(submission)) {
                    return Ok(existing.clone());
                }
            }

            let created = Reservation::from_new(ReservationId::new_v7(), reservation);
            reservations.push(created.clone());
            Ok(created)
        }

        async fn find_by_submission(
            &self,
            submission_id: SubmissionId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Option<Reservation>, PortError> {
            Ok(self
                .reservations
                .read()
                .await
                .iter()
                .find(|r| r.submission_id == Some(submission_id))
                .cloned())
        }

        async fn get_reservation(
            &self,
            id: ReservationId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Reservation, PortError> {
            self.reservations
                .read()
                .await
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Reservation", id))
        }

        async fn list_reservations(
            &self,
            query: ReservationQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Reservation>, PortError> {
            let reservations = self.reservations.read().await;
            let mut results: Vec<Reservation> = reservations
                .iter()
                .rev()
                .filter(|r| query.status.map_or(true, |s| r.booking_status == s))
                .cloned()
                .collect();
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn update_reservation_status(
            &self,
            id: ReservationId,
            from: BookingStatus,
            to: BookingStatus,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Option<Reservation>, PortError> {
            let mut reservations = self.reservations.write().await;
            let reservation = reservations
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| PortError::not_found("Reservation", id))?;
            if reservation.booking_status != from {
                return Ok(None);
            }
            reservation.booking_status = to;
            reservation.updated_at = Utc::now();
            Ok(Some(reservation.clone()))
        }

        async fn update_payment_status(
            &self,
            id: ReservationId,
            status: PaymentStatus,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Reservation, PortError> {
            self.modify(id, |r| r.payment_status = status).await
        }

        async fn has_overlap(
            &self,
            vehicle_id: VehicleId,
            range: DateRange,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            Ok(self
                .reservations
                .read()
                .await
                .iter()
                .any(|r| r.blocks(vehicle_id, &range)))
        }

        async fn reservation_stats(
            &self,
            _metadata: Option<OperationMetadata>,
        ) -> Result<ReservationStats, PortError> {
            let reservations = self.reservations.read().await;
            Ok(ReservationStats {
                total: reservations.len() as i64,
                pending: reservations
                    .iter()
                    .filter(|r| r.booking_status == BookingStatus::Pending)
                    .count() as i64,
                confirmed_revenue: reservations
                    .iter()
                    .filter(|r| r.booking_status == BookingStatus::Confirmed)
                    .map(|r| r.total_amount.amount())
                    .sum(),
            })
        }
    }

    /// Records every hand-off URL; can be told to fail
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        urls: RwLock<Vec<String>>,
        fail: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            let notifier = Self::default();
            notifier.fail.store(true, Ordering::SeqCst);
            notifier
        }

        pub async fn urls(&self) -> Vec<String> {
            self.urls.read().await.clone()
        }
    }

    #[async_trait]
    impl HandoffNotifier for RecordingNotifier {
        async fn hand_off(&self, url: &str) -> Result<(), PortError> {
            self.urls.write().await.push(url.to_string());
            if self.fail.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "messaging".to_string(),
                });
            }
            Ok(())
        }
    }
}
