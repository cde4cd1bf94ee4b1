//! PostgreSQL reservation adapter
//!
//! Document URLs live in three columns (`cin_recto_url`, `cin_verso_url`,
//! `license_photo_url`); `cin_verified` is set when all three are present.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    ClientId, Currency, DateRange, DomainPort, HealthCheckResult, HealthCheckable, Money,
    OperationMetadata, PortError, ReservationId, SubmissionId, VehicleId,
};
use domain_booking::{
    BookingStatus, DocumentUrls, NewReservation, PaymentStatus, Reservation, ReservationPort,
    ReservationQuery, ReservationStats,
};

use crate::error::DatabaseError;
use crate::repositories::reservations::{NewReservationRow, ReservationRow};
use crate::repositories::ReservationRepository;

#[derive(Debug, Clone)]
pub struct PostgresReservationAdapter {
    repository: ReservationRepository,
    pool: PgPool,
}

impl PostgresReservationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReservationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresReservationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresReservationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-reservation-adapter").await
    }
}

#[async_trait]
impl ReservationPort for PostgresReservationAdapter {
    #[instrument(skip(self, reservation, _metadata), fields(vehicle_id = %reservation.vehicle_id))]
    async fn insert_reservation(
        &self,
        reservation: NewReservation,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError> {
        let row = NewReservationRow {
            id: ReservationId::new_v7().into(),
            cin_verified: reservation.documents_verified(),
            client_id: reservation.client_id.into(),
            vehicle_id: reservation.vehicle_id.into(),
            start_date: reservation.start_date,
            start_time: reservation.start_time,
            end_date: reservation.end_date,
            end_time: reservation.end_time,
            pickup_location: reservation.pickup_location,
            return_location: reservation.return_location,
            total_amount: reservation.total_amount.amount(),
            deposit_amount: reservation.deposit_amount.amount(),
            currency: reservation.total_amount.currency().code().to_string(),
            cin_recto_url: reservation.document_urls.id_front,
            cin_verso_url: reservation.document_urls.id_back,
            license_photo_url: reservation.document_urls.license_photo,
            comments: reservation.comments,
            submission_id: reservation.submission_id.map(Into::into),
        };
        let stored = self.repository.insert(row).await?;
        debug!(reservation_id = %stored.id, "reservation stored");
        row_to_reservation(stored)
    }

    async fn find_by_submission(
        &self,
        submission_id: SubmissionId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Option<Reservation>, PortError> {
        self.repository
            .find_by_submission(submission_id.into())
            .await?
            .map(row_to_reservation)
            .transpose()
    }

    #[instrument(skip(self, _metadata), fields(reservation_id = %id))]
    async fn get_reservation(
        &self,
        id: ReservationId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError> {
        row_to_reservation(self.repository.get_by_id(id.into()).await?)
    }

    #[instrument(skip(self, _metadata))]
    async fn list_reservations(
        &self,
        query: ReservationQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Reservation>, PortError> {
        self.repository
            .list(query.status.map(|s| s.as_str()), query.limit.map(i64::from))
            .await?
            .into_iter()
            .map(row_to_reservation)
            .collect()
    }

    #[instrument(skip(self, _metadata), fields(reservation_id = %id, from = %from, to = %to))]
    async fn update_reservation_status(
        &self,
        id: ReservationId,
        from: BookingStatus,
        to: BookingStatus,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Option<Reservation>, PortError> {
        self.repository
            .transition_booking_status(id.into(), from.as_str(), to.as_str())
            .await?
            .map(row_to_reservation)
            .transpose()
    }

    #[instrument(skip(self, _metadata), fields(reservation_id = %id, status = %status))]
    async fn update_payment_status(
        &self,
        id: ReservationId,
        status: PaymentStatus,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, PortError> {
        row_to_reservation(self.repository.set_payment_status(id.into(), status.as_str()).await?)
    }

    async fn has_overlap(
        &self,
        vehicle_id: VehicleId,
        range: DateRange,
        _metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        Ok(self
            .repository
            .has_overlap(vehicle_id.into(), range.start, range.end)
            .await?)
    }

    async fn reservation_stats(
        &self,
        _metadata: Option<OperationMetadata>,
    ) -> Result<ReservationStats, PortError> {
        let totals = self.repository.totals().await?;
        Ok(ReservationStats {
            total: totals.total,
            pending: totals.pending,
            confirmed_revenue: totals.confirmed_revenue,
        })
    }
}

fn row_to_reservation(row: ReservationRow) -> Result<Reservation, PortError> {
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|_| DatabaseError::invalid_column("reservations.currency", &row.currency))?;
    let booking_status: BookingStatus = row
        .booking_status
        .parse()
        .map_err(|_| DatabaseError::invalid_column("reservations.booking_status", &row.booking_status))?;
    let payment_status: PaymentStatus = row
        .payment_status
        .parse()
        .map_err(|_| DatabaseError::invalid_column("reservations.payment_status", &row.payment_status))?;

    Ok(Reservation {
        id: ReservationId::from(row.id),
        client_id: ClientId::from(row.client_id),
        vehicle_id: VehicleId::from(row.vehicle_id),
        start_date: row.start_date,
        start_time: row.start_time,
        end_date: row.end_date,
        end_time: row.end_time,
        pickup_location: row.pickup_location,
        return_location: row.return_location,
        total_amount: Money::new(row.total_amount, currency),
        deposit_amount: Money::new(row.deposit_amount, currency),
        document_urls: DocumentUrls {
            id_front: row.cin_recto_url,
            id_back: row.cin_verso_url,
            license_photo: row.license_photo_url,
        },
        documents_verified: row.cin_verified,
        comments: row.comments,
        booking_status,
        payment_status,
        submission_id: row.submission_id.map(SubmissionId::from),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
