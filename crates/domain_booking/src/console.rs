//! Admin console operations
//!
//! Reservation review with status decisions, payment tracking, client
//! lookup and rating, and the dashboard counters.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{ClientId, Currency, Money, OperationMetadata, ReservationId};
use domain_customer::{Client, ClientPort, ClientQuery, ReliabilityScore};
use domain_fleet::{FleetError, Vehicle, VehiclePort, VehicleQuery};

use crate::error::BookingError;
use crate::ports::{ReservationPort, ReservationQuery};
use crate::reservation::{BookingStatus, PaymentStatus, Reservation};

/// Reservations shown on the dashboard
pub const RECENT_RESERVATIONS: u32 = 5;

/// A reservation with its client and vehicle, and what the admin can do next
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRow {
    pub reservation: Reservation,
    pub client: Option<Client>,
    pub vehicle: Option<Vehicle>,
    pub available_actions: Vec<BookingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_vehicles: i64,
    pub available_vehicles: i64,
    pub total_reservations: i64,
    pub pending_reservations: i64,
    pub total_clients: i64,
    /// Rental amounts of confirmed reservations
    pub total_revenue: Money,
    pub recent_reservations: Vec<ReservationRow>,
}

#[derive(Clone)]
pub struct AdminConsole {
    vehicles: Arc<dyn VehiclePort>,
    clients: Arc<dyn ClientPort>,
    reservations: Arc<dyn ReservationPort>,
    currency: Currency,
}

impl AdminConsole {
    pub fn new(
        vehicles: Arc<dyn VehiclePort>,
        clients: Arc<dyn ClientPort>,
        reservations: Arc<dyn ReservationPort>,
        currency: Currency,
    ) -> Self {
        Self {
            vehicles,
            clients,
            reservations,
            currency,
        }
    }

    /// Reservations newest first, optionally filtered by status
    pub async fn reservations(&self, status: Option<BookingStatus>) -> Result<Vec<ReservationRow>, BookingError> {
        let query = ReservationQuery {
            status,
            ..Default::default()
        };
        let reservations = self.reservations.list_reservations(query, None).await?;
        self.rows(reservations).await
    }

    /// Confirms or cancels a pending reservation
    #[instrument(skip(self, metadata), fields(reservation_id = %id, target = %target))]
    pub async fn change_status(
        &self,
        id: ReservationId,
        target: BookingStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.reservations.get_reservation(id, metadata.clone()).await?;
        let current = reservation.booking_status;
        reservation.change_status(target)?;

        match self
            .reservations
            .update_reservation_status(id, current, target, metadata.clone())
            .await?
        {
            Some(updated) => {
                info!("reservation status changed");
                Ok(updated)
            }
            None => {
                // decided by someone else since the read
                let latest = self.reservations.get_reservation(id, metadata).await?;
                warn!(status = %latest.booking_status, "reservation status changed concurrently");
                Err(BookingError::invalid_transition(latest.booking_status, target))
            }
        }
    }

    pub async fn set_payment_status(
        &self,
        id: ReservationId,
        status: PaymentStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<Reservation, BookingError> {
        Ok(self
            .reservations
            .update_payment_status(id, status, metadata)
            .await?)
    }

    /// Clients newest first, filtered by a name, phone or email fragment
    pub async fn clients(&self, search: Option<&str>) -> Result<Vec<Client>, BookingError> {
        let query = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => ClientQuery::search(term),
            None => ClientQuery::default(),
        };
        Ok(self.clients.list_clients(query, None).await?)
    }

    /// Sets a client's reliability rating (0 to 5)
    pub async fn rate_client(
        &self,
        id: ClientId,
        score: i32,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, BookingError> {
        let score = ReliabilityScore::new(score)?;
        Ok(self.clients.update_reliability(id, score, metadata).await?)
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, BookingError> {
        let total_vehicles = self
            .vehicles
            .count_vehicles(false, None)
            .await
            .map_err(FleetError::from)?;
        let available_vehicles = self
            .vehicles
            .count_vehicles(true, None)
            .await
            .map_err(FleetError::from)?;
        let stats = self.reservations.reservation_stats(None).await?;
        let total_clients = self.clients.count_clients(None).await?;
        let recent = self
            .reservations
            .list_reservations(ReservationQuery::recent(RECENT_RESERVATIONS), None)
            .await?;

        Ok(DashboardStats {
            total_vehicles,
            available_vehicles,
            total_reservations: stats.total,
            pending_reservations: stats.pending,
            total_clients,
            total_revenue: Money::new(stats.confirmed_revenue, self.currency),
            recent_reservations: self.rows(recent).await?,
        })
    }

    async fn rows(&self, reservations: Vec<Reservation>) -> Result<Vec<ReservationRow>, BookingError> {
        if reservations.is_empty() {
            return Ok(Vec::new());
        }

        let vehicles: HashMap<_, _> = self
            .vehicles
            .list_vehicles(VehicleQuery::all(), None)
            .await
            .map_err(FleetError::from)?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let clients: HashMap<_, _> = self
            .clients
            .list_clients(ClientQuery::default(), None)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(reservations
            .into_iter()
            .map(|reservation| ReservationRow {
                client: clients.get(&reservation.client_id).cloned(),
                vehicle: vehicles.get(&reservation.vehicle_id).cloned(),
                available_actions: reservation.booking_status.available_transitions(),
                reservation,
            })
            .collect())
    }
}
