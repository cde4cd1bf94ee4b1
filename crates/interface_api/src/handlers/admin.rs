//! Admin console handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use domain_booking::{DashboardStats, Reservation, ReservationRow};
use domain_customer::Client;

use crate::dto::admin::{
    ClientFilter, PaymentStatusRequest, RateClientRequest, ReservationFilter, StatusChangeRequest,
};
use crate::handlers::{client_id, reservation_id};
use crate::middleware::RequestMetadata;
use crate::{error::ApiError, AppState};

/// Reservations newest first, with client, vehicle and allowed actions
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> Result<Json<Vec<ReservationRow>>, ApiError> {
    let rows = state.console.reservations(filter.status()?).await?;
    Ok(Json(rows))
}

/// Confirms or cancels a pending reservation
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state
        .console
        .change_status(reservation_id(id), request.status, Some(metadata))
        .await?;
    Ok(Json(reservation))
}

pub async fn set_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state
        .console
        .set_payment_status(reservation_id(id), request.payment_status, Some(metadata))
        .await?;
    Ok(Json(reservation))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<Vec<Client>>, ApiError> {
    let clients = state.console.clients(filter.search.as_deref()).await?;
    Ok(Json(clients))
}

/// Sets a client's reliability rating
pub async fn rate_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
    Json(request): Json<RateClientRequest>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .console
        .rate_client(client_id(id), request.score, Some(metadata))
        .await?;
    Ok(Json(client))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.console.dashboard().await?))
}
