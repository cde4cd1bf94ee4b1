//! Catalog and fleet administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_booking::{PickupLocation, PICKUP_LOCATIONS};
use domain_fleet::PhotoFile;

use crate::dto::catalog::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::dto::FilePayload;
use crate::handlers::vehicle_id;
use crate::middleware::RequestMetadata;
use crate::{error::ApiError, AppState};

fn photo_file(payload: FilePayload) -> Result<PhotoFile, ApiError> {
    Ok(PhotoFile {
        bytes: payload.decode()?,
        file_name: payload.file_name,
        content_type: payload.content_type,
    })
}

fn respond(state: &AppState, vehicle: domain_fleet::Vehicle) -> VehicleResponse {
    VehicleResponse::new(vehicle, state.booking.currency())
}

/// Lists the vehicles customers can book
pub async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let vehicles = state.fleet.catalog().await?;
    Ok(Json(vehicles.into_iter().map(|v| respond(&state, v)).collect()))
}

/// Gets one vehicle
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle = state.fleet.vehicle(vehicle_id(id)).await?;
    Ok(Json(respond(&state, vehicle)))
}

/// Suggested pickup and return points
pub async fn list_locations() -> Json<Vec<PickupLocation>> {
    Json(PICKUP_LOCATIONS.to_vec())
}

/// Lists the whole fleet, unavailable vehicles included
pub async fn list_all_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let vehicles = state.fleet.all_vehicles().await?;
    Ok(Json(vehicles.into_iter().map(|v| respond(&state, v)).collect()))
}

/// Adds a vehicle, with its photo when one is sent
pub async fn create_vehicle(
    State(state): State<AppState>,
    RequestMetadata(metadata): RequestMetadata,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), ApiError> {
    request.validate()?;
    let (new, photo) = request.into_parts()?;
    let photo = photo.map(photo_file).transpose()?;

    let vehicle = state.fleet.create_vehicle(new, photo, Some(metadata)).await?;
    Ok((StatusCode::CREATED, Json(respond(&state, vehicle))))
}

/// Updates a vehicle; a photo in the request replaces the current one
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, ApiError> {
    request.validate()?;
    let (update, photo) = request.into_parts()?;
    let photo = photo.map(photo_file).transpose()?;

    let vehicle = state
        .fleet
        .update_vehicle(vehicle_id(id), update, photo, Some(metadata))
        .await?;
    Ok(Json(respond(&state, vehicle)))
}

/// Removes a vehicle from the fleet
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
) -> Result<StatusCode, ApiError> {
    state.fleet.delete_vehicle(vehicle_id(id), Some(metadata)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flips a vehicle between available and unavailable
pub async fn toggle_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle = state
        .fleet
        .toggle_availability(vehicle_id(id), Some(metadata))
        .await?;
    Ok(Json(respond(&state, vehicle)))
}

/// Replaces a vehicle's photo
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
    Json(payload): Json<FilePayload>,
) -> Result<Json<VehicleResponse>, ApiError> {
    payload.validate()?;
    let vehicle = state
        .fleet
        .attach_photo(vehicle_id(id), photo_file(payload)?, Some(metadata))
        .await?;
    Ok(Json(respond(&state, vehicle)))
}
