//! Reservation wizard handlers
//!
//! One session per customer draft. Every mutating call answers with the
//! full wizard view so the client never has to re-fetch.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain_booking::{DocumentSlot, DraftEdit, PersonalInfo, WizardStep};

use crate::dto::wizard::{
    NavigateRequest, ScheduleRequest, SelectVehicleRequest, StartWizardRequest, SubmitResponse,
    TermsRequest, WizardResponse,
};
use crate::dto::FilePayload;
use crate::handlers::{session_id, vehicle_id};
use crate::middleware::RequestMetadata;
use crate::{error::ApiError, AppState};

fn slot(name: &str) -> Result<DocumentSlot, ApiError> {
    DocumentSlot::parse(name).ok_or_else(|| ApiError::NotFound(format!("Unknown document slot '{}'", name)))
}

/// Opens a wizard session
pub async fn create_session(
    State(state): State<AppState>,
    request: Option<Json<StartWizardRequest>>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let wizard = state
        .booking
        .start_wizard(request.vehicle_id.map(vehicle_id))
        .await?;

    let response = WizardResponse::new(&wizard);
    state.sessions.insert(wizard).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let wizard = state.sessions.lock(session_id(id)).await?;
    Ok(Json(WizardResponse::new(&wizard)))
}

/// Discards a session and its draft
pub async fn abandon_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let id = session_id(id);
    // refuse while a submit holds the session
    drop(state.sessions.lock(id).await?);
    state.sessions.remove(id).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectVehicleRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let mut wizard = state.sessions.lock(session_id(id)).await?;
    state
        .booking
        .select_vehicle(&mut wizard, vehicle_id(request.vehicle_id))
        .await?;
    Ok(Json(WizardResponse::new(&wizard)))
}

pub async fn set_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let mut wizard = state.sessions.lock(session_id(id)).await?;
    wizard.edit(DraftEdit::SetSchedule(request.into()))?;
    Ok(Json(WizardResponse::new(&wizard)))
}

pub async fn set_personal_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(info): Json<PersonalInfo>,
) -> Result<Json<WizardResponse>, ApiError> {
    let mut wizard = state.sessions.lock(session_id(id)).await?;
    wizard.edit(DraftEdit::SetPersonalInfo(info))?;
    Ok(Json(WizardResponse::new(&wizard)))
}

/// Puts a scanned document in its slot after the type and size checks
pub async fn attach_document(
    State(state): State<AppState>,
    Path((id, slot_name)): Path<(Uuid, String)>,
    Json(payload): Json<FilePayload>,
) -> Result<Json<WizardResponse>, ApiError> {
    payload.validate()?;
    let slot = slot(&slot_name)?;
    let bytes = payload.decode()?;

    let mut wizard = state.sessions.lock(session_id(id)).await?;
    wizard.attach_document(slot, payload.file_name, &payload.content_type, bytes)?;
    Ok(Json(WizardResponse::new(&wizard)))
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path((id, slot_name)): Path<(Uuid, String)>,
) -> Result<Json<WizardResponse>, ApiError> {
    let slot = slot(&slot_name)?;
    let mut wizard = state.sessions.lock(session_id(id)).await?;
    wizard.edit(DraftEdit::RemoveDocument(slot))?;
    Ok(Json(WizardResponse::new(&wizard)))
}

pub async fn accept_terms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TermsRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let mut wizard = state.sessions.lock(session_id(id)).await?;
    wizard.edit(DraftEdit::AcceptTerms(request.accepted))?;
    Ok(Json(WizardResponse::new(&wizard)))
}

/// Moves between steps; a blocked forward move answers 422 with the failing fields
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let mut wizard = state.sessions.lock(session_id(id)).await?;

    match request {
        NavigateRequest::Next => {
            wizard.advance()?;
        }
        NavigateRequest::Back { target } => {
            let target = match target {
                Some(target) => target,
                None => previous_step(wizard.current_step())?,
            };
            wizard.retreat(target)?;
        }
        NavigateRequest::Jump { target } => {
            wizard.jump_to(target)?;
        }
    }
    Ok(Json(WizardResponse::new(&wizard)))
}

fn previous_step(current: Option<WizardStep>) -> Result<WizardStep, ApiError> {
    let current = current.ok_or_else(|| ApiError::Conflict("The wizard is not being edited".to_string()))?;
    WizardStep::ALL
        .into_iter()
        .rev()
        .find(|step| *step < current)
        .ok_or_else(|| ApiError::Conflict("Already on the first step".to_string()))
}

/// Saves the reservation and hands off to messaging
///
/// The session stays locked for the whole commit. A failure leaves the
/// draft intact; submitting again reuses whatever the failed attempt saved.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    RequestMetadata(metadata): RequestMetadata,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let id = session_id(id);
    let mut wizard = state.sessions.lock(id).await?;
    let receipt = state.booking.submit(&mut wizard, Some(metadata)).await?;
    drop(wizard);
    state.sessions.remove(id).await;

    info!(
        session = %id,
        reservation_id = %receipt.reservation.id,
        replayed = receipt.replayed,
        "reservation submitted"
    );
    Ok((StatusCode::CREATED, Json(SubmitResponse::from(&receipt))))
}
