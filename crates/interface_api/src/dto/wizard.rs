//! Reservation wizard DTOs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_booking::{
    default_pickup_time, default_return_time, CommitReceipt, Direction, DocumentSlot, FieldError,
    PersonalInfo, PriceQuote, RentalSchedule, Wizard, WizardState, WizardStep,
};

use crate::dto::catalog::VehicleResponse;

#[derive(Debug, Default, Deserialize)]
pub struct StartWizardRequest {
    /// Vehicle picked from the catalog; the wizard then opens on the dates step
    pub vehicle_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SelectVehicleRequest {
    pub vehicle_id: Uuid,
}

/// Dates step input; times default to 10:00 pickup and 18:00 return
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub pickup_location: String,
    /// Same as the pickup location when omitted
    pub return_location: Option<String>,
}

impl From<ScheduleRequest> for RentalSchedule {
    fn from(request: ScheduleRequest) -> Self {
        let return_location = request
            .return_location
            .unwrap_or_else(|| request.pickup_location.clone());
        RentalSchedule {
            start_date: request.start_date,
            start_time: request.start_time.unwrap_or_else(default_pickup_time),
            end_date: request.end_date,
            end_time: request.end_time.unwrap_or_else(default_return_time),
            pickup_location: request.pickup_location,
            return_location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TermsRequest {
    pub accepted: bool,
}

/// Step navigation
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigateRequest {
    /// Validate the current step and move to the next
    Next,
    /// Go back, to the previous step unless a target is given
    Back { target: Option<WizardStep> },
    /// Go to any step; forward jumps validate every step in between
    Jump { target: WizardStep },
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub slot: DocumentSlot,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Everything the wizard UI renders
#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: WizardState,
    pub current_step: Option<WizardStep>,
    /// 1-based position for the progress bar
    pub step_number: Option<u8>,
    pub direction: Direction,
    pub vehicle: Option<VehicleResponse>,
    pub schedule: Option<RentalSchedule>,
    pub personal_info: Option<PersonalInfo>,
    pub documents: Vec<DocumentSummary>,
    pub missing_documents: Vec<DocumentSlot>,
    pub terms_accepted: bool,
    /// Live price breakdown once a vehicle and both dates are set
    pub quote: Option<PriceQuote>,
    /// Unmet conditions of the current step, for inline field messages
    pub step_errors: Vec<FieldError>,
}

impl WizardResponse {
    pub fn new(wizard: &Wizard) -> Self {
        let draft = wizard.draft();
        let current_step = wizard.current_step();

        let documents = draft
            .map(|d| {
                DocumentSlot::ALL
                    .into_iter()
                    .filter_map(|slot| {
                        d.documents.get(slot).map(|file| DocumentSummary {
                            slot,
                            file_name: file.file_name().to_string(),
                            content_type: file.content_type().to_string(),
                            size: file.size(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let step_errors = current_step
            .map(|step| wizard.check(step).errors().to_vec())
            .unwrap_or_default();

        Self {
            session_id: *wizard.id().as_uuid(),
            state: wizard.state().clone(),
            current_step,
            step_number: current_step.map(|s| s.number()),
            direction: wizard.direction(),
            vehicle: draft
                .and_then(|d| d.vehicle.clone())
                .map(|v| VehicleResponse::new(v, wizard.currency())),
            schedule: draft.map(|d| d.schedule.clone()),
            personal_info: draft.map(|d| d.personal.clone()),
            documents,
            missing_documents: draft.map(|d| d.documents.missing()).unwrap_or_default(),
            terms_accepted: draft.map(|d| d.terms_accepted).unwrap_or(false),
            quote: wizard.quote(),
            step_errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub reservation_id: Uuid,
    pub client_id: Uuid,
    /// Messaging deep link with the prefilled summary
    pub handoff_url: String,
    pub notified: bool,
    /// The reservation was already saved by an earlier attempt
    pub replayed: bool,
    pub total_amount: String,
}

impl From<&CommitReceipt> for SubmitResponse {
    fn from(receipt: &CommitReceipt) -> Self {
        Self {
            reservation_id: *receipt.reservation.id.as_uuid(),
            client_id: *receipt.client_id.as_uuid(),
            handoff_url: receipt.handoff_url.clone(),
            notified: receipt.notified,
            replayed: receipt.replayed,
            total_amount: receipt.reservation.total_amount.compact(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_defaults() {
        let request: ScheduleRequest = serde_json::from_value(serde_json::json!({
            "start_date": "2025-03-01",
            "end_date": "2025-03-04",
            "pickup_location": "KLK Auto Car - Bureau"
        }))
        .unwrap();

        let schedule = RentalSchedule::from(request);
        assert_eq!(schedule.return_location, "KLK Auto Car - Bureau");
        assert_eq!(schedule.start_time, default_pickup_time());
        assert_eq!(schedule.end_time, default_return_time());
    }

    #[test]
    fn test_navigate_actions_parse() {
        let next: NavigateRequest = serde_json::from_str(r#"{"action":"next"}"#).unwrap();
        assert!(matches!(next, NavigateRequest::Next));

        let back: NavigateRequest = serde_json::from_str(r#"{"action":"back"}"#).unwrap();
        assert!(matches!(back, NavigateRequest::Back { target: None }));

        let jump: NavigateRequest =
            serde_json::from_str(r#"{"action":"jump","target":"personal_info"}"#).unwrap();
        assert!(matches!(jump, NavigateRequest::Jump { target: WizardStep::PersonalInfo }));
    }
}
