//! Reservation wizard
//!
//! Four steps, each gated on its own rules:
//!
//! ```text
//! Vehicle ──► Dates ──► PersonalInfo ──► Confirmation ──► Submitting ──► Submitted
//!    ▲          ▲            ▲                │ ▲              │
//!    └──────────┴────────────┴── retreat ─────┘ └── Failed ◄───┘
//! ```
//!
//! Moving forward requires the current step to validate; moving back is
//! always allowed. Submission validates every step again and hands out a
//! [`ValidatedSubmission`], the only input the commit sequence accepts. The
//! draft survives a failed submission and is dropped once one succeeds.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClientId, Currency, DateRange, ReservationId, SubmissionId, WizardSessionId};
use domain_customer::NewClient;
use domain_fleet::Vehicle;

use crate::commit::CommitReceipt;
use crate::documents::{CompleteDocuments, DocumentFile, DocumentSlot, DocumentUrls};
use crate::draft::{PersonalInfo, RentalSchedule, ReservationDraft};
use crate::error::BookingError;
use crate::pricing::PriceQuote;
use crate::reservation::NewReservation;
use crate::validation::{StepRules, ValidationReport};

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Vehicle,
    Dates,
    PersonalInfo,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Vehicle,
        WizardStep::Dates,
        WizardStep::PersonalInfo,
        WizardStep::Confirmation,
    ];

    /// 1-based position shown in the progress bar
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Vehicle => 1,
            WizardStep::Dates => 2,
            WizardStep::PersonalInfo => 3,
            WizardStep::Confirmation => 4,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Vehicle => Some(WizardStep::Dates),
            WizardStep::Dates => Some(WizardStep::PersonalInfo),
            WizardStep::PersonalInfo => Some(WizardStep::Confirmation),
            WizardStep::Confirmation => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Vehicle => "vehicle",
            WizardStep::Dates => "dates",
            WizardStep::PersonalInfo => "personal_info",
            WizardStep::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the last move, for slide animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    None,
}

/// Where a submitted reservation ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedReservation {
    pub reservation_id: ReservationId,
    pub client_id: ClientId,
    pub handoff_url: String,
}

/// Wizard lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    Editing { step: WizardStep },
    Submitting,
    Submitted(SubmittedReservation),
    /// Last submission failed; the draft is intact and can be resubmitted
    Failed { reason: String },
}

impl WizardState {
    pub fn label(&self) -> &'static str {
        match self {
            WizardState::Editing { step } => step.as_str(),
            WizardState::Submitting => "submitting",
            WizardState::Submitted(_) => "submitted",
            WizardState::Failed { .. } => "failed",
        }
    }
}

/// A change to the draft
#[derive(Debug, Clone)]
pub enum DraftEdit {
    SelectVehicle(Vehicle),
    SetSchedule(RentalSchedule),
    SetPersonalInfo(PersonalInfo),
    AttachDocument(DocumentSlot, DocumentFile),
    RemoveDocument(DocumentSlot),
    AcceptTerms(bool),
}

/// A draft that passed every rule, ready to be committed
///
/// Only [`Wizard::begin_submit`] produces one.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub submission_id: SubmissionId,
    pub vehicle: Vehicle,
    pub period: DateRange,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
    pub personal: PersonalInfo,
    pub license_expiry: NaiveDate,
    pub documents: CompleteDocuments,
    pub notes: Option<String>,
    pub quote: PriceQuote,
    _sealed: (),
}

impl ValidatedSubmission {
    pub fn new_client(&self) -> NewClient {
        NewClient {
            first_name: self.personal.first_name.trim().to_string(),
            last_name: self.personal.last_name.trim().to_string(),
            phone: self.personal.phone.clone(),
            email: self.personal.email.trim().to_string(),
            address: self.personal.address.trim().to_string(),
            national_id: self.personal.national_id.to_uppercase(),
            license_number: self.personal.license_number.to_uppercase(),
            license_expiry: self.license_expiry,
            submission_id: Some(self.submission_id),
        }
    }

    pub fn new_reservation(&self, client_id: ClientId, document_urls: DocumentUrls) -> NewReservation {
        NewReservation {
            client_id,
            vehicle_id: self.vehicle.id,
            start_date: self.period.start,
            start_time: self.start_time,
            end_date: self.period.end,
            end_time: self.end_time,
            pickup_location: self.pickup_location.clone(),
            return_location: self.return_location.clone(),
            total_amount: self.quote.rental_total,
            deposit_amount: self.quote.deposit,
            document_urls,
            comments: self.notes.clone(),
            submission_id: Some(self.submission_id),
        }
    }
}

/// One customer's reservation wizard
#[derive(Debug, Clone)]
pub struct Wizard {
    id: WizardSessionId,
    state: WizardState,
    direction: Direction,
    draft: Option<ReservationDraft>,
    rules: StepRules,
    currency: Currency,
}

impl Wizard {
    /// Starts at the vehicle step
    pub fn new(rules: StepRules, currency: Currency) -> Self {
        Self {
            id: WizardSessionId::new(),
            state: WizardState::Editing {
                step: WizardStep::Vehicle,
            },
            direction: Direction::None,
            draft: Some(ReservationDraft::new()),
            rules,
            currency,
        }
    }

    /// Starts at the dates step with the vehicle already chosen
    pub fn with_vehicle(rules: StepRules, currency: Currency, vehicle: Vehicle) -> Self {
        Self {
            state: WizardState::Editing {
                step: WizardStep::Dates,
            },
            draft: Some(ReservationDraft::with_vehicle(vehicle)),
            ..Self::new(rules, currency)
        }
    }

    pub fn id(&self) -> WizardSessionId {
        self.id
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The draft, until a submission succeeds
    pub fn draft(&self) -> Option<&ReservationDraft> {
        self.draft.as_ref()
    }

    /// Step the customer is looking at; a failed submission returns to confirmation
    pub fn current_step(&self) -> Option<WizardStep> {
        match self.state {
            WizardState::Editing { step } => Some(step),
            WizardState::Failed { .. } => Some(WizardStep::Confirmation),
            WizardState::Submitting | WizardState::Submitted(_) => None,
        }
    }

    /// Live price breakdown once a vehicle and both dates are set
    pub fn quote(&self) -> Option<PriceQuote> {
        let draft = self.draft.as_ref()?;
        let vehicle = draft.vehicle.as_ref()?;
        let start = draft.schedule.start_date?;
        let end = draft.schedule.end_date?;
        Some(PriceQuote::compute(vehicle, start, end, self.currency))
    }

    /// Rules of one step against the current draft, without moving
    pub fn check(&self, step: WizardStep) -> ValidationReport {
        match &self.draft {
            Some(draft) => self.rules.check_step(step, draft),
            None => ValidationReport::new(),
        }
    }

    pub fn edit(&mut self, edit: DraftEdit) -> Result<(), BookingError> {
        let draft = self.editable_draft()?;
        match edit {
            DraftEdit::SelectVehicle(vehicle) => draft.vehicle = Some(vehicle),
            DraftEdit::SetSchedule(schedule) => draft.schedule = schedule,
            DraftEdit::SetPersonalInfo(info) => draft.personal = info.normalized(),
            DraftEdit::AttachDocument(slot, file) => draft.documents.set(slot, file),
            DraftEdit::RemoveDocument(slot) => draft.documents.clear(slot),
            DraftEdit::AcceptTerms(accepted) => draft.terms_accepted = accepted,
        }
        if let WizardState::Failed { .. } = self.state {
            self.state = WizardState::Editing {
                step: WizardStep::Confirmation,
            };
        }
        Ok(())
    }

    /// Checks a file and puts it in its slot; a rejected file leaves the slot as it was
    pub fn attach_document(
        &mut self,
        slot: DocumentSlot,
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BookingError> {
        self.editable_draft()?;
        let file = DocumentFile::accept(slot, file_name, content_type, bytes)?;
        self.edit(DraftEdit::AttachDocument(slot, file))
    }

    /// Moves to the next step if the current one validates
    pub fn advance(&mut self) -> Result<WizardStep, BookingError> {
        let current = self.editing_step("advance")?;
        let next = current
            .next()
            .ok_or_else(|| BookingError::invalid_transition(current, "beyond confirmation"))?;

        self.check(current).into_result()?;
        self.move_to(next, Direction::Forward);
        Ok(next)
    }

    /// Goes back to an earlier step; nothing is re-validated
    pub fn retreat(&mut self, target: WizardStep) -> Result<WizardStep, BookingError> {
        let current = self.editing_step("retreat")?;
        if target >= current {
            return Err(BookingError::invalid_transition(current, target));
        }
        self.move_to(target, Direction::Backward);
        Ok(target)
    }

    /// Goes to any step: backwards freely, forwards only if every step in between validates
    pub fn jump_to(&mut self, target: WizardStep) -> Result<WizardStep, BookingError> {
        let current = self.editing_step("jump")?;
        if target < current {
            return self.retreat(target);
        }
        if target == current {
            return Ok(current);
        }

        let report = match &self.draft {
            Some(draft) => self.rules.check_range(current, target, draft),
            None => ValidationReport::new(),
        };
        report.into_result()?;
        self.move_to(target, Direction::Forward);
        Ok(target)
    }

    /// Validates everything and locks the draft for the commit
    pub fn begin_submit(&mut self) -> Result<ValidatedSubmission, BookingError> {
        match self.state {
            WizardState::Editing {
                step: WizardStep::Confirmation,
            }
            | WizardState::Failed { .. } => {}
            ref other => return Err(BookingError::invalid_transition(other.label(), "submitting")),
        }
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| BookingError::DraftLocked("no draft".to_string()))?;

        let report = self.rules.check_all(draft);
        report.into_result()?;
        let submission = self.seal(draft)?;

        self.state = WizardState::Submitting;
        Ok(submission)
    }

    /// Records a successful commit and discards the draft
    pub fn complete(&mut self, receipt: &CommitReceipt) -> Result<(), BookingError> {
        if self.state != WizardState::Submitting {
            return Err(BookingError::invalid_transition(self.state.label(), "submitted"));
        }
        self.state = WizardState::Submitted(SubmittedReservation {
            reservation_id: receipt.reservation.id,
            client_id: receipt.client_id,
            handoff_url: receipt.handoff_url.clone(),
        });
        self.direction = Direction::Forward;
        self.draft = None;
        Ok(())
    }

    /// Records a failed commit; the draft is kept for a retry
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), BookingError> {
        if self.state != WizardState::Submitting {
            return Err(BookingError::invalid_transition(self.state.label(), "failed"));
        }
        self.state = WizardState::Failed {
            reason: reason.into(),
        };
        Ok(())
    }

    fn editable_draft(&mut self) -> Result<&mut ReservationDraft, BookingError> {
        match self.state {
            WizardState::Submitting => {
                return Err(BookingError::DraftLocked("submission in progress".to_string()))
            }
            WizardState::Submitted(_) => {
                return Err(BookingError::DraftLocked("reservation already submitted".to_string()))
            }
            _ => {}
        }
        self.draft
            .as_mut()
            .ok_or_else(|| BookingError::DraftLocked("no draft".to_string()))
    }

    fn editing_step(&self, action: &str) -> Result<WizardStep, BookingError> {
        match self.current_step() {
            Some(step) => Ok(step),
            None => Err(BookingError::invalid_transition(self.state.label(), action)),
        }
    }

    fn move_to(&mut self, step: WizardStep, direction: Direction) {
        self.state = WizardState::Editing { step };
        self.direction = direction;
    }

    fn seal(&self, draft: &ReservationDraft) -> Result<ValidatedSubmission, BookingError> {
        let incomplete = |field: &str| {
            let mut report = ValidationReport::new();
            report.add(field, "Required before submission");
            BookingError::Validation(report)
        };

        let vehicle = draft.vehicle.clone().ok_or_else(|| incomplete("vehicle"))?;
        let start = draft.schedule.start_date.ok_or_else(|| incomplete("start_date"))?;
        let end = draft.schedule.end_date.ok_or_else(|| incomplete("end_date"))?;
        let period = DateRange::new(start, end).map_err(|_| incomplete("end_date"))?;
        let license_expiry = draft
            .personal
            .license_expiry
            .ok_or_else(|| incomplete("license_expiry"))?;
        let documents = draft.documents.complete().ok_or_else(|| incomplete("documents"))?;
        let quote = PriceQuote::compute(&vehicle, start, end, self.currency);

        Ok(ValidatedSubmission {
            submission_id: draft.submission_id,
            period,
            start_time: draft.schedule.start_time,
            end_time: draft.schedule.end_time,
            pickup_location: draft.schedule.pickup_location.trim().to_string(),
            return_location: draft.schedule.return_location.trim().to_string(),
            personal: draft.personal.clone(),
            license_expiry,
            documents,
            notes: draft.personal.trimmed_notes(),
            quote,
            vehicle,
            _sealed: (),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::{FixedClock, Timezone, VehicleId};
    use domain_fleet::NewVehicle;
    use std::sync::Arc;

    fn rules() -> StepRules {
        let now = Utc.with_ymd_and_hms(2025, 2, 20, 9, 0, 0).unwrap();
        StepRules::new(Arc::new(FixedClock::at(now)), Timezone::casablanca())
    }

    fn vehicle() -> Vehicle {
        Vehicle::from_new(VehicleId::new(), NewVehicle::new("Dacia Sandero", "Gris"))
    }

    #[test]
    fn test_initial_step_depends_on_preselection() {
        let plain = Wizard::new(rules(), Currency::EUR);
        assert_eq!(plain.current_step(), Some(WizardStep::Vehicle));

        let preselected = Wizard::with_vehicle(rules(), Currency::EUR, vehicle());
        assert_eq!(preselected.current_step(), Some(WizardStep::Dates));
    }

    #[test]
    fn test_advance_without_vehicle_stays_put() {
        let mut wizard = Wizard::new(rules(), Currency::EUR);
        let err = wizard.advance().unwrap_err();

        assert!(err.report().unwrap().has_field("vehicle"));
        assert_eq!(wizard.current_step(), Some(WizardStep::Vehicle));
        assert_eq!(wizard.direction(), Direction::None);
    }

    #[test]
    fn test_retreat_only_goes_back() {
        let mut wizard = Wizard::with_vehicle(rules(), Currency::EUR, vehicle());
        assert!(wizard.retreat(WizardStep::PersonalInfo).is_err());
        assert_eq!(wizard.retreat(WizardStep::Vehicle).unwrap(), WizardStep::Vehicle);
        assert_eq!(wizard.direction(), Direction::Backward);
    }

    #[test]
    fn test_submit_outside_confirmation_rejected() {
        let mut wizard = Wizard::with_vehicle(rules(), Currency::EUR, vehicle());
        assert!(matches!(
            wizard.begin_submit(),
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_quote_needs_vehicle_and_dates() {
        let mut wizard = Wizard::with_vehicle(rules(), Currency::EUR, vehicle());
        assert!(wizard.quote().is_none());

        wizard
            .edit(DraftEdit::SetSchedule(RentalSchedule {
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 4),
                ..RentalSchedule::default()
            }))
            .unwrap();
        let quote = wizard.quote().unwrap();
        assert_eq!(quote.day_count, 3);
        assert_eq!(quote.rental_total.compact(), "60€");
        assert_eq!(quote.total_with_deposit.compact(), "260€");
    }
}
