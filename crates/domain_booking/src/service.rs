//! Booking service
//!
//! Entry point for the customer-facing wizard: starts sessions, resolves
//! vehicle choices against the fleet, and drives a submission through the
//! commit sequence.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{Currency, OperationMetadata, VehicleId};
use domain_fleet::{FleetError, Vehicle, VehiclePort};

use crate::commit::{CommitReceipt, CommitSequencer};
use crate::error::BookingError;
use crate::validation::StepRules;
use crate::wizard::{DraftEdit, Wizard};

/// Orchestrates wizard sessions
#[derive(Clone)]
pub struct BookingService {
    vehicles: Arc<dyn VehiclePort>,
    sequencer: CommitSequencer,
    rules: StepRules,
}

impl BookingService {
    pub fn new(vehicles: Arc<dyn VehiclePort>, sequencer: CommitSequencer, rules: StepRules) -> Self {
        Self {
            vehicles,
            sequencer,
            rules,
        }
    }

    pub fn currency(&self) -> Currency {
        self.sequencer.settings().currency
    }

    pub fn rules(&self) -> &StepRules {
        &self.rules
    }

    /// Opens a wizard, at the dates step when a vehicle was picked from the catalog
    pub async fn start_wizard(&self, vehicle_id: Option<VehicleId>) -> Result<Wizard, BookingError> {
        let wizard = match vehicle_id {
            Some(id) => {
                let vehicle = self.bookable_vehicle(id).await?;
                Wizard::with_vehicle(self.rules.clone(), self.currency(), vehicle)
            }
            None => Wizard::new(self.rules.clone(), self.currency()),
        };
        info!(session = %wizard.id(), step = ?wizard.current_step(), "wizard started");
        Ok(wizard)
    }

    /// Puts an available vehicle in the draft
    pub async fn select_vehicle(&self, wizard: &mut Wizard, vehicle_id: VehicleId) -> Result<(), BookingError> {
        let vehicle = self.bookable_vehicle(vehicle_id).await?;
        wizard.edit(DraftEdit::SelectVehicle(vehicle))
    }

    /// Validates the draft and commits it
    ///
    /// On failure the wizard is left in `Failed` with its draft intact, so the
    /// customer can fix the problem and submit again.
    #[instrument(skip(self, wizard, metadata), fields(session = %wizard.id()))]
    pub async fn submit(
        &self,
        wizard: &mut Wizard,
        metadata: Option<OperationMetadata>,
    ) -> Result<CommitReceipt, BookingError> {
        let submission = wizard.begin_submit()?;

        match self.sequencer.commit(&submission, metadata).await {
            Ok(receipt) => {
                wizard.complete(&receipt)?;
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                wizard.fail(err.to_string())?;
                Err(err)
            }
        }
    }

    async fn bookable_vehicle(&self, id: VehicleId) -> Result<Vehicle, BookingError> {
        let vehicle = self
            .vehicles
            .get_vehicle(id, None)
            .await
            .map_err(FleetError::from)?;
        if !vehicle.available {
            return Err(FleetError::Unavailable(vehicle.model).into());
        }
        Ok(vehicle)
    }
}
