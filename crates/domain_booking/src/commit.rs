//! Submission commit sequence
//!
//! Turns a [`ValidatedSubmission`] into stored records, strictly in this
//! order:
//!
//! 1. overlap check on the vehicle's dates (when enabled)
//! 2. client row
//! 3. the three document uploads, under the new client's id
//! 4. reservation row, with the document URLs
//! 5. messaging hand-off
//!
//! A failure at steps 1 to 4 aborts the sequence and returns the error; the
//! steps already done are not undone. Records written by an earlier attempt
//! of the same submission are found by submission id and reused, so retrying
//! a failed submit never duplicates a client or a reservation. A reused client
//! row takes the latest personal details; a saved reservation is only reused
//! while the draft still describes it. The hand-off is best effort and cannot
//! fail the commit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{ClientId, Currency, OperationMetadata};
use domain_customer::ClientPort;

use crate::documents::{DocumentUploadGateway, DocumentUrls};
use crate::error::BookingError;
use crate::notification::{compose_summary, handoff_url, HandoffConfig};
use crate::ports::{HandoffNotifier, ReservationPort};
use crate::reservation::Reservation;
use crate::wizard::ValidatedSubmission;

/// Knobs of the commit sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSettings {
    /// Refuse a reservation whose dates overlap a live booking of the same vehicle
    pub reject_overlapping_bookings: bool,
    pub currency: Currency,
    pub handoff: HandoffConfig,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            reject_overlapping_bookings: false,
            currency: Currency::EUR,
            handoff: HandoffConfig::default(),
        }
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub reservation: Reservation,
    pub client_id: ClientId,
    /// Deep link to the messaging app with the prefilled summary
    pub handoff_url: String,
    /// Whether the notifier accepted the hand-off
    pub notified: bool,
    /// True when the reservation already existed from an earlier attempt
    pub replayed: bool,
}

/// Runs the commit sequence against the stores
#[derive(Clone)]
pub struct CommitSequencer {
    clients: Arc<dyn ClientPort>,
    reservations: Arc<dyn ReservationPort>,
    documents: DocumentUploadGateway,
    notifier: Arc<dyn HandoffNotifier>,
    settings: CommitSettings,
}

impl CommitSequencer {
    pub fn new(
        clients: Arc<dyn ClientPort>,
        reservations: Arc<dyn ReservationPort>,
        documents: DocumentUploadGateway,
        notifier: Arc<dyn HandoffNotifier>,
        settings: CommitSettings,
    ) -> Self {
        Self {
            clients,
            reservations,
            documents,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &CommitSettings {
        &self.settings
    }

    /// Runs the sequence for one submission
    ///
    /// # Errors
    ///
    /// * `Conflict` when the overlap guard is on and the vehicle is taken
    /// * `Persistence` with entity `client` or `reservation` when a write fails
    /// * `Upload` naming the document slot that failed
    #[instrument(
        skip(self, submission, metadata),
        fields(submission_id = %submission.submission_id, vehicle_id = %submission.vehicle.id)
    )]
    pub async fn commit(
        &self,
        submission: &ValidatedSubmission,
        metadata: Option<OperationMetadata>,
    ) -> Result<CommitReceipt, BookingError> {
        if let Some(existing) = self
            .reservations
            .find_by_submission(submission.submission_id, metadata.clone())
            .await
            .map_err(|e| BookingError::persistence("reservation", e))?
        {
            return self.replay(submission, existing, metadata).await;
        }

        if self.settings.reject_overlapping_bookings {
            let taken = self
                .reservations
                .has_overlap(submission.vehicle.id, submission.period, metadata.clone())
                .await
                .map_err(|e| BookingError::persistence("reservation", e))?;
            if taken {
                return Err(BookingError::Conflict(format!(
                    "{} is already booked between {} and {}",
                    submission.vehicle.model, submission.period.start, submission.period.end
                )));
            }
        }

        let client = self
            .clients
            .insert_client(submission.new_client(), metadata.clone())
            .await
            .map_err(|e| BookingError::persistence("client", e))?;

        let urls: DocumentUrls = self
            .documents
            .upload_all(client.id, &submission.documents)
            .await?;

        let reservation = self
            .reservations
            .insert_reservation(submission.new_reservation(client.id, urls), metadata)
            .await
            .map_err(|e| BookingError::persistence("reservation", e))?;

        info!(
            reservation_id = %reservation.id,
            client_id = %client.id,
            total = %reservation.total_amount,
            "reservation committed"
        );
        Ok(self.hand_off(submission, reservation, false).await)
    }

    /// Finishes a submission whose reservation an earlier attempt already saved
    ///
    /// The summary is built from the submission, so it is only sent when the
    /// stored booking still matches it; the client row is refreshed first.
    async fn replay(
        &self,
        submission: &ValidatedSubmission,
        existing: Reservation,
        metadata: Option<OperationMetadata>,
    ) -> Result<CommitReceipt, BookingError> {
        let expected = submission.new_reservation(existing.client_id, existing.document_urls.clone());
        if !existing.same_booking(&expected) {
            warn!(reservation_id = %existing.id, "draft changed after its reservation was saved");
            return Err(BookingError::Conflict(format!(
                "This reservation was already recorded on {} with other details; \
                 contact the agency to change it",
                existing.created_at.format("%d/%m/%Y")
            )));
        }

        self.clients
            .insert_client(submission.new_client(), metadata)
            .await
            .map_err(|e| BookingError::persistence("client", e))?;

        info!(reservation_id = %existing.id, "submission already committed");
        Ok(self.hand_off(submission, existing, true).await)
    }

    async fn hand_off(
        &self,
        submission: &ValidatedSubmission,
        reservation: Reservation,
        replayed: bool,
    ) -> CommitReceipt {
        let text = compose_summary(submission, &reservation.document_urls, &self.settings.handoff);
        let url = handoff_url(&self.settings.handoff.phone, &text);

        let notified = match self.notifier.hand_off(&url).await {
            Ok(()) => true,
            Err(e) => {
                warn!(reservation_id = %reservation.id, error = %e, "hand-off failed");
                false
            }
        };

        CommitReceipt {
            client_id: reservation.client_id,
            reservation,
            handoff_url: url,
            notified,
            replayed,
        }
    }
}
