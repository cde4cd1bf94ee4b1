//! Booking Domain
//!
//! The customer reservation wizard and everything behind it:
//!
//! - **Wizard**: four gated steps (vehicle, dates, personal info, confirmation)
//! - **Validation**: per-step rules reporting every failing field
//! - **Pricing**: whole-day rental totals and the refundable deposit
//! - **Documents**: ID card and driving licence scans, checked then uploaded
//! - **Commit**: client, documents, reservation, hand-off, in that order
//! - **Console**: admin review of reservations, payments and clients

pub mod documents;
pub mod draft;
pub mod validation;
pub mod pricing;
pub mod reservation;
pub mod wizard;
pub mod notification;
pub mod commit;
pub mod service;
pub mod console;
pub mod error;
pub mod ports;

pub use commit::{CommitReceipt, CommitSequencer, CommitSettings};
pub use console::{AdminConsole, DashboardStats, ReservationRow};
pub use documents::{
    CompleteDocuments, DocumentFile, DocumentSet, DocumentSlot, DocumentUploadGateway, DocumentUrls,
    DOCUMENTS_BUCKET, MAX_DOCUMENT_BYTES,
};
pub use draft::{
    default_pickup_time, default_return_time, PersonalInfo, PickupLocation, RentalSchedule,
    ReservationDraft, PICKUP_LOCATIONS,
};
pub use error::BookingError;
pub use notification::{compose_summary, handoff_url, HandoffConfig, LoggingNotifier};
pub use ports::{HandoffNotifier, ReservationPort, ReservationQuery, ReservationStats};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockReservationPort, RecordingNotifier};
pub use pricing::{day_count, PriceQuote};
pub use reservation::{BookingStatus, NewReservation, PaymentStatus, Reservation};
pub use service::BookingService;
pub use validation::{FieldError, StepRules, ValidationReport};
pub use wizard::{
    Direction, DraftEdit, SubmittedReservation, ValidatedSubmission, Wizard, WizardState, WizardStep,
};
