//! Booking wizard and commit sequence tests against the in-memory adapters

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use core_kernel::storage::mock::MemoryObjectStore;
use core_kernel::{Currency, FixedClock, Timezone, VehicleId};
use domain_booking::{
    AdminConsole, BookingError, BookingService, BookingStatus, CommitSequencer, CommitSettings,
    DocumentSlot, DocumentUploadGateway, DocumentUrls, DraftEdit, MockReservationPort,
    PaymentStatus, PersonalInfo, RecordingNotifier, RentalSchedule, ReservationPort, StepRules,
    Wizard, WizardState, WizardStep,
};
use domain_customer::{ClientPort, MockClientPort};
use domain_fleet::{MockVehiclePort, NewVehicle, Vehicle};
use rust_decimal_macros::dec;

struct Harness {
    service: BookingService,
    console: AdminConsole,
    vehicle: Vehicle,
    clients: Arc<MockClientPort>,
    reservations: Arc<MockReservationPort>,
    store: Arc<MemoryObjectStore>,
    notifier: Arc<RecordingNotifier>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rules() -> StepRules {
    let now = Utc.with_ymd_and_hms(2025, 2, 20, 9, 0, 0).unwrap();
    StepRules::new(Arc::new(FixedClock::at(now)), Timezone::casablanca())
}

fn dacia() -> Vehicle {
    Vehicle::from_new(
        VehicleId::new(),
        NewVehicle::new("Dacia Logan", "Blanc").with_rates(dec!(20), dec!(200)),
    )
}

async fn harness_with(settings: CommitSettings, notifier: RecordingNotifier) -> Harness {
    let vehicle = dacia();
    let vehicles = Arc::new(MockVehiclePort::with_vehicles(vec![vehicle.clone()]).await);
    let clients = Arc::new(MockClientPort::new());
    let reservations = Arc::new(MockReservationPort::new());
    let store = Arc::new(MemoryObjectStore::new());
    let notifier = Arc::new(notifier);

    let sequencer = CommitSequencer::new(
        clients.clone(),
        reservations.clone(),
        DocumentUploadGateway::new(store.clone()),
        notifier.clone(),
        settings,
    );
    let service = BookingService::new(vehicles.clone(), sequencer, rules());
    let console = AdminConsole::new(vehicles, clients.clone(), reservations.clone(), Currency::EUR);

    Harness {
        service,
        console,
        vehicle,
        clients,
        reservations,
        store,
        notifier,
    }
}

async fn harness() -> Harness {
    harness_with(CommitSettings::default(), RecordingNotifier::new()).await
}

fn schedule(start: NaiveDate, end: NaiveDate) -> RentalSchedule {
    RentalSchedule {
        start_date: Some(start),
        end_date: Some(end),
        pickup_location: "Marrakesh Menara Airport".to_string(),
        return_location: "Marrakesh Menara Airport".to_string(),
        ..RentalSchedule::default()
    }
}

fn personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: "Yassine".to_string(),
        last_name: "Benali".to_string(),
        email: "yassine@example.ma".to_string(),
        phone: "0612345678".to_string(),
        address: "12 Rue de Fès, Marrakech".to_string(),
        national_id: "ab123456".to_string(),
        license_number: "MA12345678".to_string(),
        license_expiry: Some(date(2027, 1, 1)),
        notes: Some("Vol AT800".to_string()),
    }
}

fn attach_all(wizard: &mut Wizard) {
    for slot in DocumentSlot::ALL {
        wizard
            .attach_document(slot, format!("{}.jpg", slot.storage_name()), "image/jpeg", vec![0xFF, 0xD8, 0xFF])
            .unwrap();
    }
}

/// A wizard on the confirmation step with every field filled
async fn ready_wizard(h: &Harness, start: NaiveDate, end: NaiveDate) -> Wizard {
    let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
    wizard.edit(DraftEdit::SetSchedule(schedule(start, end))).unwrap();
    wizard.advance().unwrap();
    wizard.edit(DraftEdit::SetPersonalInfo(personal_info())).unwrap();
    attach_all(&mut wizard);
    wizard.advance().unwrap();
    wizard.edit(DraftEdit::AcceptTerms(true)).unwrap();
    wizard
}

mod step_gating {
    use super::*;

    #[tokio::test]
    async fn test_past_pickup_blocks_dates_step() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        wizard
            .edit(DraftEdit::SetSchedule(schedule(date(2025, 2, 19), date(2025, 2, 22))))
            .unwrap();

        let err = wizard.advance().unwrap_err();
        assert!(err.report().unwrap().has_field("start_date"));
        assert_eq!(wizard.current_step(), Some(WizardStep::Dates));
    }

    #[tokio::test]
    async fn test_pickup_earlier_today_is_in_the_past() {
        // 09:00 UTC is 10:00 in Casablanca on that date
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        let mut today = schedule(date(2025, 2, 20), date(2025, 2, 22));
        today.start_time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        wizard.edit(DraftEdit::SetSchedule(today.clone())).unwrap();
        assert!(wizard.advance().is_err());

        today.start_time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        wizard.edit(DraftEdit::SetSchedule(today)).unwrap();
        assert_eq!(wizard.advance().unwrap(), WizardStep::PersonalInfo);
    }

    #[tokio::test]
    async fn test_return_must_follow_pickup() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        for end in [date(2025, 3, 1), date(2025, 2, 27)] {
            wizard
                .edit(DraftEdit::SetSchedule(schedule(date(2025, 3, 1), end)))
                .unwrap();
            let err = wizard.advance().unwrap_err();
            assert!(err.report().unwrap().has_field("end_date"));
        }
    }

    #[tokio::test]
    async fn test_every_failing_field_is_reported() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        wizard
            .edit(DraftEdit::SetSchedule(schedule(date(2025, 3, 1), date(2025, 3, 4))))
            .unwrap();
        wizard.advance().unwrap();

        let mut info = personal_info();
        info.email = "not-an-email".to_string();
        info.license_expiry = Some(date(2025, 2, 20));
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();

        let err = wizard.advance().unwrap_err();
        let report = err.report().unwrap();
        assert!(report.has_field("email"));
        assert!(report.has_field("license_expiry"));
        assert!(report.has_field("documents.id_front"));
        assert!(report.has_field("documents.id_back"));
        assert!(report.has_field("documents.license_photo"));
        assert!(!report.has_field("phone"));
    }

    #[tokio::test]
    async fn test_padded_names_are_measured_trimmed() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        wizard
            .edit(DraftEdit::SetSchedule(schedule(date(2025, 3, 1), date(2025, 3, 4))))
            .unwrap();
        wizard.advance().unwrap();
        attach_all(&mut wizard);

        let mut info = personal_info();
        info.first_name = "   ".to_string();
        info.address = "  Fès  ".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();
        let err = wizard.advance().unwrap_err();
        let report = err.report().unwrap();
        assert!(report.has_field("first_name"));
        assert!(report.has_field("address"));
        assert!(!report.has_field("last_name"));
        assert_eq!(wizard.current_step(), Some(WizardStep::PersonalInfo));

        let mut info = personal_info();
        info.first_name = "  Yassine ".to_string();
        info.phone = " 0612345678 ".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();
        assert_eq!(wizard.advance().unwrap(), WizardStep::Confirmation);

        let stored = &wizard.draft().unwrap().personal;
        assert_eq!(stored.first_name, "Yassine");
        assert_eq!(stored.phone, "0612345678");
    }

    #[tokio::test]
    async fn test_jump_forward_needs_intermediate_steps() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(None).await.unwrap();
        assert!(wizard.jump_to(WizardStep::Confirmation).is_err());
        assert_eq!(wizard.current_step(), Some(WizardStep::Vehicle));

        h.service.select_vehicle(&mut wizard, h.vehicle.id).await.unwrap();
        assert_eq!(wizard.jump_to(WizardStep::Dates).unwrap(), WizardStep::Dates);
        assert_eq!(wizard.jump_to(WizardStep::Vehicle).unwrap(), WizardStep::Vehicle);
    }

    #[tokio::test]
    async fn test_rejected_file_leaves_slot_empty() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();

        let err = wizard
            .attach_document(DocumentSlot::IdFront, "scan.gif", "image/gif", vec![1])
            .unwrap_err();
        assert!(matches!(err, BookingError::FileRejected { slot: DocumentSlot::IdFront, .. }));

        let oversized = vec![0u8; domain_booking::MAX_DOCUMENT_BYTES + 1];
        assert!(wizard
            .attach_document(DocumentSlot::IdFront, "scan.pdf", "application/pdf", oversized)
            .is_err());
        assert!(wizard.draft().unwrap().documents.get(DocumentSlot::IdFront).is_none());
    }

    #[tokio::test]
    async fn test_unknown_vehicle_cannot_start_wizard() {
        let h = harness().await;
        assert!(h.service.start_wizard(Some(VehicleId::new())).await.is_err());
    }
}

mod date_rules {
    use super::*;
    use proptest::prelude::*;

    fn dates_wizard() -> Wizard {
        Wizard::with_vehicle(rules(), Currency::EUR, dacia())
    }

    proptest! {
        // the fixed clock reads 10:00 in Casablanca on 2025-02-20
        #[test]
        fn dates_step_accepts_only_future_forward_pairs(
            start_offset in -5i64..10,
            length in -3i64..10,
            hour in 8u32..20,
            minute in prop::sample::select(vec![0u32, 30]),
        ) {
            let today = date(2025, 2, 20);
            let start = today + Duration::days(start_offset);
            let end = start + Duration::days(length);
            let start_time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();

            let mut wizard = dates_wizard();
            let mut pair = schedule(start, end);
            pair.start_time = start_time;
            wizard.edit(DraftEdit::SetSchedule(pair)).unwrap();

            let local_now = today.and_hms_opt(10, 0, 0).unwrap();
            let accepted = start < end && start.and_time(start_time) > local_now;

            match wizard.advance() {
                Ok(step) => {
                    prop_assert!(accepted);
                    prop_assert_eq!(step, WizardStep::PersonalInfo);
                }
                Err(err) => {
                    prop_assert!(!accepted);
                    let report = err.report().unwrap();
                    prop_assert_eq!(report.has_field("end_date"), start >= end);
                    prop_assert_eq!(wizard.current_step(), Some(WizardStep::Dates));
                }
            }
        }
    }
}

mod phone_rules {
    use super::*;
    use domain_booking::validation::is_valid_phone;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_moroccan_formats_at_personal_step() {
        let h = harness().await;
        let mut wizard = h.service.start_wizard(Some(h.vehicle.id)).await.unwrap();
        wizard
            .edit(DraftEdit::SetSchedule(schedule(date(2025, 3, 1), date(2025, 3, 4))))
            .unwrap();
        wizard.advance().unwrap();
        attach_all(&mut wizard);

        let mut info = personal_info();
        info.phone = "0512345678".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info.clone())).unwrap();
        let err = wizard.advance().unwrap_err();
        assert_eq!(err.report().unwrap().fields(), vec!["phone"]);

        info.phone = "+212612345678".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();
        assert_eq!(wizard.advance().unwrap(), WizardStep::Confirmation);
    }

    proptest! {
        #[test]
        fn generated_mobile_numbers_pass(phone in r"(\+212|0)[67][0-9]{8}") {
            prop_assert!(is_valid_phone(&phone));
        }

        #[test]
        fn wrong_operator_digit_fails(
            prefix in prop::sample::select(vec!["+212", "0"]),
            operator in prop::sample::select(vec!['0', '1', '2', '3', '4', '5', '8', '9']),
            rest in r"[0-9]{8}",
        ) {
            let phone = format!("{}{}{}", prefix, operator, rest);
            prop_assert!(!is_valid_phone(&phone));
        }

        #[test]
        fn wrong_length_fails(
            prefix in prop::sample::select(vec!["+212", "0"]),
            operator in prop::sample::select(vec!['6', '7']),
            rest in r"[0-9]{0,7}|[0-9]{9,12}",
        ) {
            let phone = format!("{}{}{}", prefix, operator, rest);
            prop_assert!(!is_valid_phone(&phone));
        }
    }
}

mod submission {
    use super::*;

    #[tokio::test]
    async fn test_three_day_rental_commits_and_hands_off() {
        let h = harness().await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;

        let quote = wizard.quote().unwrap();
        assert_eq!(quote.day_count, 3);
        assert_eq!(quote.rental_total.amount(), dec!(60));
        assert_eq!(quote.total_with_deposit.amount(), dec!(260));

        let receipt = h.service.submit(&mut wizard, None).await.unwrap();
        let reservation = &receipt.reservation;
        assert_eq!(reservation.total_amount.amount(), dec!(60));
        assert_eq!(reservation.deposit_amount.amount(), dec!(200));
        assert_eq!(reservation.booking_status, BookingStatus::Pending);
        assert_eq!(reservation.payment_status, PaymentStatus::Pending);
        assert!(reservation.documents_verified);
        assert_eq!(reservation.comments.as_deref(), Some("Vol AT800"));

        assert!(receipt.notified);
        assert!(!receipt.replayed);
        assert!(receipt.handoff_url.starts_with("https://wa.me/212619700592?text="));
        let text = urlencoding::decode(receipt.handoff_url.split("?text=").nth(1).unwrap()).unwrap();
        assert!(text.contains("*Total à payer: 60€*"));
        assert!(text.contains("Caution: 200€ (remboursable)"));
        assert!(text.contains("Durée: 3 jour(s)"));
        assert!(text.contains("*CIN:* AB123456"));
        assert!(text.contains("   Date: 01/03/2025"));
        assert!(text.contains("   Heure: 18:00"));
        assert_eq!(h.notifier.urls().await, vec![receipt.handoff_url.clone()]);

        assert!(matches!(wizard.state(), WizardState::Submitted(_)));
        assert!(wizard.draft().is_none());
        assert!(matches!(
            wizard.edit(DraftEdit::AcceptTerms(false)),
            Err(BookingError::DraftLocked(_))
        ));
    }

    #[tokio::test]
    async fn test_terms_not_accepted_writes_nothing() {
        let h = harness().await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
        wizard.edit(DraftEdit::AcceptTerms(false)).unwrap();

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert_eq!(err.report().unwrap().fields(), vec!["terms_accepted"]);
        assert_eq!(h.reservations.len().await, 0);
        assert_eq!(h.clients.len().await, 0);
        assert!(h.store.upload_log().await.is_empty());
        assert_eq!(wizard.current_step(), Some(WizardStep::Confirmation));
    }

    #[tokio::test]
    async fn test_missing_document_makes_no_calls() {
        let h = harness().await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
        wizard.edit(DraftEdit::RemoveDocument(DocumentSlot::LicensePhoto)).unwrap();

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert!(err.report().unwrap().has_field("documents.license_photo"));
        assert_eq!(h.clients.len().await, 0);
        assert_eq!(h.reservations.len().await, 0);
        assert!(h.store.upload_log().await.is_empty());
        assert!(h.notifier.urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_hand_off_keeps_reservation() {
        let h = harness_with(CommitSettings::default(), RecordingNotifier::failing()).await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;

        let receipt = h.service.submit(&mut wizard, None).await.unwrap();
        assert!(!receipt.notified);
        assert_eq!(h.reservations.len().await, 1);
    }
}

mod commit_order {
    use super::*;

    #[tokio::test]
    async fn test_documents_stored_under_new_client() {
        let h = harness().await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
        let receipt = h.service.submit(&mut wizard, None).await.unwrap();

        let prefix = receipt.client_id.as_uuid().to_string();
        let log = h.store.upload_log().await;
        assert_eq!(
            log,
            vec![
                format!("{}/cin_recto.jpg", prefix),
                format!("{}/cin_verso.jpg", prefix),
                format!("{}/license_photo.jpg", prefix),
            ]
        );
        assert_eq!(
            receipt.reservation.document_urls.id_back.as_deref(),
            Some(format!("memory://client-documents/{}/cin_verso.jpg", prefix).as_str())
        );
    }

    #[tokio::test]
    async fn test_client_failure_stops_before_uploads() {
        let h = harness().await;
        h.clients.fail_inserts(true);
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Persistence { entity: "client", .. }));
        assert!(h.store.upload_log().await.is_empty());
        assert_eq!(h.reservations.len().await, 0);
        assert!(matches!(wizard.state(), WizardState::Failed { .. }));
        assert!(wizard.draft().is_some());
    }

    #[tokio::test]
    async fn test_upload_failure_stops_before_reservation() {
        let h = harness().await;
        h.store.fail_uploads_ending_with("cin_verso.jpg").await;
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Upload { slot: DocumentSlot::IdBack, .. }));
        assert_eq!(h.clients.len().await, 1);
        assert_eq!(h.store.upload_log().await.len(), 2);
        assert_eq!(h.reservations.len().await, 0);
        assert!(h.notifier.urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_reservation_failure_does_not_duplicate() {
        let h = harness().await;
        h.reservations.fail_inserts(true);
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Persistence { entity: "reservation", .. }));
        assert_eq!(h.clients.len().await, 1);
        assert_eq!(h.store.len().await, 3);

        h.reservations.fail_inserts(false);
        let receipt = h.service.submit(&mut wizard, None).await.unwrap();
        assert_eq!(h.clients.len().await, 1);
        assert_eq!(h.reservations.len().await, 1);
        assert_eq!(h.store.len().await, 3);
        assert!(!receipt.replayed);
    }

    #[tokio::test]
    async fn test_retry_saves_corrected_personal_details() {
        let h = harness().await;
        h.reservations.fail_inserts(true);
        let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
        h.service.submit(&mut wizard, None).await.unwrap_err();

        let mut info = personal_info();
        info.last_name = "Corrected".to_string();
        info.phone = "0799999999".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();
        assert_eq!(wizard.current_step(), Some(WizardStep::Confirmation));

        h.reservations.fail_inserts(false);
        let receipt = h.service.submit(&mut wizard, None).await.unwrap();
        assert_eq!(h.clients.len().await, 1);

        let client = h.clients.get_client(receipt.client_id, None).await.unwrap();
        assert_eq!(client.last_name, "Corrected");
        assert_eq!(client.phone, "0799999999");
        assert_eq!(receipt.reservation.client_id, client.id);

        let text = urlencoding::decode(receipt.handoff_url.split("?text=").nth(1).unwrap()).unwrap();
        assert!(text.contains("Corrected"));
        assert!(text.contains("0799999999"));
    }

    /// A wizard whose reservation got saved although the submit reported a failure
    async fn lost_confirmation(h: &Harness) -> Wizard {
        let mut wizard = ready_wizard(h, date(2025, 3, 1), date(2025, 3, 4)).await;
        let submission = wizard.begin_submit().unwrap();
        let client = h.clients.insert_client(submission.new_client(), None).await.unwrap();
        h.reservations
            .insert_reservation(submission.new_reservation(client.id, DocumentUrls::default()), None)
            .await
            .unwrap();
        wizard.fail("connection reset").unwrap();
        wizard
    }

    #[tokio::test]
    async fn test_replay_refreshes_client_and_keeps_reservation() {
        let h = harness().await;
        let mut wizard = lost_confirmation(&h).await;

        let mut info = personal_info();
        info.email = "y.benali@example.ma".to_string();
        wizard.edit(DraftEdit::SetPersonalInfo(info)).unwrap();

        let receipt = h.service.submit(&mut wizard, None).await.unwrap();
        assert!(receipt.replayed);
        assert_eq!(h.reservations.len().await, 1);
        assert_eq!(h.clients.len().await, 1);
        assert!(h.store.upload_log().await.is_empty());

        let client = h.clients.get_client(receipt.client_id, None).await.unwrap();
        assert_eq!(client.email.as_deref(), Some("y.benali@example.ma"));
        assert!(matches!(wizard.state(), WizardState::Submitted(_)));
    }

    #[tokio::test]
    async fn test_replay_of_changed_booking_is_refused() {
        let h = harness().await;
        let mut wizard = lost_confirmation(&h).await;

        wizard
            .edit(DraftEdit::SetSchedule(schedule(date(2025, 3, 5), date(2025, 3, 9))))
            .unwrap();

        let err = h.service.submit(&mut wizard, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
        assert!(h.notifier.urls().await.is_empty());
        assert_eq!(h.reservations.len().await, 1);

        let stored = h.console.reservations(None).await.unwrap();
        assert_eq!(stored[0].reservation.start_date, date(2025, 3, 1));
        assert!(matches!(wizard.state(), WizardState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_overlap_guard_rejects_taken_dates() {
        let settings = CommitSettings {
            reject_overlapping_bookings: true,
            ..CommitSettings::default()
        };
        let h = harness_with(settings, RecordingNotifier::new()).await;

        let mut first = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
        h.service.submit(&mut first, None).await.unwrap();

        let mut overlapping = ready_wizard(&h, date(2025, 3, 3), date(2025, 3, 6)).await;
        let err = h.service.submit(&mut overlapping, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
        assert_eq!(h.clients.len().await, 1);

        let mut back_to_back = ready_wizard(&h, date(2025, 3, 4), date(2025, 3, 6)).await;
        h.service.submit(&mut back_to_back, None).await.unwrap();
        assert_eq!(h.reservations.len().await, 2);
    }

    #[tokio::test]
    async fn test_overlaps_allowed_by_default() {
        let h = harness().await;
        for _ in 0..2 {
            let mut wizard = ready_wizard(&h, date(2025, 3, 1), date(2025, 3, 4)).await;
            h.service.submit(&mut wizard, None).await.unwrap();
        }
        assert_eq!(h.reservations.len().await, 2);
    }
}

mod admin {
    use super::*;

    async fn submitted(h: &Harness) -> domain_booking::Reservation {
        let mut wizard = ready_wizard(h, date(2025, 3, 1), date(2025, 3, 4)).await;
        h.service.submit(&mut wizard, None).await.unwrap().reservation
    }

    #[tokio::test]
    async fn test_pending_is_confirmed_once() {
        let h = harness().await;
        let reservation = submitted(&h).await;

        let confirmed = h
            .console
            .change_status(reservation.id, BookingStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);

        for target in [BookingStatus::Cancelled, BookingStatus::Pending, BookingStatus::Confirmed] {
            let err = h
                .console
                .change_status(reservation.id, target, None)
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::InvalidTransition { .. }));
        }
    }

    #[tokio::test]
    async fn test_status_write_requires_expected_status() {
        let h = harness().await;
        let reservation = submitted(&h).await;

        let confirmed = h
            .reservations
            .update_reservation_status(reservation.id, BookingStatus::Pending, BookingStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(confirmed.unwrap().booking_status, BookingStatus::Confirmed);

        let stale = h
            .reservations
            .update_reservation_status(reservation.id, BookingStatus::Pending, BookingStatus::Cancelled, None)
            .await
            .unwrap();
        assert!(stale.is_none());
        let stored = h.reservations.get_reservation(reservation.id, None).await.unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_concurrent_decisions_apply_once() {
        let h = harness().await;
        let reservation = submitted(&h).await;

        let (confirm, cancel) = tokio::join!(
            h.console.change_status(reservation.id, BookingStatus::Confirmed, None),
            h.console.change_status(reservation.id, BookingStatus::Cancelled, None),
        );
        let winner = match (confirm, cancel) {
            (Ok(row), Err(BookingError::InvalidTransition { .. })) => row.booking_status,
            (Err(BookingError::InvalidTransition { .. }), Ok(row)) => row.booking_status,
            other => panic!("expected exactly one decision to land, got {:?}", other),
        };

        let stored = h.reservations.get_reservation(reservation.id, None).await.unwrap();
        assert_eq!(stored.booking_status, winner);
    }

    #[tokio::test]
    async fn test_rows_offer_actions_only_when_pending() {
        let h = harness().await;
        let first = submitted(&h).await;
        submitted(&h).await;
        h.console
            .change_status(first.id, BookingStatus::Cancelled, None)
            .await
            .unwrap();

        let pending = h.console.reservations(Some(BookingStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].available_actions,
            vec![BookingStatus::Confirmed, BookingStatus::Cancelled]
        );
        assert_eq!(pending[0].vehicle.as_ref().unwrap().model, "Dacia Logan");
        assert_eq!(pending[0].client.as_ref().unwrap().full_name(), "Yassine Benali");

        let cancelled = h.console.reservations(Some(BookingStatus::Cancelled)).await.unwrap();
        assert!(cancelled[0].available_actions.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_counts_confirmed_revenue() {
        let h = harness().await;
        let first = submitted(&h).await;
        submitted(&h).await;
        h.console
            .change_status(first.id, BookingStatus::Confirmed, None)
            .await
            .unwrap();
        h.console
            .set_payment_status(first.id, PaymentStatus::Partial, None)
            .await
            .unwrap();

        let stats = h.console.dashboard().await.unwrap();
        assert_eq!(stats.total_vehicles, 1);
        assert_eq!(stats.available_vehicles, 1);
        assert_eq!(stats.total_reservations, 2);
        assert_eq!(stats.pending_reservations, 1);
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.total_revenue.amount(), dec!(60));
        assert_eq!(stats.recent_reservations.len(), 2);
    }

    #[tokio::test]
    async fn test_rating_is_bounded() {
        let h = harness().await;
        let reservation = submitted(&h).await;

        let rated = h.console.rate_client(reservation.client_id, 5, None).await.unwrap();
        assert_eq!(rated.reliability.value(), 5);
        assert!(matches!(
            h.console.rate_client(reservation.client_id, 6, None).await,
            Err(BookingError::Customer(_))
        ));

        let found = h.console.clients(Some("benali")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(h.console.clients(Some("nobody")).await.unwrap().is_empty());
    }
}
