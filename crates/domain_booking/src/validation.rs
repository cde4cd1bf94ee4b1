//! Step validation rules
//!
//! Each wizard step has a set of conditions that must hold before the
//! customer may move past it. A check never stops at the first failure: the
//! report lists every unmet condition with the field it concerns.
//!
//! # Rules
//!
//! | Step          | Conditions                                                       |
//! |---------------|------------------------------------------------------------------|
//! | Vehicle       | a vehicle is selected                                            |
//! | Dates         | both dates set, start before end, pickup in the future, places   |
//! | PersonalInfo  | name/email/phone/address/ID/licence formats, licence not expired, three documents |
//! | Confirmation  | terms accepted                                                   |
//!
//! "Now" and "today" come from the injected clock, read in the agency's
//! timezone.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{SharedClock, SystemClock, Timezone};

use crate::draft::{PersonalInfo, ReservationDraft};
use crate::wizard::WizardStep;

/// Moroccan mobile number: `+212` or `0`, then 6 or 7, then 8 digits
pub static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\+212|0)[67]\d{8}$").expect("valid phone pattern"));

/// National ID card number: one or two letters then 6 to 12 digits
pub static NATIONAL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]{1,2}[0-9]{6,12}$").expect("valid national id pattern"));

/// Driving licence number: 8 to 15 letters or digits
pub static LICENSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9]{8,15}$").expect("valid license pattern"));

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

pub fn is_valid_national_id(id: &str) -> bool {
    NATIONAL_ID_PATTERN.is_match(id)
}

pub fn is_valid_license_number(number: &str) -> bool {
    LICENSE_PATTERN.is_match(number)
}

/// One unmet condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every unmet condition found by a check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Evaluates step rules against a draft
#[derive(Debug, Clone)]
pub struct StepRules {
    clock: SharedClock,
    timezone: Timezone,
}

impl StepRules {
    pub fn new(clock: SharedClock, timezone: Timezone) -> Self {
        Self { clock, timezone }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Conditions for leaving `step`
    pub fn check_step(&self, step: WizardStep, draft: &ReservationDraft) -> ValidationReport {
        match step {
            WizardStep::Vehicle => self.check_vehicle(draft),
            WizardStep::Dates => self.check_dates(draft),
            WizardStep::PersonalInfo => self.check_personal(draft),
            WizardStep::Confirmation => self.check_confirmation(draft),
        }
    }

    /// Conditions of every step from `from` up to but excluding `to`
    pub fn check_range(&self, from: WizardStep, to: WizardStep, draft: &ReservationDraft) -> ValidationReport {
        let mut report = ValidationReport::new();
        for step in WizardStep::ALL {
            if step >= from && step < to {
                report.merge(self.check_step(step, draft));
            }
        }
        report
    }

    /// Conditions of every step, terms included
    pub fn check_all(&self, draft: &ReservationDraft) -> ValidationReport {
        let mut report = ValidationReport::new();
        for step in WizardStep::ALL {
            report.merge(self.check_step(step, draft));
        }
        report
    }

    fn check_vehicle(&self, draft: &ReservationDraft) -> ValidationReport {
        let mut report = ValidationReport::new();
        if draft.vehicle.is_none() {
            report.add("vehicle", "Choose a vehicle");
        }
        report
    }

    fn check_dates(&self, draft: &ReservationDraft) -> ValidationReport {
        let mut report = ValidationReport::new();
        let schedule = &draft.schedule;

        match schedule.start_date {
            None => report.add("start_date", "Pickup date is required"),
            Some(start) => match self.timezone.at_local(start, schedule.start_time) {
                Ok(pickup) if pickup > self.clock.now() => {}
                Ok(_) => report.add("start_date", "Pickup must be in the future"),
                Err(e) => report.add("start_time", e.to_string()),
            },
        }

        match (schedule.start_date, schedule.end_date) {
            (_, None) => report.add("end_date", "Return date is required"),
            (Some(start), Some(end)) if end <= start => {
                report.add("end_date", "Return date must be after pickup date")
            }
            _ => {}
        }

        if schedule.pickup_location.trim().is_empty() {
            report.add("pickup_location", "Pickup location is required");
        }
        if schedule.return_location.trim().is_empty() {
            report.add("return_location", "Return location is required");
        }
        report
    }

    fn check_personal(&self, draft: &ReservationDraft) -> ValidationReport {
        let mut report = self.check_personal_fields(&draft.personal);
        for slot in draft.documents.missing() {
            report.add(slot.field_name(), format!("{} is required", slot.label()));
        }
        report
    }

    /// Format rules of the identity fields alone
    pub fn check_personal_fields(&self, info: &PersonalInfo) -> ValidationReport {
        let info = &info.normalized();
        let mut report = ValidationReport::new();

        if let Err(errors) = info.validate() {
            let mut derived: Vec<FieldError> = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| FieldError {
                        field: field.to_string(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string()),
                    })
                })
                .collect();
            derived.sort_by(|a, b| a.field.cmp(&b.field));
            report.errors.extend(derived);
        }

        if !is_valid_phone(&info.phone) {
            report.add("phone", "Phone must look like +212600000000 or 0600000000");
        }
        if !is_valid_national_id(&info.national_id) {
            report.add("national_id", "Invalid national ID number");
        }
        if !is_valid_license_number(&info.license_number) {
            report.add("license_number", "Invalid driving licence number");
        }

        let today = self.timezone.today(self.clock.now());
        match info.license_expiry {
            None => report.add("license_expiry", "Licence expiry date is required"),
            Some(expiry) if expiry <= today => report.add("license_expiry", "Driving licence has expired"),
            Some(_) => {}
        }
        report
    }

    fn check_confirmation(&self, draft: &ReservationDraft) -> ValidationReport {
        let mut report = ValidationReport::new();
        if !draft.terms_accepted {
            report.add("terms_accepted", "Accept the rental conditions");
        }
        report
    }
}

impl Default for StepRules {
    fn default() -> Self {
        Self::new(std::sync::Arc::new(SystemClock), Timezone::default())
    }
}
