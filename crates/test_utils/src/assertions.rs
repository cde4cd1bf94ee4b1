//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more useful failure
//! messages than a bare `assert!`.

use core_kernel::Money;
use domain_booking::{BookingError, ValidationReport};

/// Asserts that a report lists exactly `fields`, in any order
///
/// # Panics
///
/// Panics with both field lists when they differ
pub fn assert_report_fields(report: &ValidationReport, fields: &[&str]) {
    let mut actual = report.fields();
    actual.sort_unstable();
    actual.dedup();
    let mut expected = fields.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected, "validation report: {}", report);
}

/// Asserts that an error is a validation failure naming `field`
pub fn assert_rejects_field(error: &BookingError, field: &str) {
    match error.report() {
        Some(report) => assert!(
            report.has_field(field),
            "expected a failure on '{}', got: {}",
            field,
            report
        ),
        None => panic!("expected a validation error, got: {}", error),
    }
}

/// Asserts that an amount displays as `expected` in the compact form ("60€")
pub fn assert_money_compact(money: &Money, expected: &str) {
    assert_eq!(money.compact(), expected, "amount {:?}", money);
}
