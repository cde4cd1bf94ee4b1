//! Property-Based Test Generators
//!
//! Proptest strategies producing wizard input that satisfies, or
//! deliberately breaks, the booking rules.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::fixtures::TemporalFixtures;

/// Moroccan mobile numbers in both the `0` and `+212` forms
pub fn moroccan_phone_strategy() -> impl Strategy<Value = String> {
    (prop_oneof![Just("0"), Just("+212")], prop_oneof![Just('6'), Just('7')], "[0-9]{8}")
        .prop_map(|(prefix, operator, rest)| format!("{}{}{}", prefix, operator, rest))
}

/// Numbers the phone rule must refuse: landlines, short, long or foreign
pub fn invalid_phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "05[0-9]{8}",
        "0[67][0-9]{0,7}",
        "0[67][0-9]{9,12}",
        "\\+33[67][0-9]{8}",
        "[a-z]{10}",
    ]
}

/// National ID numbers: one or two letters then 6 to 12 digits, any case
pub fn national_id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,2}[0-9]{6,12}"
}

pub fn license_number_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{8,15}"
}

/// Rental periods starting within the next year, 1 to 60 days long
pub fn rental_period_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (1i64..365, 1i64..60).prop_map(|(offset, length)| {
        let start = TemporalFixtures::tomorrow() + Duration::days(offset - 1);
        (start, start + Duration::days(length))
    })
}

/// Daily rates between 10€ and 500€, in whole cents
pub fn daily_rate_strategy() -> impl Strategy<Value = Money> {
    (1_000i64..50_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::EUR))
}
