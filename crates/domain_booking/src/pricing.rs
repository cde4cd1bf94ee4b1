//! Rental pricing
//!
//! Whole calendar days between pickup and return dates times the daily rate.
//! Pickup and return hours do not change the day count. The deposit is
//! shown next to the rental total but is refundable and not stored in it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};
use domain_fleet::Vehicle;

/// Billable days, never less than one
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// Price breakdown for a vehicle and a date pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub day_count: i64,
    pub daily_rate: Money,
    pub rental_total: Money,
    pub deposit: Money,
    pub total_with_deposit: Money,
}

impl PriceQuote {
    pub fn compute(vehicle: &Vehicle, start: NaiveDate, end: NaiveDate, currency: Currency) -> Self {
        Self::from_rates(
            vehicle.daily_rate(currency),
            vehicle.deposit_amount(currency),
            start,
            end,
        )
    }

    pub fn from_rates(daily_rate: Money, deposit: Money, start: NaiveDate, end: NaiveDate) -> Self {
        let days = day_count(start, end);
        let rental_total = daily_rate * Decimal::from(days);
        Self {
            day_count: days,
            daily_rate,
            rental_total,
            deposit,
            total_with_deposit: rental_total + deposit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    #[test]
    fn test_three_days_at_25() {
        let quote = PriceQuote::from_rates(eur(dec!(25)), eur(dec!(0)), date(2025, 5, 10), date(2025, 5, 13));
        assert_eq!(quote.day_count, 3);
        assert_eq!(quote.rental_total.amount(), dec!(75));
    }

    #[test]
    fn test_deposit_added_to_display_total() {
        let quote = PriceQuote::from_rates(eur(dec!(20)), eur(dec!(200)), date(2025, 3, 1), date(2025, 3, 4));
        assert_eq!(quote.day_count, 3);
        assert_eq!(quote.rental_total.amount(), dec!(60));
        assert_eq!(quote.total_with_deposit.amount(), dec!(260));
    }

    #[test]
    fn test_same_or_inverted_dates_clamp_to_one_day() {
        assert_eq!(day_count(date(2025, 3, 1), date(2025, 3, 1)), 1);
        assert_eq!(day_count(date(2025, 3, 5), date(2025, 3, 1)), 1);
    }

    proptest! {
        #[test]
        fn quote_is_pure_and_at_least_one_day(
            offset in -30i64..400,
            length in -5i64..60,
            rate in 1i64..50_000,
        ) {
            let start = date(2025, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(length);
            let daily = Money::from_minor(rate, Currency::EUR);

            let first = PriceQuote::from_rates(daily, eur(dec!(100)), start, end);
            let second = PriceQuote::from_rates(daily, eur(dec!(100)), start, end);

            prop_assert_eq!(first, second);
            prop_assert!(first.day_count >= 1);
            prop_assert_eq!(first.rental_total, daily * Decimal::from(first.day_count));
        }
    }
}
