//! Integration tests for the kernel types as the domain crates use them

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use core_kernel::{
    Clock, Currency, DateRange, FixedClock, Money, ReservationId, SubmissionId, Timezone,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod money {
    use super::*;

    #[test]
    fn test_daily_rate_times_days() {
        let rate = Money::new(dec!(25), Currency::EUR);
        let total = rate * Decimal::from(3);
        assert_eq!(total.amount(), dec!(75));
        assert_eq!(total.compact(), "75€");
    }

    #[test]
    fn test_rental_plus_deposit() {
        let rental = Money::new(dec!(60), Currency::EUR);
        let deposit = Money::new(dec!(200), Currency::EUR);
        assert_eq!((rental + deposit).compact(), "260€");
    }

    #[test]
    fn test_from_minor_units() {
        let m = Money::from_minor(12_550, Currency::MAD);
        assert_eq!(m.amount(), dec!(125.50));
        assert_eq!(m.to_string(), "DH 125.50");
    }

    #[test]
    fn test_round_to_currency() {
        let m = Money::new(dec!(10.12345), Currency::EUR);
        assert_eq!(m.amount(), dec!(10.1235));
        assert_eq!(m.round_to_currency().amount(), dec!(10.12));
    }

    #[test]
    fn test_negative_detection() {
        assert!(Money::new(dec!(-1), Currency::EUR).is_negative());
        assert!(!Money::zero(Currency::EUR).is_negative());
    }
}

mod temporal {
    use super::*;

    #[test]
    fn test_at_local_resolves_to_utc() {
        let tz: Timezone = "UTC".parse().unwrap();
        let instant = tz.at_local(date(2025, 6, 1), NaiveTime::from_hms_opt(10, 0, 0).unwrap()).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap());
        let later = clock.advanced(chrono::Duration::days(2));
        assert_eq!(later.now() - clock.now(), chrono::Duration::days(2));
    }

    #[test]
    fn test_single_day_range_is_one_day() {
        let range = DateRange::new(date(2025, 2, 28), date(2025, 3, 1)).unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_timezone_serde_roundtrip_by_name() {
        let tz = Timezone::casablanca();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Africa/Casablanca\"");
        assert!(serde_json::from_str::<Timezone>("\"Nowhere/Land\"").is_err());
    }
}

mod identifiers {
    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
    }

    #[test]
    fn test_id_serializes_as_bare_uuid() {
        let id = ReservationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
