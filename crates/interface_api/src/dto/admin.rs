//! Admin console DTOs

use std::str::FromStr;

use serde::Deserialize;

use domain_booking::{BookingStatus, PaymentStatus};

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ReservationFilter {
    /// `pending`, `confirmed` or `cancelled`; all when omitted
    pub status: Option<String>,
}

impl ReservationFilter {
    pub fn status(&self) -> Result<Option<BookingStatus>, ApiError> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all")
            .map(|s| {
                BookingStatus::from_str(s)
                    .map_err(|_| ApiError::BadRequest(format!("unknown reservation status '{}'", s)))
            })
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientFilter {
    /// Fragment of a name, phone number or email
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateClientRequest {
    /// 0 to 5
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let filter = |s: &str| ReservationFilter {
            status: Some(s.to_string()),
        };
        assert_eq!(filter("pending").status().unwrap(), Some(BookingStatus::Pending));
        assert_eq!(filter("all").status().unwrap(), None);
        assert_eq!(ReservationFilter::default().status().unwrap(), None);
        assert!(filter("archived").status().is_err());
    }
}
