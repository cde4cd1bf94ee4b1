//! Client model
//!
//! A client row is created by every successful reservation submission and
//! afterwards only read (or re-rated) from the admin console.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, SubmissionId};

use crate::reliability::ReliabilityScore;

/// A customer who has submitted a reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    /// National identity card number (CIN)
    pub national_id: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub reliability: ReliabilityScore,
    pub notes: Option<String>,
    /// Submission that created this row
    pub submission_id: Option<SubmissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn from_new(id: ClientId, new: NewClient) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: Some(new.email),
            address: Some(new.address),
            national_id: Some(new.national_id),
            license_number: Some(new.license_number),
            license_expiry: Some(new.license_expiry),
            reliability: ReliabilityScore::default(),
            notes: None,
            submission_id: new.submission_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the customer-entered details with a newer submission of the same draft
    ///
    /// The rating, admin notes and creation time are kept.
    pub fn refresh(&mut self, new: NewClient) {
        self.first_name = new.first_name;
        self.last_name = new.last_name;
        self.phone = new.phone;
        self.email = Some(new.email);
        self.address = Some(new.address);
        self.national_id = Some(new.national_id);
        self.license_number = Some(new.license_number);
        self.license_expiry = Some(new.license_expiry);
        self.updated_at = Utc::now();
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Lowercased text the admin search box matches against
    fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.first_name,
            self.last_name,
            self.phone,
            self.email.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }

    /// Case-insensitive substring match over name, phone and email
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || self.search_haystack().contains(&term.to_lowercase())
    }
}

/// Client fields captured by the reservation wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub national_id: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    /// Idempotency token; inserts with a known token return the existing row
    pub submission_id: Option<SubmissionId>,
}

/// Filters the admin client list
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    clients.iter().filter(|c| c.matches(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(first: &str, last: &str, phone: &str, email: &str) -> Client {
        Client::from_new(
            ClientId::new(),
            NewClient {
                first_name: first.to_string(),
                last_name: last.to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
                address: "12 Rue Ibn Sina, Marrakech".to_string(),
                national_id: "AB123456".to_string(),
                license_number: "LIC12345678".to_string(),
                license_expiry: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                submission_id: None,
            },
        )
    }

    #[test]
    fn test_search_matches_across_fields() {
        let c = client("Yasmine", "Alaoui", "0612345678", "yasmine@example.ma");
        assert!(c.matches("yasmine alaoui"));
        assert!(c.matches("ALAOUI"));
        assert!(c.matches("061234"));
        assert!(c.matches("example.ma"));
        assert!(!c.matches("bennani"));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let clients = vec![
            client("Omar", "Idrissi", "0700000000", "omar@example.ma"),
            client("Sara", "Tazi", "0611111111", "sara@example.ma"),
        ];
        assert_eq!(filter_clients(&clients, "  ").len(), 2);
        assert_eq!(filter_clients(&clients, "sara").len(), 1);
    }

    #[test]
    fn test_new_client_starts_with_default_rating() {
        let c = client("Omar", "Idrissi", "0700000000", "omar@example.ma");
        assert_eq!(c.reliability, ReliabilityScore::default());
        assert_eq!(c.full_name(), "Omar Idrissi");
    }
}
