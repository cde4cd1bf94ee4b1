//! Messaging hand-off
//!
//! Once a reservation is saved the customer is sent to the agency's
//! WhatsApp number with a prefilled French summary of the booking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::PortError;

use crate::documents::{DocumentSlot, DocumentUrls};
use crate::ports::HandoffNotifier;
use crate::wizard::ValidatedSubmission;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Where the summary is sent and whose name it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Agency number in international format, digits only
    pub phone: String,
    pub business_name: String,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            phone: "212619700592".to_string(),
            business_name: "KLK AUTO CAR".to_string(),
        }
    }
}

/// `https://wa.me/{phone}?text={encoded}`
pub fn handoff_url(phone: &str, text: &str) -> String {
    format!("https://wa.me/{}?text={}", phone, urlencoding::encode(text))
}

/// Builds the reservation summary sent to the agency
pub fn compose_summary(
    submission: &ValidatedSubmission,
    urls: &DocumentUrls,
    config: &HandoffConfig,
) -> String {
    let personal = &submission.personal;
    let vehicle = &submission.vehicle;
    let quote = &submission.quote;
    let date = |d: chrono::NaiveDate| d.format("%d/%m/%Y").to_string();
    let time = |t: chrono::NaiveTime| t.format("%H:%M").to_string();

    let mut lines: Vec<String> = vec![
        format!("*RÉSERVATION {}*", config.business_name),
        SEPARATOR.to_string(),
        String::new(),
        "*INFORMATIONS CLIENT*".to_string(),
        format!(
            "*Nom Complet:* {} {}",
            personal.first_name.trim(),
            personal.last_name.trim()
        ),
        format!("*Téléphone:* {}", personal.phone),
        format!("*Email:* {}", personal.email.trim()),
        format!("*Adresse:* {}", personal.address.trim()),
        format!("*CIN:* {}", personal.national_id.to_uppercase()),
        format!("*Permis:* {}", personal.license_number.to_uppercase()),
        format!("*Expiration Permis:* {}", date(submission.license_expiry)),
        String::new(),
        SEPARATOR.to_string(),
        "*DÉTAILS VÉHICULE*".to_string(),
        format!("Modèle: {}", vehicle.model),
        format!("Couleur: {}", vehicle.color),
        format!("Carburant: {}", vehicle.fuel.as_str()),
        format!("Transmission: {}", vehicle.transmission.as_str()),
        format!("Places: {}", vehicle.seats),
        format!("Tarif journalier: {}", quote.daily_rate.compact()),
        String::new(),
        SEPARATOR.to_string(),
        "*DATES & LIEUX*".to_string(),
        "*Prise en charge:*".to_string(),
        format!("   Lieu: {}", submission.pickup_location),
        format!("   Date: {}", date(submission.period.start)),
        format!("   Heure: {}", time(submission.start_time)),
        String::new(),
        "*Restitution:*".to_string(),
        format!("   Lieu: {}", submission.return_location),
        format!("   Date: {}", date(submission.period.end)),
        format!("   Heure: {}", time(submission.end_time)),
        String::new(),
        SEPARATOR.to_string(),
        "*TARIFICATION*".to_string(),
        format!("Durée: {} jour(s)", quote.day_count),
        format!("Montant location: {}", quote.rental_total.compact()),
        format!("Caution: {} (remboursable)", quote.deposit.compact()),
        format!("*Total à payer: {}*", quote.rental_total.compact()),
    ];

    if let Some(notes) = &submission.notes {
        lines.push(String::new());
        lines.push(format!("*Notes:* {}", notes));
    }

    lines.push(String::new());
    lines.push(SEPARATOR.to_string());
    lines.push("*DOCUMENTS FOURNIS*".to_string());
    for slot in DocumentSlot::ALL {
        lines.push(format!("{}: {}", slot.label(), urls.get(slot).unwrap_or("-")));
    }

    lines.push(String::new());
    lines.push(SEPARATOR.to_string());
    lines.push("*Conditions acceptées:* Oui".to_string());
    lines.push(format!(
        "*Assurance:* {}",
        if vehicle.insurance_included {
            "Incluse"
        } else {
            "À confirmer"
        }
    ));
    lines.push(String::new());
    lines.push(format!("Merci d'avoir choisi {}!", config.business_name));
    lines.push("Nos équipes vous contactent sous peu.".to_string());

    lines.join("\n")
}

/// Logs the hand-off link; the browser opens it from the submit response
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl HandoffNotifier for LoggingNotifier {
    async fn hand_off(&self, url: &str) -> Result<(), PortError> {
        info!(url_length = url.len(), "reservation hand-off link ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_text() {
        let url = handoff_url("212619700592", "*Total à payer: 60€*\nOui & Non");
        assert!(url.starts_with("https://wa.me/212619700592?text="));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
        assert!(url.contains("%0A"));
        assert!(url.contains("%26"));
    }

    #[test]
    fn test_default_config() {
        let config = HandoffConfig::default();
        assert_eq!(config.phone, "212619700592");
        assert_eq!(config.business_name, "KLK AUTO CAR");
    }
}
