//! Vehicle model
//!
//! A vehicle is what a customer rents: a model with a daily rate, a
//! refundable deposit and a handful of characteristics shown in the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use core_kernel::{Currency, Money, VehicleId};

use crate::error::FleetError;

/// Mileage policy applied when none is given
pub const DEFAULT_MILEAGE_POLICY: &str = "Illimité";

/// Fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(alias = "diesel")]
    Diesel,
    #[serde(alias = "essence", alias = "petrol", alias = "gasoline")]
    Essence,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::Essence => "Essence",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diesel" => Ok(FuelType::Diesel),
            "essence" | "petrol" | "gasoline" => Ok(FuelType::Essence),
            other => Err(FleetError::invalid(format!("unknown fuel type '{}'", other))),
        }
    }
}

/// Gearbox
///
/// Serialized with the labels the catalog displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    #[serde(rename = "Manuelle", alias = "manual", alias = "Manual")]
    Manual,
    #[serde(rename = "Automatique", alias = "automatic", alias = "Automatic")]
    Automatic,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manuelle",
            Transmission::Automatic => "Automatique",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transmission {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manuelle" | "manual" => Ok(Transmission::Manual),
            "automatique" | "automatic" => Ok(Transmission::Automatic),
            other => Err(FleetError::invalid(format!("unknown transmission '{}'", other))),
        }
    }
}

/// A rentable vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub model: String,
    pub color: String,
    pub price_per_day: Decimal,
    pub deposit: Decimal,
    pub mileage_policy: String,
    pub fuel: FuelType,
    pub transmission: Transmission,
    pub seats: i32,
    pub available: bool,
    pub insurance_included: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Builds a vehicle from a validated creation request
    pub fn from_new(id: VehicleId, new: NewVehicle) -> Self {
        let now = Utc::now();
        Self {
            id,
            model: new.model,
            color: new.color,
            price_per_day: new.price_per_day,
            deposit: new.deposit,
            mileage_policy: new.mileage_policy,
            fuel: new.fuel,
            transmission: new.transmission,
            seats: new.seats,
            available: new.available,
            insurance_included: new.insurance_included,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn daily_rate(&self, currency: Currency) -> Money {
        Money::new(self.price_per_day, currency)
    }

    pub fn deposit_amount(&self, currency: Currency) -> Money {
        Money::new(self.deposit, currency)
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, update: VehicleUpdate) {
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(price) = update.price_per_day {
            self.price_per_day = price;
        }
        if let Some(deposit) = update.deposit {
            self.deposit = deposit;
        }
        if let Some(mileage) = update.mileage_policy {
            self.mileage_policy = mileage;
        }
        if let Some(fuel) = update.fuel {
            self.fuel = fuel;
        }
        if let Some(transmission) = update.transmission {
            self.transmission = transmission;
        }
        if let Some(seats) = update.seats {
            self.seats = seats;
        }
        if let Some(available) = update.available {
            self.available = available;
        }
        if let Some(insurance) = update.insurance_included {
            self.insurance_included = insurance;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount"))
    }
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("non_negative_amount"))
    } else {
        Ok(())
    }
}

/// Request to add a vehicle to the fleet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVehicle {
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: String,
    #[validate(length(min = 1, max = 50, message = "Color is required"))]
    pub color: String,
    #[validate(custom(function = "positive_amount", message = "Daily price must be positive"))]
    pub price_per_day: Decimal,
    #[validate(custom(function = "non_negative_amount", message = "Deposit cannot be negative"))]
    pub deposit: Decimal,
    #[validate(length(min = 1, message = "Mileage policy is required"))]
    pub mileage_policy: String,
    pub fuel: FuelType,
    pub transmission: Transmission,
    #[validate(range(min = 1, max = 60, message = "Seats must be between 1 and 60"))]
    pub seats: i32,
    pub available: bool,
    pub insurance_included: bool,
}

impl NewVehicle {
    /// A vehicle with the agency's usual defaults
    pub fn new(model: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            color: color.into(),
            price_per_day: dec!(20),
            deposit: dec!(200),
            mileage_policy: DEFAULT_MILEAGE_POLICY.to_string(),
            fuel: FuelType::Diesel,
            transmission: Transmission::Manual,
            seats: 5,
            available: true,
            insurance_included: true,
        }
    }

    pub fn with_rates(mut self, price_per_day: Decimal, deposit: Decimal) -> Self {
        self.price_per_day = price_per_day;
        self.deposit = deposit;
        self
    }

    /// Runs the field rules and flattens failures into a `FleetError`
    pub fn check(&self) -> Result<(), FleetError> {
        self.validate().map_err(FleetError::from)
    }
}

/// Partial vehicle update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VehicleUpdate {
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Color is required"))]
    pub color: Option<String>,
    #[validate(custom(function = "positive_amount", message = "Daily price must be positive"))]
    pub price_per_day: Option<Decimal>,
    #[validate(custom(function = "non_negative_amount", message = "Deposit cannot be negative"))]
    pub deposit: Option<Decimal>,
    #[validate(length(min = 1, message = "Mileage policy is required"))]
    pub mileage_policy: Option<String>,
    pub fuel: Option<FuelType>,
    pub transmission: Option<Transmission>,
    #[validate(range(min = 1, max = 60, message = "Seats must be between 1 and 60"))]
    pub seats: Option<i32>,
    pub available: Option<bool>,
    pub insurance_included: Option<bool>,
    pub image_url: Option<String>,
}

impl VehicleUpdate {
    pub fn availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Default::default()
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn check(&self) -> Result<(), FleetError> {
        self.validate().map_err(FleetError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(NewVehicle::new("Dacia Logan", "Blanc").check().is_ok());
    }

    #[test]
    fn test_zero_price_rejected() {
        let vehicle = NewVehicle::new("Dacia Logan", "Blanc").with_rates(dec!(0), dec!(200));
        let err = vehicle.check().unwrap_err();
        assert!(err.to_string().contains("price_per_day"));
    }

    #[test]
    fn test_transmission_labels() {
        assert_eq!(serde_json::to_string(&Transmission::Manual).unwrap(), "\"Manuelle\"");
        let parsed: Transmission = serde_json::from_str("\"automatic\"").unwrap();
        assert_eq!(parsed, Transmission::Automatic);
        assert_eq!("Automatique".parse::<Transmission>().unwrap(), Transmission::Automatic);
    }

    #[test]
    fn test_fuel_parse() {
        assert_eq!("petrol".parse::<FuelType>().unwrap(), FuelType::Essence);
        assert!("electric".parse::<FuelType>().is_err());
    }

    #[test]
    fn test_apply_update_touches_only_given_fields() {
        let mut vehicle = Vehicle::from_new(VehicleId::new(), NewVehicle::new("Clio", "Rouge"));
        vehicle.apply(VehicleUpdate::availability(false));
        assert!(!vehicle.available);
        assert_eq!(vehicle.model, "Clio");
        assert_eq!(vehicle.price_per_day, dec!(20));
    }
}
