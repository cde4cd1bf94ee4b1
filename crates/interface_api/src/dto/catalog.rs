//! Catalog and fleet administration DTOs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_fleet::{FuelType, NewVehicle, Transmission, Vehicle, VehicleUpdate};

use crate::dto::FilePayload;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub model: String,
    pub color: String,
    pub price_per_day: Decimal,
    /// Compact display form, e.g. `20€`
    pub price_label: String,
    pub deposit: Decimal,
    pub deposit_label: String,
    pub mileage_policy: String,
    pub fuel: String,
    pub transmission: String,
    pub seats: i32,
    pub available: bool,
    pub insurance_included: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleResponse {
    pub fn new(vehicle: Vehicle, currency: Currency) -> Self {
        Self {
            id: *vehicle.id.as_uuid(),
            price_label: vehicle.daily_rate(currency).compact(),
            deposit_label: vehicle.deposit_amount(currency).compact(),
            model: vehicle.model,
            color: vehicle.color,
            price_per_day: vehicle.price_per_day,
            deposit: vehicle.deposit,
            mileage_policy: vehicle.mileage_policy,
            fuel: vehicle.fuel.as_str().to_string(),
            transmission: vehicle.transmission.as_str().to_string(),
            seats: vehicle.seats,
            available: vehicle.available,
            insurance_included: vehicle.insurance_included,
            image_url: vehicle.image_url,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

/// New vehicle; omitted fields take the agency defaults
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub model: String,
    pub color: String,
    pub price_per_day: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub mileage_policy: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub seats: Option<i32>,
    pub available: Option<bool>,
    pub insurance_included: Option<bool>,
    #[validate(nested)]
    pub photo: Option<FilePayload>,
}

impl CreateVehicleRequest {
    /// Splits the request into the vehicle and its optional photo
    pub fn into_parts(self) -> Result<(NewVehicle, Option<FilePayload>), ApiError> {
        let mut new = NewVehicle::new(self.model, self.color);
        if let Some(price) = self.price_per_day {
            new.price_per_day = price;
        }
        if let Some(deposit) = self.deposit {
            new.deposit = deposit;
        }
        if let Some(mileage) = self.mileage_policy {
            new.mileage_policy = mileage;
        }
        if let Some(fuel) = self.fuel {
            new.fuel = FuelType::from_str(&fuel)?;
        }
        if let Some(transmission) = self.transmission {
            new.transmission = Transmission::from_str(&transmission)?;
        }
        if let Some(seats) = self.seats {
            new.seats = seats;
        }
        if let Some(available) = self.available {
            new.available = available;
        }
        if let Some(insurance) = self.insurance_included {
            new.insurance_included = insurance;
        }
        Ok((new, self.photo))
    }
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    pub model: Option<String>,
    pub color: Option<String>,
    pub price_per_day: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub mileage_policy: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub seats: Option<i32>,
    pub available: Option<bool>,
    pub insurance_included: Option<bool>,
    #[validate(nested)]
    pub photo: Option<FilePayload>,
}

impl UpdateVehicleRequest {
    pub fn into_parts(self) -> Result<(VehicleUpdate, Option<FilePayload>), ApiError> {
        let update = VehicleUpdate {
            model: self.model,
            color: self.color,
            price_per_day: self.price_per_day,
            deposit: self.deposit,
            mileage_policy: self.mileage_policy,
            fuel: self.fuel.as_deref().map(FuelType::from_str).transpose()?,
            transmission: self
                .transmission
                .as_deref()
                .map(Transmission::from_str)
                .transpose()?,
            seats: self.seats,
            available: self.available,
            insurance_included: self.insurance_included,
            image_url: None,
        };
        Ok((update, self.photo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_fills_defaults() {
        let request: CreateVehicleRequest = serde_json::from_value(serde_json::json!({
            "model": "Dacia Logan",
            "color": "Blanc",
            "transmission": "automatique"
        }))
        .unwrap();

        let (new, photo) = request.into_parts().unwrap();
        assert_eq!(new.price_per_day, dec!(20));
        assert_eq!(new.deposit, dec!(200));
        assert_eq!(new.transmission, Transmission::Automatic);
        assert_eq!(new.mileage_policy, "Illimité");
        assert!(photo.is_none());
    }

    #[test]
    fn test_unknown_fuel_rejected() {
        let request = UpdateVehicleRequest {
            fuel: Some("hydrogen".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.into_parts(), Err(ApiError::Validation { .. })));
    }
}
