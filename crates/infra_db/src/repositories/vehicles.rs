//! Vehicle repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const VEHICLE_COLUMNS: &str = "id, model, color, price_per_day, deposit, mileage, fuel, transmission, \
     seats, available, insurance_included, image_url, created_at, updated_at";

/// Vehicle row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: Uuid,
    pub model: String,
    pub color: String,
    pub price_per_day: Decimal,
    pub deposit: Decimal,
    pub mileage: String,
    pub fuel: String,
    pub transmission: String,
    pub seats: i32,
    pub available: bool,
    pub insurance_included: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values of an insert
#[derive(Debug, Clone)]
pub struct NewVehicleRow {
    pub id: Uuid,
    pub model: String,
    pub color: String,
    pub price_per_day: Decimal,
    pub deposit: Decimal,
    pub mileage: String,
    pub fuel: String,
    pub transmission: String,
    pub seats: i32,
    pub available: bool,
    pub insurance_included: bool,
}

/// Columns of a partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub model: Option<String>,
    pub color: Option<String>,
    pub price_per_day: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub mileage: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub seats: Option<i32>,
    pub available: Option<bool>,
    pub insurance_included: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Vehicles by model name, optionally only the available ones
    pub async fn list(&self, available: Option<bool>, limit: Option<i64>) -> Result<Vec<VehicleRow>, DatabaseError> {
        let sql = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles \
             WHERE ($1::boolean IS NULL OR available = $1) \
             ORDER BY model ASC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(available)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleRow, DatabaseError> {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Vehicle", id))
    }

    pub async fn insert(&self, row: NewVehicleRow) -> Result<VehicleRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO vehicles (id, model, color, price_per_day, deposit, mileage, fuel, \
             transmission, seats, available, insurance_included) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {VEHICLE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(row.id)
            .bind(row.model)
            .bind(row.color)
            .bind(row.price_per_day)
            .bind(row.deposit)
            .bind(row.mileage)
            .bind(row.fuel)
            .bind(row.transmission)
            .bind(row.seats)
            .bind(row.available)
            .bind(row.insurance_included)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, patch: VehiclePatch) -> Result<VehicleRow, DatabaseError> {
        let sql = format!(
            "UPDATE vehicles SET \
                model = COALESCE($2, model), \
                color = COALESCE($3, color), \
                price_per_day = COALESCE($4, price_per_day), \
                deposit = COALESCE($5, deposit), \
                mileage = COALESCE($6, mileage), \
                fuel = COALESCE($7, fuel), \
                transmission = COALESCE($8, transmission), \
                seats = COALESCE($9, seats), \
                available = COALESCE($10, available), \
                insurance_included = COALESCE($11, insurance_included), \
                image_url = COALESCE($12, image_url), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {VEHICLE_COLUMNS}"
        );
        sqlx::query_as::<_, VehicleRow>(&sql)
            .bind(id)
            .bind(patch.model)
            .bind(patch.color)
            .bind(patch.price_per_day)
            .bind(patch.deposit)
            .bind(patch.mileage)
            .bind(patch.fuel)
            .bind(patch.transmission)
            .bind(patch.seats)
            .bind(patch.available)
            .bind(patch.insurance_included)
            .bind(patch.image_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Vehicle", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Vehicle", id));
        }
        Ok(())
    }

    pub async fn count(&self, available_only: bool) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM vehicles WHERE NOT $1 OR available",
        )
        .bind(available_only)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
