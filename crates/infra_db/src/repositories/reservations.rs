//! Reservation repository

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const RESERVATION_COLUMNS: &str = "id, client_id, vehicle_id, start_date, start_time, end_date, end_time, \
     pickup_location, return_location, total_amount, deposit_amount, currency, cin_recto_url, \
     cin_verso_url, license_photo_url, cin_verified, comments, booking_status, payment_status, \
     submission_id, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservationRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub currency: String,
    pub cin_recto_url: Option<String>,
    pub cin_verso_url: Option<String>,
    pub license_photo_url: Option<String>,
    pub cin_verified: bool,
    pub comments: Option<String>,
    pub booking_status: String,
    pub payment_status: String,
    pub submission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReservationRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_location: String,
    pub return_location: String,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub currency: String,
    pub cin_recto_url: Option<String>,
    pub cin_verso_url: Option<String>,
    pub license_photo_url: Option<String>,
    pub cin_verified: bool,
    pub comments: Option<String>,
    pub submission_id: Option<Uuid>,
}

/// Dashboard aggregates
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ReservationTotals {
    pub total: i64,
    pub pending: i64,
    pub confirmed_revenue: Decimal,
}

#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a pending reservation, or returns the one already stored for its submission
    pub async fn insert(&self, row: NewReservationRow) -> Result<ReservationRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO reservations (id, client_id, vehicle_id, start_date, start_time, end_date, \
             end_time, pickup_location, return_location, total_amount, deposit_amount, currency, \
             cin_recto_url, cin_verso_url, license_photo_url, cin_verified, comments, submission_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             ON CONFLICT (submission_id) DO NOTHING \
             RETURNING {RESERVATION_COLUMNS}"
        );
        let submission_id = row.submission_id;
        let inserted = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(row.id)
            .bind(row.client_id)
            .bind(row.vehicle_id)
            .bind(row.start_date)
            .bind(row.start_time)
            .bind(row.end_date)
            .bind(row.end_time)
            .bind(row.pickup_location)
            .bind(row.return_location)
            .bind(row.total_amount)
            .bind(row.deposit_amount)
            .bind(row.currency)
            .bind(row.cin_recto_url)
            .bind(row.cin_verso_url)
            .bind(row.license_photo_url)
            .bind(row.cin_verified)
            .bind(row.comments)
            .bind(row.submission_id)
            .fetch_optional(&self.pool)
            .await?;

        match (inserted, submission_id) {
            (Some(reservation), _) => Ok(reservation),
            (None, Some(submission)) => self
                .find_by_submission(submission)
                .await?
                .ok_or_else(|| DatabaseError::not_found("Reservation submission", submission)),
            (None, None) => Err(DatabaseError::QueryFailed(
                "reservation insert returned no row".to_string(),
            )),
        }
    }

    pub async fn find_by_submission(&self, submission_id: Uuid) -> Result<Option<ReservationRow>, DatabaseError> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE submission_id = $1");
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ReservationRow, DatabaseError> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Reservation", id))
    }

    /// Newest first
    pub async fn list(&self, status: Option<&str>, limit: Option<i64>) -> Result<Vec<ReservationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE ($1::text IS NULL OR booking_status = $1) \
             ORDER BY created_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Moves the booking status from `from` to `to` in one statement
    ///
    /// `Ok(None)` means the row exists but no longer has status `from`.
    pub async fn transition_booking_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Option<ReservationRow>, DatabaseError> {
        let sql = format!(
            "UPDATE reservations SET booking_status = $3, updated_at = now() \
             WHERE id = $1 AND booking_status = $2 RETURNING {RESERVATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(Some(row)),
            None => self.get_by_id(id).await.map(|_| None),
        }
    }

    pub async fn set_payment_status(&self, id: Uuid, status: &str) -> Result<ReservationRow, DatabaseError> {
        let sql = format!(
            "UPDATE reservations SET payment_status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        );
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Reservation", id))
    }

    /// Whether a live reservation of the vehicle shares a night with `[start, end)`
    pub async fn has_overlap(&self, vehicle_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<bool, DatabaseError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM reservations \
                WHERE vehicle_id = $1 AND booking_status <> 'cancelled' \
                  AND start_date < $3 AND $2 < end_date)",
        )
        .bind(vehicle_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn totals(&self) -> Result<ReservationTotals, DatabaseError> {
        let totals = sqlx::query_as::<_, ReservationTotals>(
            "SELECT count(*) AS total, \
                    count(*) FILTER (WHERE booking_status = 'pending') AS pending, \
                    coalesce(sum(total_amount) FILTER (WHERE booking_status = 'confirmed'), 0) \
                        AS confirmed_revenue \
             FROM reservations",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }
}
