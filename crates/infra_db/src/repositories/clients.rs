//! Client repository
//!
//! Inserts are idempotent on `submission_id`: a repeated insert updates the
//! stored row with the latest details instead of adding a second one.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const CLIENT_COLUMNS: &str = "id, first_name, last_name, phone, email, address, cin_number, \
     license_number, license_expiry, reliability_score, notes, submission_id, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub cin_number: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub reliability_score: i32,
    pub notes: Option<String>,
    pub submission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClientRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub cin_number: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub submission_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the client, or refreshes the row already stored for its submission
    ///
    /// The rating and admin notes of an existing row are left alone.
    pub async fn upsert(&self, row: NewClientRow) -> Result<ClientRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO clients (id, first_name, last_name, phone, email, address, cin_number, \
             license_number, license_expiry, submission_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (submission_id) DO UPDATE SET \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                phone = EXCLUDED.phone, \
                email = EXCLUDED.email, \
                address = EXCLUDED.address, \
                cin_number = EXCLUDED.cin_number, \
                license_number = EXCLUDED.license_number, \
                license_expiry = EXCLUDED.license_expiry, \
                updated_at = now() \
             RETURNING {CLIENT_COLUMNS}"
        );
        let client = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(row.id)
            .bind(row.first_name)
            .bind(row.last_name)
            .bind(row.phone)
            .bind(row.email)
            .bind(row.address)
            .bind(row.cin_number)
            .bind(row.license_number)
            .bind(row.license_expiry)
            .bind(row.submission_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ClientRow, DatabaseError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    pub async fn find_by_submission(&self, submission_id: Uuid) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE submission_id = $1");
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Newest first; `search` matches name, phone or email, case-insensitively
    pub async fn list(&self, search: Option<&str>, limit: Option<i64>) -> Result<Vec<ClientRow>, DatabaseError> {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients \
             WHERE $1::text IS NULL \
                OR lower(first_name || ' ' || last_name || ' ' || phone || ' ' || coalesce(email, '')) \
                   LIKE '%' || lower($1) || '%' \
             ORDER BY created_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(search)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update_reliability(&self, id: Uuid, score: i32) -> Result<ClientRow, DatabaseError> {
        let sql = format!(
            "UPDATE clients SET reliability_score = $2, updated_at = now() \
             WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .bind(score)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
