//! PostgreSQL client adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{
    ClientId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
    SubmissionId,
};
use domain_customer::{Client, ClientPort, ClientQuery, NewClient, ReliabilityScore};

use crate::error::DatabaseError;
use crate::repositories::clients::{ClientRow, NewClientRow};
use crate::repositories::ClientRepository;

#[derive(Debug, Clone)]
pub struct PostgresClientAdapter {
    repository: ClientRepository,
    pool: PgPool,
}

impl PostgresClientAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClientRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresClientAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClientAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-client-adapter").await
    }
}

#[async_trait]
impl ClientPort for PostgresClientAdapter {
    #[instrument(skip(self, client, _metadata), fields(submission_id = ?client.submission_id))]
    async fn insert_client(
        &self,
        client: NewClient,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError> {
        let row = NewClientRow {
            id: ClientId::new_v7().into(),
            first_name: client.first_name,
            last_name: client.last_name,
            phone: client.phone,
            email: client.email,
            address: client.address,
            cin_number: client.national_id,
            license_number: client.license_number,
            license_expiry: client.license_expiry,
            submission_id: client.submission_id.map(Into::into),
        };
        row_to_client(self.repository.upsert(row).await?)
    }

    #[instrument(skip(self, _metadata), fields(client_id = %id))]
    async fn get_client(
        &self,
        id: ClientId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError> {
        row_to_client(self.repository.get_by_id(id.into()).await?)
    }

    async fn find_by_submission(
        &self,
        submission_id: SubmissionId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Option<Client>, PortError> {
        self.repository
            .find_by_submission(submission_id.into())
            .await?
            .map(row_to_client)
            .transpose()
    }

    #[instrument(skip(self, _metadata))]
    async fn list_clients(
        &self,
        query: ClientQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Client>, PortError> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        self.repository
            .list(search, query.limit.map(i64::from))
            .await?
            .into_iter()
            .map(row_to_client)
            .collect()
    }

    #[instrument(skip(self, _metadata), fields(client_id = %id, score = score.value()))]
    async fn update_reliability(
        &self,
        id: ClientId,
        score: ReliabilityScore,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError> {
        let row = self
            .repository
            .update_reliability(id.into(), i32::from(score.value()))
            .await?;
        row_to_client(row)
    }

    async fn count_clients(&self, _metadata: Option<OperationMetadata>) -> Result<i64, PortError> {
        Ok(self.repository.count().await?)
    }
}

fn row_to_client(row: ClientRow) -> Result<Client, PortError> {
    let reliability = ReliabilityScore::new(row.reliability_score).map_err(|_| {
        DatabaseError::invalid_column("clients.reliability_score", row.reliability_score)
    })?;

    Ok(Client {
        id: ClientId::from(row.id),
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        email: row.email,
        address: row.address,
        national_id: row.cin_number,
        license_number: row.license_number,
        license_expiry: row.license_expiry,
        reliability,
        notes: row.notes,
        submission_id: row.submission_id.map(SubmissionId::from),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
