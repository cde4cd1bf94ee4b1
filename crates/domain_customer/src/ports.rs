//! Customer Domain Ports

use async_trait::async_trait;

use core_kernel::{
    ClientId, DomainPort, HealthCheckable, OperationMetadata, PortError, SubmissionId,
};

use crate::client::{Client, NewClient};
use crate::reliability::ReliabilityScore;

/// Query parameters for listing clients
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    /// Case-insensitive match over name, phone and email
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl ClientQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }
}

/// Port for client persistence
///
/// Listings are newest first.
#[async_trait]
pub trait ClientPort: DomainPort + HealthCheckable {
    /// Inserts a client
    ///
    /// When `client.submission_id` matches an existing row, that row is
    /// updated with the new details and returned, so a retried submission
    /// neither duplicates the client nor keeps details corrected since.
    async fn insert_client(
        &self,
        client: NewClient,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError>;

    async fn get_client(
        &self,
        id: ClientId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError>;

    async fn find_by_submission(
        &self,
        submission_id: SubmissionId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Option<Client>, PortError>;

    async fn list_clients(
        &self,
        query: ClientQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Client>, PortError>;

    async fn update_reliability(
        &self,
        id: ClientId,
        score: ReliabilityScore,
        metadata: Option<OperationMetadata>,
    ) -> Result<Client, PortError>;

    async fn count_clients(&self, metadata: Option<OperationMetadata>) -> Result<i64, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::HealthCheckResult;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory client store; keeps insertion order
    #[derive(Debug, Default)]
    pub struct MockClientPort {
        clients: Arc<RwLock<Vec<Client>>>,
        fail_inserts: AtomicBool,
    }

    impl MockClientPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_clients(clients: Vec<Client>) -> Self {
            let port = Self::new();
            port.clients.write().await.extend(clients);
            port
        }

        /// Makes subsequent inserts fail with a connection error
        pub fn fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }

        pub async fn len(&self) -> usize {
            self.clients.read().await.len()
        }
    }

    impl DomainPort for MockClientPort {}

    #[async_trait]
    impl HealthCheckable for MockClientPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-client-port", 0)
        }
    }

    #[async_trait]
    impl ClientPort for MockClientPort {
        async fn insert_client(
            &self,
            client: NewClient,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Client, PortError> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(PortError::connection("client store unreachable"));
            }

            let mut clients = self.clients.write().await;
            if let Some(submission) = client.submission_id {
                if let Some(existing) = clients.iter_mut().find(|c| c.submission_id == Some(submission)) {
                    existing.refresh(client);
                    return Ok(existing.clone());
                }
            }

            let created = Client::from_new(ClientId::new_v7(), client);
            clients.push(created.clone());
            Ok(created)
        }

        async fn get_client(
            &self,
            id: ClientId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Client, PortError> {
            self.clients
                .read()
                .await
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Client", id))
        }

        async fn find_by_submission(
            &self,
            submission_id: SubmissionId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Option<Client>, PortError> {
            Ok(self
                .clients
                .read()
                .await
                .iter()
                .find(|c| c.submission_id == Some(submission_id))
                .cloned())
        }

        async fn list_clients(
            &self,
            query: ClientQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Client>, PortError> {
            let clients = self.clients.read().await;
            let term = query.search.unwrap_or_default();
            let mut results: Vec<Client> = clients
                .iter()
                .rev()
                .filter(|c| c.matches(&term))
                .cloned()
                .collect();
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn update_reliability(
            &self,
            id: ClientId,
            score: ReliabilityScore,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Client, PortError> {
            let mut clients = self.clients.write().await;
            let client = clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| PortError::not_found("Client", id))?;
            client.reliability = score;
            client.updated_at = Utc::now();
            Ok(client.clone())
        }

        async fn count_clients(&self, _metadata: Option<OperationMetadata>) -> Result<i64, PortError> {
            Ok(self.clients.read().await.len() as i64)
        }
    }
}
