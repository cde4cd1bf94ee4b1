//! Supabase storage adapter
//!
//! Talks to the storage REST API:
//!
//! | Operation | Request                                              |
//! |-----------|------------------------------------------------------|
//! | upload    | `POST {base}/storage/v1/object/{bucket}/{path}`      |
//! | remove    | `DELETE {base}/storage/v1/object/{bucket}` + prefixes |
//! | health    | `GET {base}/storage/v1/bucket`                       |
//!
//! Public objects are served from `{base}/storage/v1/object/public/{bucket}/{path}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, ObjectStore, ObjectUpload, PortError,
};

use crate::error::StorageError;

/// Connection settings for the storage service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub base_url: String,
    /// Service or anon key, sent as bearer token and `apikey`
    pub api_key: String,
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl StorageConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// [`ObjectStore`] backed by Supabase storage
#[derive(Debug, Clone)]
pub struct SupabaseObjectStore {
    client: Client,
    config: StorageConfig,
}

impl SupabaseObjectStore {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        if config.base_url.is_empty() {
            return Err(StorageError::Config("storage base URL is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| StorageError::Config(format!("invalid api key: {}", e)))?;
        let apikey = HeaderValue::from_str(&config.api_key)
            .map_err(|e| StorageError::Config(format!("invalid api key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url,
            urlencoding::encode(bucket),
            encode_path(path)
        )
    }

    /// Sends the request built by `build`, retrying transient failures
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response, StorageError> {
        let mut attempt = 0;
        loop {
            let result = match build().send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(StorageError::from(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "storage request failed, retrying");
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }
}

/// Encodes each path segment, keeping the slashes
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or(body);
    Err(StorageError::Status { status, message })
}

impl DomainPort for SupabaseObjectStore {}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    #[instrument(skip(self, upload), fields(bucket = %upload.bucket, path = %upload.path, size = upload.bytes.len()))]
    async fn upload_object(&self, upload: ObjectUpload) -> Result<(), PortError> {
        let url = self.object_url(&upload.bucket, &upload.path);
        let upsert = if upload.upsert { "true" } else { "false" };

        self.send(|| {
            self.client
                .post(&url)
                .header(CONTENT_TYPE, upload.content_type.as_str())
                .header("x-upsert", upsert)
                .header("cache-control", "max-age=3600")
                .body(upload.bytes.clone())
        })
        .await?;

        debug!("object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url,
            urlencoding::encode(bucket),
            encode_path(path)
        )
    }

    #[instrument(skip(self, paths), fields(bucket = %bucket, count = paths.len()))]
    async fn remove_objects(&self, bucket: &str, paths: &[String]) -> Result<(), PortError> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}/storage/v1/object/{}",
            self.config.base_url,
            urlencoding::encode(bucket)
        );
        let body = RemoveRequest { prefixes: paths };

        self.send(|| self.client.delete(&url).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheckable for SupabaseObjectStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let url = format!("{}/storage/v1/bucket", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => match check_status(response).await {
                Ok(_) => HealthCheckResult::healthy(
                    "supabase-storage",
                    start.elapsed().as_millis() as u64,
                ),
                Err(e) => HealthCheckResult::unhealthy("supabase-storage", e.to_string()),
            },
            Err(e) => HealthCheckResult::unhealthy("supabase-storage", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SupabaseObjectStore {
        SupabaseObjectStore::new(StorageConfig::new("https://klk.supabase.co/", "service-key")).unwrap()
    }

    #[test]
    fn test_public_url_layout() {
        let url = store().public_url("client-documents", "0191c3e2/cin_recto.jpg");
        assert_eq!(
            url,
            "https://klk.supabase.co/storage/v1/object/public/client-documents/0191c3e2/cin_recto.jpg"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let url = store().object_url("vehicle-photos", "dossier client/photo 1.png");
        assert_eq!(
            url,
            "https://klk.supabase.co/storage/v1/object/vehicle-photos/dossier%20client/photo%201.png"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(SupabaseObjectStore::new(StorageConfig::new("", "key")).is_err());
    }

    #[tokio::test]
    async fn test_removing_nothing_sends_nothing() {
        assert!(store().remove_objects("vehicle-photos", &[]).await.is_ok());
    }
}
