//! Object storage port
//!
//! Customer documents and vehicle photos are kept in a hosted bucket store.
//! Uploads always use upsert semantics: writing to an existing path replaces
//! the object instead of failing on the collision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::{DomainPort, PortError};

/// Bytes to be written to a bucket
#[derive(Debug, Clone)]
pub struct ObjectUpload {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub upsert: bool,
}

/// A stored object and the URL it can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub public_url: String,
}

/// Port to the hosted object store
#[async_trait]
pub trait ObjectStore: DomainPort {
    /// Writes an object, replacing any existing object when `upsert` is set
    async fn upload_object(&self, upload: ObjectUpload) -> Result<(), PortError>;

    /// Public URL for an object path (no I/O)
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Removes objects; missing paths are ignored
    async fn remove_objects(&self, bucket: &str, paths: &[String]) -> Result<(), PortError>;

    /// Uploads and resolves the public URL in one call
    async fn put_public(&self, upload: ObjectUpload) -> Result<StoredObject, PortError> {
        let bucket = upload.bucket.clone();
        let path = upload.path.clone();
        self.upload_object(upload).await?;
        Ok(StoredObject {
            public_url: self.public_url(&bucket, &path),
            bucket,
            path,
        })
    }
}

/// Extension of a file name, lowercased, without the dot
///
/// Files without an extension fall back to `bin`.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "bin".to_string(),
    }
}

/// In-memory object store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MemoryObjectStore {
        objects: Arc<RwLock<HashMap<(String, String), (String, Vec<u8>)>>>,
        failing_paths: Arc<RwLock<HashSet<String>>>,
        uploads: Arc<RwLock<Vec<String>>>,
    }

    impl MemoryObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every upload whose path ends with `suffix` fail
        pub async fn fail_uploads_ending_with(&self, suffix: impl Into<String>) {
            self.failing_paths.write().await.insert(suffix.into());
        }

        /// Returns the stored bytes and content type
        pub async fn get(&self, bucket: &str, path: &str) -> Option<(String, Vec<u8>)> {
            self.objects
                .read()
                .await
                .get(&(bucket.to_string(), path.to_string()))
                .cloned()
        }

        /// Paths of every upload attempt, in order
        pub async fn upload_log(&self) -> Vec<String> {
            self.uploads.read().await.clone()
        }

        pub async fn len(&self) -> usize {
            self.objects.read().await.len()
        }
    }

    impl DomainPort for MemoryObjectStore {}

    #[async_trait]
    impl ObjectStore for MemoryObjectStore {
        async fn upload_object(&self, upload: ObjectUpload) -> Result<(), PortError> {
            self.uploads.write().await.push(upload.path.clone());

            let failing = self.failing_paths.read().await;
            if failing.iter().any(|suffix| upload.path.ends_with(suffix.as_str())) {
                return Err(PortError::ServiceUnavailable {
                    service: "memory-object-store".to_string(),
                });
            }
            drop(failing);

            let key = (upload.bucket, upload.path);
            let mut objects = self.objects.write().await;
            if !upload.upsert && objects.contains_key(&key) {
                return Err(PortError::conflict(format!("object {} already exists", key.1)));
            }
            objects.insert(key, (upload.content_type, upload.bytes));
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("memory://{}/{}", bucket, path)
        }

        async fn remove_objects(&self, bucket: &str, paths: &[String]) -> Result<(), PortError> {
            let mut objects = self.objects.write().await;
            for path in paths {
                objects.remove(&(bucket.to_string(), path.clone()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MemoryObjectStore;

    fn upload(path: &str, bytes: &[u8], upsert: bool) -> ObjectUpload {
        ObjectUpload {
            bucket: "client-documents".to_string(),
            path: path.to_string(),
            content_type: "image/png".to_string(),
            bytes: bytes.to_vec(),
            upsert,
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("scan.PDF"), "pdf");
        assert_eq!(file_extension("photo.front.jpeg"), "jpeg");
        assert_eq!(file_extension("noext"), "bin");
        assert_eq!(file_extension(".hidden"), "bin");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_object() {
        let store = MemoryObjectStore::new();
        store.upload_object(upload("c1/cin_recto.png", b"one", true)).await.unwrap();
        store.upload_object(upload("c1/cin_recto.png", b"two", true)).await.unwrap();

        let (_, bytes) = store.get("client-documents", "c1/cin_recto.png").await.unwrap();
        assert_eq!(bytes, b"two");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_public_returns_url() {
        let store = MemoryObjectStore::new();
        let stored = store.put_public(upload("c1/cin_verso.png", b"x", true)).await.unwrap();
        assert_eq!(stored.public_url, "memory://client-documents/c1/cin_verso.png");
    }
}
