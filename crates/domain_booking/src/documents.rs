//! Identity documents
//!
//! Every reservation carries three scans: both sides of the national ID card
//! and the driving licence. Files are checked when attached to the draft and
//! uploaded only once the client row exists, at
//! `{client_id}/{slot}.{extension}` in the documents bucket.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use core_kernel::storage::file_extension;
use core_kernel::{ClientId, ObjectStore, ObjectUpload};

use crate::error::BookingError;

/// Default bucket for client documents
pub const DOCUMENTS_BUCKET: &str = "client-documents";

/// 5 MiB
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// One of the three required document slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSlot {
    /// National ID card, front
    IdFront,
    /// National ID card, back
    IdBack,
    /// Driving licence
    LicensePhoto,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 3] = [
        DocumentSlot::IdFront,
        DocumentSlot::IdBack,
        DocumentSlot::LicensePhoto,
    ];

    /// Object name used in storage paths
    pub fn storage_name(&self) -> &'static str {
        match self {
            DocumentSlot::IdFront => "cin_recto",
            DocumentSlot::IdBack => "cin_verso",
            DocumentSlot::LicensePhoto => "license_photo",
        }
    }

    /// Field name reported by validation
    pub fn field_name(&self) -> &'static str {
        match self {
            DocumentSlot::IdFront => "documents.id_front",
            DocumentSlot::IdBack => "documents.id_back",
            DocumentSlot::LicensePhoto => "documents.license_photo",
        }
    }

    /// Label in the hand-off message
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSlot::IdFront => "CIN Recto",
            DocumentSlot::IdBack => "CIN Verso",
            DocumentSlot::LicensePhoto => "Permis de conduire",
        }
    }

    /// Accepts both the snake_case API names and the storage names
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id_front" | "cin_recto" => Some(DocumentSlot::IdFront),
            "id_back" | "cin_verso" => Some(DocumentSlot::IdBack),
            "license_photo" => Some(DocumentSlot::LicensePhoto),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

/// A document accepted into a draft slot
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl DocumentFile {
    /// Checks type and size; a rejected file never reaches the draft
    pub fn accept(
        slot: DocumentSlot,
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, BookingError> {
        let content_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(BookingError::FileRejected {
                slot,
                message: "Only JPEG, PNG or PDF files are accepted".to_string(),
            });
        }
        if bytes.is_empty() {
            return Err(BookingError::FileRejected {
                slot,
                message: "The file is empty".to_string(),
            });
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(BookingError::FileRejected {
                slot,
                message: "The file must not exceed 5 MB".to_string(),
            });
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// The draft's three slots, any of which may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    id_front: Option<DocumentFile>,
    id_back: Option<DocumentFile>,
    license_photo: Option<DocumentFile>,
}

impl DocumentSet {
    pub fn get(&self, slot: DocumentSlot) -> Option<&DocumentFile> {
        self.slot_ref(slot).as_ref()
    }

    pub fn set(&mut self, slot: DocumentSlot, file: DocumentFile) {
        *self.slot_mut(slot) = Some(file);
    }

    pub fn clear(&mut self, slot: DocumentSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn missing(&self) -> Vec<DocumentSlot> {
        DocumentSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    /// All three files, or `None` while any slot is empty
    pub fn complete(&self) -> Option<CompleteDocuments> {
        Some(CompleteDocuments {
            id_front: self.id_front.clone()?,
            id_back: self.id_back.clone()?,
            license_photo: self.license_photo.clone()?,
        })
    }

    fn slot_ref(&self, slot: DocumentSlot) -> &Option<DocumentFile> {
        match slot {
            DocumentSlot::IdFront => &self.id_front,
            DocumentSlot::IdBack => &self.id_back,
            DocumentSlot::LicensePhoto => &self.license_photo,
        }
    }

    fn slot_mut(&mut self, slot: DocumentSlot) -> &mut Option<DocumentFile> {
        match slot {
            DocumentSlot::IdFront => &mut self.id_front,
            DocumentSlot::IdBack => &mut self.id_back,
            DocumentSlot::LicensePhoto => &mut self.license_photo,
        }
    }
}

/// Three attached documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteDocuments {
    pub id_front: DocumentFile,
    pub id_back: DocumentFile,
    pub license_photo: DocumentFile,
}

impl CompleteDocuments {
    pub fn iter(&self) -> impl Iterator<Item = (DocumentSlot, &DocumentFile)> {
        [
            (DocumentSlot::IdFront, &self.id_front),
            (DocumentSlot::IdBack, &self.id_back),
            (DocumentSlot::LicensePhoto, &self.license_photo),
        ]
        .into_iter()
    }
}

/// Public URLs of the uploaded documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUrls {
    pub id_front: Option<String>,
    pub id_back: Option<String>,
    pub license_photo: Option<String>,
}

impl DocumentUrls {
    pub fn get(&self, slot: DocumentSlot) -> Option<&str> {
        match slot {
            DocumentSlot::IdFront => self.id_front.as_deref(),
            DocumentSlot::IdBack => self.id_back.as_deref(),
            DocumentSlot::LicensePhoto => self.license_photo.as_deref(),
        }
    }

    pub fn set(&mut self, slot: DocumentSlot, url: String) {
        match slot {
            DocumentSlot::IdFront => self.id_front = Some(url),
            DocumentSlot::IdBack => self.id_back = Some(url),
            DocumentSlot::LicensePhoto => self.license_photo = Some(url),
        }
    }

    /// True only when all three URLs are present
    pub fn all_present(&self) -> bool {
        DocumentSlot::ALL.iter().all(|slot| self.get(*slot).is_some())
    }
}

/// Uploads documents to the object store
#[derive(Clone)]
pub struct DocumentUploadGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl DocumentUploadGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_bucket(store, DOCUMENTS_BUCKET)
    }

    pub fn with_bucket(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn object_path(client_id: ClientId, slot: DocumentSlot, file_name: &str) -> String {
        format!(
            "{}/{}.{}",
            client_id.as_uuid(),
            slot.storage_name(),
            file_extension(file_name)
        )
    }

    /// Stores one document (overwriting) and returns its public URL
    #[instrument(skip(self, file), fields(client_id = %client_id, slot = %slot, size = file.size()))]
    pub async fn upload(
        &self,
        client_id: ClientId,
        slot: DocumentSlot,
        file: &DocumentFile,
    ) -> Result<String, BookingError> {
        let path = Self::object_path(client_id, slot, file.file_name());
        let stored = self
            .store
            .put_public(ObjectUpload {
                bucket: self.bucket.clone(),
                path,
                content_type: file.content_type().to_string(),
                bytes: file.bytes().to_vec(),
                upsert: true,
            })
            .await
            .map_err(|e| BookingError::Upload {
                slot,
                message: e.to_string(),
            })?;

        debug!(url = %stored.public_url, "document stored");
        Ok(stored.public_url)
    }

    /// Uploads all three documents in slot order, stopping at the first failure
    pub async fn upload_all(
        &self,
        client_id: ClientId,
        documents: &CompleteDocuments,
    ) -> Result<DocumentUrls, BookingError> {
        let mut urls = DocumentUrls::default();
        for (slot, file) in documents.iter() {
            let url = self.upload(client_id, slot, file).await?;
            urls.set(slot, url);
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_types() {
        for content_type in ["image/jpeg", "image/png", "application/pdf", "IMAGE/PNG; charset=binary"] {
            assert!(
                DocumentFile::accept(DocumentSlot::IdFront, "scan", content_type, vec![1]).is_ok(),
                "{} should be accepted",
                content_type
            );
        }
    }

    #[test]
    fn test_rejects_other_types() {
        let err = DocumentFile::accept(DocumentSlot::IdBack, "scan.gif", "image/gif", vec![1]).unwrap_err();
        assert!(matches!(err, BookingError::FileRejected { slot: DocumentSlot::IdBack, .. }));
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let at_limit = vec![0u8; MAX_DOCUMENT_BYTES];
        assert!(DocumentFile::accept(DocumentSlot::LicensePhoto, "a.pdf", "application/pdf", at_limit).is_ok());

        let over = vec![0u8; MAX_DOCUMENT_BYTES + 1];
        assert!(DocumentFile::accept(DocumentSlot::LicensePhoto, "a.pdf", "application/pdf", over).is_err());
    }

    #[test]
    fn test_object_path() {
        let client = ClientId::new();
        assert_eq!(
            DocumentUploadGateway::object_path(client, DocumentSlot::IdFront, "Recto.JPEG"),
            format!("{}/cin_recto.jpeg", client.as_uuid())
        );
    }

    #[test]
    fn test_document_set_missing_and_complete() {
        let mut set = DocumentSet::default();
        assert_eq!(set.missing().len(), 3);
        assert!(set.complete().is_none());

        for slot in DocumentSlot::ALL {
            set.set(slot, DocumentFile::accept(slot, "f.png", "image/png", vec![1]).unwrap());
        }
        assert!(set.missing().is_empty());
        assert!(set.complete().is_some());

        set.clear(DocumentSlot::IdBack);
        assert_eq!(set.missing(), vec![DocumentSlot::IdBack]);
    }

    #[test]
    fn test_urls_verified_only_when_complete() {
        let mut urls = DocumentUrls::default();
        urls.set(DocumentSlot::IdFront, "a".into());
        urls.set(DocumentSlot::IdBack, "b".into());
        assert!(!urls.all_present());
        urls.set(DocumentSlot::LicensePhoto, "c".into());
        assert!(urls.all_present());
    }
}
