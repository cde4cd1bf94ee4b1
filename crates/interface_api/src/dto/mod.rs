//! Request and response bodies

pub mod catalog;
pub mod wizard;
pub mod admin;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;

/// A file sent inline as base64
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FilePayload {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,
    #[validate(length(min = 1, message = "Content type is required"))]
    pub content_type: String,
    /// Base64 content, optionally as a `data:` URL
    #[validate(length(min = 1, message = "File content is required"))]
    pub data: String,
}

impl FilePayload {
    /// Decoded file bytes
    pub fn decode(&self) -> Result<Vec<u8>, ApiError> {
        let encoded = match self.data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| ApiError::BadRequest(format!("{} is not valid base64: {}", self.file_name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str) -> FilePayload {
        FilePayload {
            file_name: "cin.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_plain_and_data_url_payloads_decode() {
        assert_eq!(payload("/9j/").decode().unwrap(), vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            payload("data:image/jpeg;base64,/9j/").decode().unwrap(),
            vec![0xFF, 0xD8, 0xFF]
        );
    }

    #[test]
    fn test_garbage_is_a_bad_request() {
        assert!(matches!(payload("not base64!").decode(), Err(ApiError::BadRequest(_))));
    }
}
