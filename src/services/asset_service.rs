//! Domain service for media asset upload/delete URL generation.
//!
//! The backend never proxies media bytes; it hands out short-lived
//! presigned URLs and the client talks to the object store directly.

use serde::Serialize;
use thiserror::Error;

/// Which class of media asset a URL is requested for. Each kind maps to
/// its own key prefix in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Full video files and trailers.
    Video,

    /// Poster / thumbnail artwork.
    Poster,

    /// User profile images.
    ProfileImage,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A generated URL plus its validity window.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    pub url: String,
    pub expires_in: u64,
}

/// Domain service trait for asset URL generation. Pure computation, no I/O.
pub trait AssetService: Send + Sync {
    /// Presigned PUT URL for uploading an object of the given kind.
    fn upload_url(&self, kind: AssetKind, key: &str) -> Result<PresignedUrl, AssetError>;

    /// Presigned DELETE URL for removing an object of the given kind.
    fn delete_url(&self, kind: AssetKind, key: &str) -> Result<PresignedUrl, AssetError>;
}

/// Object keys come from clients; reject anything that could escape the
/// per-kind prefix.
pub fn validate_key(key: &str) -> Result<(), AssetError> {
    if key.is_empty() {
        return Err(AssetError::InvalidKey("key cannot be empty".to_string()));
    }

    if key.len() > 512 {
        return Err(AssetError::InvalidKey("key too long".to_string()));
    }

    if key.starts_with('/') || key.contains("..") {
        return Err(AssetError::InvalidKey(format!(
            "key must be a relative path without traversal: {key}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_relative_keys() {
        assert!(validate_key("trailer.mp4").is_ok());
        assert!(validate_key("42/avatar.png").is_ok());
    }

    #[test]
    fn rejects_empty_absolute_and_traversing_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("a/../../b").is_err());
    }
}
