//! S3-backed implementation of the `AssetService` trait.

use crate::clients::{S3Config, S3Presigner};
use crate::config::StorageConfig;
use crate::services::asset_service::{
    AssetError, AssetKind, AssetService, PresignedUrl, validate_key,
};

pub struct S3AssetService {
    presigner: S3Presigner,
    expiry_secs: u64,
    video_prefix: String,
    poster_prefix: String,
    profile_image_prefix: String,
}

impl S3AssetService {
    #[must_use]
    pub fn new(storage: &StorageConfig) -> Self {
        let presigner = S3Presigner::new(S3Config {
            region: storage.region.clone(),
            bucket: storage.bucket.clone(),
            access_key_id: storage.access_key_id.clone(),
            secret_access_key: storage.secret_access_key.clone(),
        });

        Self {
            presigner,
            expiry_secs: storage.presign_expiry_secs,
            video_prefix: storage.video_prefix.clone(),
            poster_prefix: storage.poster_prefix.clone(),
            profile_image_prefix: storage.profile_image_prefix.clone(),
        }
    }

    fn object_key(&self, kind: AssetKind, key: &str) -> Result<String, AssetError> {
        validate_key(key)?;

        let prefix = match kind {
            AssetKind::Video => &self.video_prefix,
            AssetKind::Poster => &self.poster_prefix,
            AssetKind::ProfileImage => &self.profile_image_prefix,
        };

        Ok(format!("{prefix}/{key}"))
    }

    fn presign(
        &self,
        method: &str,
        kind: AssetKind,
        key: &str,
    ) -> Result<PresignedUrl, AssetError> {
        let object_key = self.object_key(kind, key)?;

        let url = self
            .presigner
            .presign(method, &object_key, self.expiry_secs)
            .map_err(|e| AssetError::Signing(e.to_string()))?;

        Ok(PresignedUrl {
            url,
            expires_in: self.expiry_secs,
        })
    }
}

impl AssetService for S3AssetService {
    fn upload_url(&self, kind: AssetKind, key: &str) -> Result<PresignedUrl, AssetError> {
        self.presign("PUT", kind, key)
    }

    fn delete_url(&self, kind: AssetKind, key: &str) -> Result<PresignedUrl, AssetError> {
        self.presign("DELETE", kind, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn service() -> S3AssetService {
        S3AssetService::new(&StorageConfig::default())
    }

    #[test]
    fn upload_url_lands_under_the_kind_prefix() {
        let presigned = service().upload_url(AssetKind::Video, "clip.mp4").unwrap();
        assert!(presigned.url.contains("/movies/full_trailer/clip.mp4?"));
        assert_eq!(presigned.expires_in, 30);
    }

    #[test]
    fn profile_images_use_their_own_prefix() {
        let presigned = service()
            .upload_url(AssetKind::ProfileImage, "7/avatar.png")
            .unwrap();
        assert!(presigned.url.contains("/users/profile_images/7/avatar.png?"));
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let result = service().delete_url(AssetKind::Poster, "../secrets");
        assert!(matches!(result, Err(AssetError::InvalidKey(_))));
    }
}
