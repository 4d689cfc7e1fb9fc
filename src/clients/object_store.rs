//! Minimal S3 presigning client.
//!
//! Generates SigV4 query-presigned PUT/DELETE URLs so browsers upload and
//! remove media directly against the bucket; the backend never proxies
//! object bytes. Only the `host` header is signed and the payload is left
//! unsigned, which is the standard shape for browser-facing presigned URLs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Stateless presigner; cheap to clone, no I/O.
#[derive(Clone)]
pub struct S3Presigner {
    config: S3Config,
}

impl S3Presigner {
    #[must_use]
    pub const fn new(config: S3Config) -> Self {
        Self { config }
    }

    /// Presign `method` (PUT or DELETE) for `key`, valid for `expires_secs`.
    pub fn presign(&self, method: &str, key: &str, expires_secs: u64) -> Result<String> {
        self.presign_at(method, key, expires_secs, Utc::now())
    }

    /// Deterministic variant taking the signing instant, so the signature
    /// math is testable.
    pub fn presign_at(
        &self,
        method: &str,
        key: &str,
        expires_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let host = format!(
            "{}.s3.{}.amazonaws.com",
            self.config.bucket, self.config.region
        );
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{datestamp}/{}/s3/aws4_request", self.config.region);

        let canonical_uri = format!("/{}", uri_encode_path(key));

        // Parameter names are already in lexicographic order.
        let canonical_query = [
            ("X-Amz-Algorithm", ALGORITHM.to_string()),
            (
                "X-Amz-Credential",
                format!("{}/{scope}", self.config.access_key_id),
            ),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", expires_secs.to_string()),
            ("X-Amz-SignedHeaders", "host".to_string()),
        ]
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}"
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.derive_signing_key(&datestamp)?;
        let signature = hex::encode(hmac_sign(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "https://{host}{canonical_uri}?{canonical_query}&X-Amz-Signature={signature}"
        ))
    }

    /// SigV4 key derivation: date, region, service, then the terminator.
    fn derive_signing_key(&self, datestamp: &str) -> Result<Vec<u8>> {
        let secret = format!("AWS4{}", self.config.secret_access_key);
        let date_key = hmac_sign(secret.as_bytes(), datestamp.as_bytes())?;
        let region_key = hmac_sign(&date_key, self.config.region.as_bytes())?;
        let service_key = hmac_sign(&region_key, b"s3")?;
        hmac_sign(&service_key, b"aws4_request")
    }
}

fn hmac_sign(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).context("Invalid HMAC key length")?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 encode each path segment, keeping the `/` separators literal.
fn uri_encode_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
