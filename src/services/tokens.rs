//! Session token authority — issue and verify signed identity tokens.
//!
//! Tokens are stateless HS256 JWTs carrying the subject id and admin flag.
//! Validity is determined purely by signature and expiry; no lookup happens
//! at verification time, so a changed admin flag only takes effect once the
//! old token expires.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens expire 24 hours after issuance.
pub const TOKEN_TTL_SECS: i64 = 86_400;

/// Decoded payload of a verified session token.
///
/// Trusted as of issuance time; handlers compare `id` against path
/// parameters for self-service actions and branch on `is_admin` for
/// admin-only actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject user id.
    pub id: i32,

    pub is_admin: bool,

    /// Issued-at (unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (unix timestamp, seconds). Always `iat` + the configured TTL.
    pub exp: i64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("malformed")]
    Malformed,

    #[error("bad-signature")]
    BadSignature,

    #[error("expired")]
    Expired,
}

/// Issues and verifies session tokens with a process-wide symmetric secret.
///
/// The secret is injected at construction (from the environment at startup,
/// or a fixture value in tests) and is read-only afterwards.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenAuthority {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, TOKEN_TTL_SECS)
    }

    /// Constructor with an explicit TTL, used by tests to mint
    /// already-expired tokens.
    #[must_use]
    pub fn with_ttl(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a token whose exp has passed is expired, full stop.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Sign a token asserting `{id, is_admin}` as of now.
    pub fn issue(&self, user_id: i32, is_admin: bool) -> anyhow::Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            id: user_id,
            is_admin,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {e}"))
    }

    /// Check structure, signature, and expiry; return the embedded claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_verify_returns_claims() {
        let authority = TokenAuthority::new(SECRET);
        let token = authority.issue(42, true).unwrap();

        let claims = authority.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert!(claims.is_admin);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECS);
    }

    #[test]
    fn token_is_three_dot_separated_segments() {
        let authority = TokenAuthority::new(SECRET);
        let token = authority.issue(1, false).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let authority = TokenAuthority::with_ttl(SECRET, -60);
        let token = authority.issue(7, false).unwrap();

        assert_eq!(authority.verify(&token), Err(TokenRejection::Expired));
    }

    #[test]
    fn foreign_secret_is_rejected_as_bad_signature() {
        let issuer = TokenAuthority::new("some-other-secret");
        let verifier = TokenAuthority::new(SECRET);
        let token = issuer.issue(7, false).unwrap();

        assert_eq!(verifier.verify(&token), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn garbage_is_rejected_as_malformed() {
        let authority = TokenAuthority::new(SECRET);

        assert_eq!(
            authority.verify("not-a-token"),
            Err(TokenRejection::Malformed)
        );
        assert_eq!(authority.verify(""), Err(TokenRejection::Malformed));
    }

    #[test]
    fn tampered_payload_does_not_verify() {
        let authority = TokenAuthority::new(SECRET);
        let token = authority.issue(7, false).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        // Swap in a different (validly encoded) payload; signature no longer matches.
        parts[1] = {
            use jsonwebtoken::{EncodingKey, Header, encode};
            let forged = AccessClaims {
                id: 7,
                is_admin: true,
                iat: chrono::Utc::now().timestamp(),
                exp: chrono::Utc::now().timestamp() + 1000,
            };
            let other = encode(
                &Header::default(),
                &forged,
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();
            other.split('.').nth(1).unwrap().to_string()
        };

        let tampered = parts.join(".");
        assert!(authority.verify(&tampered).is_err());
    }
}
