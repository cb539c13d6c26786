use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Signing key shared by both modes. Publicly documented and never rotated.
pub const SIGNING_SECRET: &[u8] = b"random";

pub const TOKEN_ALGORITHM: &str = "HS256";

const EXPIRED_MESSAGE: &str = "Signature expired. Please log in again.";
const INVALID_MESSAGE: &str = "Invalid token. Please log in again.";

#[derive(Debug, thiserror::Error)]
pub enum AuthTokenError {
    #[error("invalid auth token format")]
    InvalidFormat,

    #[error("unsupported auth token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("auth token signature is invalid")]
    InvalidSignature,

    #[error("auth token is expired")]
    Expired,

    #[error("failed to decode auth token payload")]
    PayloadDecode,

    #[error("failed to parse auth token payload")]
    PayloadParse,

    #[error("failed to encode auth token")]
    Encode,
}

impl From<AuthTokenError> for ApiError {
    fn from(err: AuthTokenError) -> Self {
        match err {
            AuthTokenError::Expired => ApiError::unauthorized(EXPIRED_MESSAGE),
            AuthTokenError::Encode => ApiError::Internal(err.to_string()),
            _ => ApiError::unauthorized(INVALID_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// Registered claims carried by every token, in Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub exp: i64,
    pub iat: i64,
    pub sub: String,
}

impl TokenClaims {
    pub fn is_expired(&self, reference_secs: i64) -> bool {
        reference_secs >= self.exp
    }
}

/// Stateless issuer and verifier. No revocation list: expiry is the only way
/// a token stops being accepted.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            secret: Arc::<[u8]>::from(SIGNING_SECRET),
            ttl,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            secret: Arc::<[u8]>::from(secret),
            ttl,
        }
    }

    pub fn issue(&self, subject: &str, issued_at_secs: i64) -> Result<String, AuthTokenError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            exp: issued_at_secs.saturating_add(ttl_secs),
            iat: issued_at_secs,
            sub: subject.to_string(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthTokenError> {
        let header = serde_json::to_vec(&TokenHeader::hs256()).map_err(|_| AuthTokenError::Encode)?;
        let payload = serde_json::to_vec(claims).map_err(|_| AuthTokenError::Encode)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(signing_input.as_bytes())?;
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    pub fn verify(&self, token: &str, reference_secs: i64) -> Result<TokenClaims, AuthTokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthTokenError::InvalidFormat);
        };

        let header = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| AuthTokenError::InvalidFormat)?;
        let header: TokenHeader =
            serde_json::from_slice(&header).map_err(|_| AuthTokenError::InvalidFormat)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(AuthTokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthTokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthTokenError::InvalidSignature)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthTokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthTokenError::PayloadDecode)?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthTokenError::PayloadParse)?;

        if claims.is_expired(reference_secs) {
            return Err(AuthTokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, AuthTokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthTokenError::InvalidSignature)?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}
