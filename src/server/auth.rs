//! API key checkpoint
//!
//! Every route except CORS preflight requires the `X-API-KEY` header.
//! Keys are compared as SHA-256 digests, so the comparison always covers
//! 32 bytes regardless of what the client sent.

use super::AppState;
use super::error::ApiError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

pub const API_KEY_HEADER: &str = "x-api-key";

/// The configured shared secret, kept only as a digest
#[derive(Clone)]
pub struct ApiKey {
    digest: [u8; 32],
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

impl ApiKey {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    pub fn matches(&self, candidate: &[u8]) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate).into();
        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty());

    match provided {
        None => Err(ApiError::unauthorized()),
        Some(key) if state.api_key.matches(key) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Rejected request with invalid API key");
            Err(ApiError::forbidden())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key() {
        let key = ApiKey::new("s3cret");
        assert!(key.matches(b"s3cret"));
    }

    #[test]
    fn test_mismatched_keys() {
        let key = ApiKey::new("s3cret");
        assert!(!key.matches(b"s3cre"));
        assert!(!key.matches(b"s3crett"));
        assert!(!key.matches(b"S3CRET"));
        assert!(!key.matches(b""));
    }

    #[test]
    fn test_debug_hides_digest() {
        assert_eq!(format!("{:?}", ApiKey::new("s3cret")), "ApiKey(..)");
    }
}
