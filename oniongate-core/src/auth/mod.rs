//! Domain ownership tokens
//!
//! A token is a compact HS256 JWS whose payload is exactly `{"domain": <name>}`.
//! Tokens are never stored, never expire and are verified as a pure function of
//! `(token, secret)`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenPayload {
    domain: String,
}

/// Issues and verifies domain-scoped ownership tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer. An empty secret is a configuration error.
    pub fn new(secret: impl AsRef<[u8]>) -> CoreResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CoreError::ConfigError(
                "Token signing secret cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    fn mac(&self) -> CoreResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| CoreError::ConfigError(format!("Invalid signing key: {e}")))
    }

    fn encode_json<T: Serialize>(value: &T) -> CoreResult<String> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        Ok(BASE64URL.encode(json))
    }

    /// Issue a token bound to `domain_name`.
    pub fn issue(&self, domain_name: &str) -> CoreResult<String> {
        let header = Self::encode_json(&TokenHeader {
            alg: ALGORITHM.to_string(),
        })?;
        let payload = Self::encode_json(&TokenPayload {
            domain: domain_name.to_string(),
        })?;
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = BASE64URL.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return the domain name it is bound to.
    pub fn verify(&self, token: &str) -> CoreResult<String> {
        let malformed = || CoreError::InvalidSignature("Token is malformed".to_string());

        let mut parts = token.trim().split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let signature = BASE64URL.decode(signature).map_err(|_| malformed())?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            CoreError::InvalidSignature("Token signature does not match".to_string())
        })?;

        let header: TokenHeader = BASE64URL
            .decode(header)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or_else(malformed)?;
        if header.alg != ALGORITHM {
            return Err(CoreError::InvalidSignature(format!(
                "Unsupported token algorithm: {}",
                header.alg
            )));
        }

        let payload: TokenPayload = BASE64URL
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or_else(malformed)?;

        Ok(payload.domain)
    }

    /// Require a token proving ownership of `requested_domain` (case-insensitive).
    pub fn authorize_for(&self, token: Option<&str>, requested_domain: &str) -> CoreResult<()> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoreError::Unauthorized("A domain token is required".to_string()))?;

        let bound = self.verify(token).map_err(|e| {
            log::warn!("Rejected token for {requested_domain}: {e}");
            CoreError::Unauthorized("The domain token is not valid".to_string())
        })?;

        let requested = requested_domain.trim().trim_end_matches('.');
        if bound.trim_end_matches('.').eq_ignore_ascii_case(requested) {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "The token is not valid for {requested}"
            )))
        }
    }
}
