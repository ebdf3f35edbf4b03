//! Bearer-token authentication for push/pull requests.
//!
//! Tokens are HMAC-SHA256 signed and carry the subject (operator email)
//! plus an issue timestamp for expiration checking.
//!
//! ## Token format (before hex encoding)
//!
//! - 2 bytes: subject length (big-endian)
//! - N bytes: subject, UTF-8
//! - 8 bytes: issue timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature over everything before it

use crate::error::{ServerError, ServerResult};
use crate::hex;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration with a 24-hour expiry.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Issues a token for a subject, hex-encoded for transport.
    pub fn issue_token(&self, subject: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let subject_bytes = subject.as_bytes();
        let mut data = Vec::with_capacity(2 + subject_bytes.len() + 8);
        data.extend_from_slice(&(subject_bytes.len() as u16).to_be_bytes());
        data.extend_from_slice(subject_bytes);
        data.extend_from_slice(&timestamp.to_be_bytes());

        let signature = self.sign(&data);
        data.extend_from_slice(&signature);
        hex::encode(&data)
    }

    /// Validates a hex-encoded token, returning its subject.
    pub fn validate_token(&self, token: &str) -> ServerResult<String> {
        let bytes = hex::decode(token)
            .ok_or_else(|| ServerError::NotAuthorized("malformed token".into()))?;

        if bytes.len() < 2 + 8 + SIGNATURE_LEN {
            return Err(ServerError::NotAuthorized("token too short".into()));
        }

        let subject_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        let expected_len = 2 + subject_len + 8 + SIGNATURE_LEN;
        if bytes.len() != expected_len {
            return Err(ServerError::NotAuthorized("token length mismatch".into()));
        }

        let signed = &bytes[..2 + subject_len + 8];
        let signature = &bytes[2 + subject_len + 8..];
        if signature != self.sign(signed).as_slice() {
            return Err(ServerError::NotAuthorized("invalid signature".into()));
        }

        let subject = std::str::from_utf8(&bytes[2..2 + subject_len])
            .map_err(|_| ServerError::NotAuthorized("invalid subject".into()))?
            .to_string();

        let timestamp_bytes: [u8; 8] = bytes[2 + subject_len..2 + subject_len + 8]
            .try_into()
            .map_err(|_| ServerError::NotAuthorized("invalid timestamp".into()))?;
        let timestamp = u64::from_be_bytes(timestamp_bytes);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let expiry_millis = self.config.token_expiry.as_millis() as u64;
        if now > timestamp.saturating_add(expiry_millis) {
            return Err(ServerError::NotAuthorized("token expired".into()));
        }

        Ok(subject)
    }

    fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.config.secret).expect("HMAC accepts any key length");
        mac.update(data);
        mac.finalize().into_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> TokenValidator {
        TokenValidator::new(AuthConfig::new(b"test-secret-key-32-bytes-long!!".to_vec()))
    }

    #[test]
    fn issue_and_validate() {
        let validator = validator();
        let token = validator.issue_token("operator@example.com");

        let subject = validator.validate_token(&token).unwrap();
        assert_eq!(subject, "operator@example.com");
    }

    #[test]
    fn reject_tampered_token() {
        let validator = validator();
        let mut token = validator.issue_token("operator@example.com");

        // Flip a nibble inside the signature.
        let flipped = if token.ends_with('0') { '1' } else { '0' };
        token.pop();
        token.push(flipped);

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn reject_wrong_secret() {
        let token = validator().issue_token("operator@example.com");

        let other = TokenValidator::new(AuthConfig::new(b"another-secret".to_vec()));
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn reject_garbage() {
        let validator = validator();
        assert!(validator.validate_token("not-hex").is_err());
        assert!(validator.validate_token("abcd").is_err());
        assert!(validator.validate_token("").is_err());
    }

    #[test]
    fn reject_expired_token() {
        let config = AuthConfig::new(b"secret".to_vec()).with_expiry(Duration::from_secs(0));
        let validator = TokenValidator::new(config);

        let token = validator.issue_token("operator@example.com");
        std::thread::sleep(Duration::from_millis(10));

        assert!(validator.validate_token(&token).is_err());
    }
}
