//! Server configuration.

use std::time::Duration;

/// Configuration for the reconciliation server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of items accepted in one push request.
    pub max_push_batch: u32,
    /// HMAC secret for bearer tokens. With `None`, authentication is
    /// disabled (loopback and test deployments).
    pub auth_secret: Option<Vec<u8>>,
    /// Bearer token lifetime.
    pub token_expiry: Duration,
}

impl ServerConfig {
    /// Creates a configuration with defaults and no authentication.
    pub fn new() -> Self {
        Self {
            max_push_batch: 500,
            auth_secret: None,
            token_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Sets the maximum push batch size.
    pub fn with_max_push_batch(mut self, max: u32) -> Self {
        self.max_push_batch = max;
        self
    }

    /// Enables bearer-token authentication with the given secret.
    pub fn with_auth_secret(mut self, secret: Vec<u8>) -> Self {
        self.auth_secret = Some(secret);
        self
    }

    /// Sets the bearer token lifetime.
    pub fn with_token_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = ServerConfig::new()
            .with_max_push_batch(50)
            .with_auth_secret(b"secret".to_vec())
            .with_token_expiry(Duration::from_secs(60));

        assert_eq!(config.max_push_batch, 50);
        assert_eq!(config.auth_secret.as_deref(), Some(b"secret".as_slice()));
        assert_eq!(config.token_expiry, Duration::from_secs(60));
    }

    #[test]
    fn default_has_no_auth() {
        assert!(ServerConfig::default().auth_secret.is_none());
    }
}
