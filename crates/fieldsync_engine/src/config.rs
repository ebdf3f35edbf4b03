//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for sync cycles.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Sync server base URL (e.g. `https://sync.example.org`).
    pub server_url: String,
    /// Consecutive failed attempts before an item escalates to
    /// `Conflict`. Zero disables escalation.
    pub conflict_ceiling: u32,
    /// Whether a manual retry-all gives `Error` items a fresh attempt
    /// budget. An explicit per-item reset always does.
    pub reset_attempts_on_retry: bool,
    /// Upper bound on items per push request. Purely a tuning knob;
    /// items beyond it wait for the next cycle.
    pub max_push_batch: usize,
    /// Transport timeout. A cycle with no response within this bound
    /// fails the whole batch as retryable.
    pub timeout: Duration,
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            conflict_ceiling: 3,
            reset_attempts_on_retry: false,
            max_push_batch: 500,
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the conflict escalation ceiling.
    pub fn with_conflict_ceiling(mut self, ceiling: u32) -> Self {
        self.conflict_ceiling = ceiling;
        self
    }

    /// Makes retry-all clear attempt counters first.
    pub fn with_reset_attempts_on_retry(mut self, reset: bool) -> Self {
        self.reset_attempts_on_retry = reset;
        self
    }

    /// Sets the per-cycle batch bound.
    pub fn with_max_push_batch(mut self, max: usize) -> Self {
        self.max_push_batch = max;
        self
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = EngineConfig::new("https://sync.example.org")
            .with_conflict_ceiling(5)
            .with_reset_attempts_on_retry(true)
            .with_max_push_batch(50)
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.server_url, "https://sync.example.org");
        assert_eq!(config.conflict_ceiling, 5);
        assert!(config.reset_attempts_on_retry);
        assert_eq!(config.max_push_batch, 50);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.conflict_ceiling, 3);
        assert!(!config.reset_attempts_on_retry);
    }
}
