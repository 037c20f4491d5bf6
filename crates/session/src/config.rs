//! Configuration for the session layer.

use std::time::Duration;

use tracing::warn;

use crate::SessionError;

/// Default backend endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Largest file the backend accepts (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for connecting to a document backend.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend endpoint URL (e.g. `http://localhost:8000`).
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Uploads larger than this are rejected locally.
    pub max_upload_bytes: u64,
}

impl SessionConfig {
    /// Create a new configuration with defaults.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DOCQA_ENDPOINT` (defaults to `http://localhost:8000`)
    /// - `DOCQA_TIMEOUT_SECS` (optional, client default 30)
    /// - `DOCQA_MAX_UPLOAD_MB` (optional, default 10)
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("DOCQA_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let timeout = std::env::var("DOCQA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        let max_upload_bytes =
            upload_limit_from_mb(std::env::var("DOCQA_MAX_UPLOAD_MB").ok().as_deref());

        Self {
            endpoint,
            timeout,
            max_upload_bytes,
        }
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the upload size limit.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Reject configurations no client could work with.
    pub fn validate(&self) -> Result<(), SessionError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SessionError::Configuration("endpoint is empty".into()));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SessionError::Configuration(format!(
                "endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(SessionError::Configuration(
                "max upload size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a megabyte limit. Unparseable or overflowing values fall back to
/// the default.
fn upload_limit_from_mb(value: Option<&str>) -> u64 {
    let Some(value) = value else {
        return DEFAULT_MAX_UPLOAD_BYTES;
    };
    let bytes = value
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|mb| mb.checked_mul(1024 * 1024));
    bytes.unwrap_or_else(|| {
        warn!(%value, "ignoring invalid DOCQA_MAX_UPLOAD_MB");
        DEFAULT_MAX_UPLOAD_BYTES
    })
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = SessionConfig::new("http://backend:8000");
        assert_eq!(config.endpoint, "http://backend:8000");
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_override() {
        let config = SessionConfig::new(DEFAULT_ENDPOINT)
            .with_timeout(Duration::from_secs(5))
            .with_max_upload_bytes(1024);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn upload_limit_parses_megabytes() {
        assert_eq!(upload_limit_from_mb(None), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(upload_limit_from_mb(Some("25")), 25 * 1024 * 1024);
        assert_eq!(upload_limit_from_mb(Some("ten")), DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn upload_limit_overflow_falls_back_to_default() {
        assert_eq!(
            upload_limit_from_mb(Some("18446744073709551615")),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            upload_limit_from_mb(Some(&(u64::MAX / (1024 * 1024) + 1).to_string())),
            DEFAULT_MAX_UPLOAD_BYTES
        );
    }

    #[test]
    fn validate_rejects_bad_endpoints() {
        assert!(SessionConfig::new("").validate().is_err());
        assert!(SessionConfig::new("localhost:8000").validate().is_err());
        assert!(
            SessionConfig::new(DEFAULT_ENDPOINT)
                .with_max_upload_bytes(0)
                .validate()
                .is_err()
        );
    }
}
