//! Sheets client configuration

use std::time::Duration;

/// Default Sheets API endpoint
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Configuration for the Sheets client
#[derive(Debug, Clone)]
pub struct SheetsClientConfig {
    /// API root, without the `/v4` prefix
    pub base_url: String,

    /// Total request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for SheetsClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SheetsClientConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root (used to point tests at a mock server)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the total timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SheetsClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SheetsClientConfig::new()
            .base_url("http://127.0.0.1:9999")
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(1));

        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
    }
}
