//! Client configuration.

use std::time::Duration;
use url::Url;

/// Configuration for an XML-RPC client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint the calls are posted to (e.g. `https://host/xmlrpc/2/common`).
    pub url: Url,

    /// Database name passed as the first parameter of `authenticate` and
    /// `execute_kw`.
    pub database: Option<String>,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl ClientConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref())?;
        Ok(Self {
            url: parsed,
            database: None,
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("xmlrpc-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Disables TLS verification (for testing only).
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the endpoint as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_creation() {
        let config = ClientConfig::new("https://erp.example.com/xmlrpc/2/common").unwrap();
        assert_eq!(config.url_str(), "https://erp.example.com/xmlrpc/2/common");
        assert!(config.database.is_none());
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("xmlrpc-client/"));
    }

    #[test]
    fn config_builder_methods() {
        let config = ClientConfig::new("http://localhost:8069/xmlrpc/2/object")
            .unwrap()
            .with_database("prod")
            .with_insecure_tls()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("erp-sync/1.0");

        assert_eq!(config.database.as_deref(), Some("prod"));
        assert!(!config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "erp-sync/1.0");
    }

    #[test]
    fn invalid_url_returns_error() {
        assert!(ClientConfig::new("not a valid url").is_err());
    }
}
