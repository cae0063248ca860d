//! Configuration for the feed client.
//!
//! This module provides the [`Config`] struct holding the feed endpoint and
//! the set of instruments to maintain books for.

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Coinbase Advanced Trade market data endpoint
pub const DEFAULT_FEED_ENDPOINT: &str = "wss://advanced-trade-ws.coinbase.com";

/// Instrument subscribed when none is configured
pub const DEFAULT_INSTRUMENT: &str = "BTC-USD";

/// Environment variable overriding the feed endpoint
pub const ENV_FEED_URL: &str = "COINBASE_FEED_URL";

/// Environment variable listing instruments, comma separated
pub const ENV_PRODUCTS: &str = "COINBASE_PRODUCTS";

/// Environment variable overriding the connect timeout, in seconds
pub const ENV_CONNECT_TIMEOUT: &str = "COINBASE_CONNECT_TIMEOUT_SECS";

/// Configuration for the feed client
///
/// # Example
///
/// ```rust
/// use coinbase_book::Config;
///
/// let config = Config::new()
///     .with_instruments(["BTC-USD", "ETH-USD"])
///     .with_connect_timeout(std::time::Duration::from_secs(5));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.instruments().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// WebSocket URL of the feed
    feed_endpoint: String,

    /// Products to subscribe to, deduplicated, in insertion order
    instruments: Vec<String>,

    /// Upper bound on the connect + handshake
    connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_endpoint: DEFAULT_FEED_ENDPOINT.to_string(),
            instruments: vec![DEFAULT_INSTRUMENT.to_string()],
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Default configuration: Coinbase endpoint, `BTC-USD`, 10s timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `COINBASE_FEED_URL`, `COINBASE_PRODUCTS`
    /// and `COINBASE_CONNECT_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var(ENV_FEED_URL) {
            config = config.with_feed_endpoint(endpoint);
        }

        if let Ok(products) = std::env::var(ENV_PRODUCTS) {
            config = config.with_instruments(
                products
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty()),
            );
        }

        if let Ok(secs) = std::env::var(ENV_CONNECT_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds", ENV_CONNECT_TIMEOUT))
            })?;
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the feed WebSocket URL
    #[must_use]
    pub fn with_feed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.feed_endpoint = endpoint.into();
        self
    }

    /// Replace the instrument set (duplicates are dropped)
    #[must_use]
    pub fn with_instruments<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instruments.clear();
        for instrument in instruments {
            let instrument = instrument.into();
            if !self.instruments.contains(&instrument) {
                self.instruments.push(instrument);
            }
        }
        self
    }

    /// Set the connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Get the feed WebSocket URL
    pub fn feed_endpoint(&self) -> &str {
        &self.feed_endpoint
    }

    /// Get the configured instruments
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Get the connect timeout
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Check the endpoint is a `ws`/`wss` URL and at least one instrument is set
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        let url = Url::parse(&self.feed_endpoint)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::Config(format!(
                "feed endpoint must use ws or wss, got {}",
                url.scheme()
            )));
        }
        if self.instruments.is_empty() {
            return Err(Error::Config("no instruments configured".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.feed_endpoint(), DEFAULT_FEED_ENDPOINT);
        assert_eq!(config.instruments(), ["BTC-USD".to_string()]);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::new()
            .with_feed_endpoint("ws://localhost:9000")
            .with_instruments(["ETH-USD", "SOL-USD", "ETH-USD"])
            .with_connect_timeout(Duration::from_secs(3));

        assert_eq!(config.feed_endpoint(), "ws://localhost:9000");
        assert_eq!(
            config.instruments(),
            ["ETH-USD".to_string(), "SOL-USD".to_string()]
        );
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let http = Config::new().with_feed_endpoint("https://advanced-trade-ws.coinbase.com");
        assert!(matches!(http.validate(), Err(Error::Config(_))));

        let garbage = Config::new().with_feed_endpoint("::not a url::");
        assert!(matches!(garbage.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_no_instruments() {
        let config = Config::new().with_instruments(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
