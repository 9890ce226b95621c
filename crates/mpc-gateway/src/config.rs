//! Gateway configuration

use std::time::Duration;

/// Default connection-level timeout for all gateway calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway client configuration
///
/// Consumed once when the service instances are constructed; not re-read
/// per call.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway API username
    pub username: String,
    /// Gateway API password
    pub password: String,
    /// Numeric merchant identifier used in token-service paths
    pub merchant_key: u64,
    /// Gateway root URL, trailing slash stripped
    pub base_url: String,
    /// Default ISO currency code for charges without an explicit override
    pub currency: String,
    /// QuickPayments key; fetched lazily per call when absent
    pub quick_payments_key: Option<String>,
    /// Connection-level timeout applied to every request
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create a new gateway config
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        merchant_key: u64,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            username: username.into(),
            password: password.into(),
            merchant_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: "USD".to_string(),
            quick_payments_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the default currency code
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set an explicit QuickPayments key
    pub fn with_quick_payments_key(mut self, key: impl Into<String>) -> Self {
        self.quick_payments_key = Some(key.into());
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
