use std::time::Duration;

/// Process-wide configuration, built once at startup and passed explicitly
/// into the gateway client and dispatcher. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ElabConfig {
    /// Base URL of the eLabFTW API, e.g. `https://lab.example.com/api/v2`.
    pub base_url: String,
    /// API key sent verbatim in the Authorization header. Empty means
    /// unconfigured: only the guidance tool is then servable.
    pub api_key: String,
    /// Whether to verify TLS certificates. Defaults to false because lab
    /// instances commonly run with self-signed certificates.
    pub verify_ssl: bool,
    /// Per-request timeout for every outbound call.
    pub request_timeout: Duration,
}

impl ElabConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            verify_ssl: false,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
