//! Configuration Module
//!
//! Handles loading provider configuration from environment variables.

use std::env;

/// Hostname of the hosted (public) management API.
pub const PUBLIC_APIGEE_SERVER: &str = "api.enterprise.apigee.com";

/// Provider configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// Apigee organization that owns every managed resource
    pub organization: String,
    /// Management API hostname
    pub server: String,
    /// Management API port
    pub port: u16,
    /// Basic auth username (ignored when an access token is set)
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// OAuth bearer token
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts for throttled or unavailable responses
    pub max_retries: usize,
    /// Full base URL override, e.g. `http://127.0.0.1:8080/v1/`
    pub base_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `APIGEE_ORGANIZATION` - Organization name (default: empty)
    /// - `APIGEE_SERVER` - Management hostname (default: api.enterprise.apigee.com)
    /// - `APIGEE_PORT` - Management port (default: 443)
    /// - `APIGEE_USERNAME` / `APIGEE_PASSWORD` - Basic auth credentials
    /// - `APIGEE_ACCESS_TOKEN` - Bearer token, preferred over basic auth
    /// - `APIGEE_TIMEOUT_SECS` - Request timeout (default: 30)
    /// - `APIGEE_MAX_RETRIES` - Attempts for 429/503 responses (default: 3)
    /// - `APIGEE_BASE_URL` - Overrides the URL computed from server and port
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            organization: env::var("APIGEE_ORGANIZATION").unwrap_or(defaults.organization),
            server: env::var("APIGEE_SERVER")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.server),
            port: env::var("APIGEE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            username: env::var("APIGEE_USERNAME").unwrap_or(defaults.username),
            password: env::var("APIGEE_PASSWORD").unwrap_or(defaults.password),
            access_token: env::var("APIGEE_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_secs: env::var("APIGEE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_retries: env::var("APIGEE_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            base_url: env::var("APIGEE_BASE_URL").ok().filter(|v| !v.is_empty()),
        }
    }

    /// True when targeting the hosted management API.
    pub fn is_public(&self) -> bool {
        self.server == PUBLIC_APIGEE_SERVER
    }

    /// Base URL every request path is joined onto. Always ends with `/`.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{}/", url),
            None => format!("https://{}:{}/v1/", self.server, self.port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: String::new(),
            server: PUBLIC_APIGEE_SERVER.to_string(),
            port: 443,
            username: String::new(),
            password: String::new(),
            access_token: None,
            timeout_secs: 30,
            max_retries: 3,
            base_url: None,
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("organization", &self.organization)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("base_url", &self.base_url)
            .finish()
    }
}
