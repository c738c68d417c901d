//! HTTP collaborator for the management API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use tracing::debug;

use super::retry::{retry, RetryConfig};
use super::APPLICATION_JSON;
use crate::config::Config;
use crate::error::{ProviderError, Result};

/// Authenticated access to one Apigee organization.
///
/// Resources only see this trait, so tests can swap in a recording fake.
#[allow(async_fn_in_trait)]
pub trait ApigeeApi {
    /// Organization every path is templated with.
    fn organization(&self) -> &str;

    /// True for the hosted management API, which lacks bulk entry replace.
    fn is_public(&self) -> bool;

    /// Sends one request and returns the response body.
    ///
    /// Non-2xx responses are returned as `ProviderError::Request` carrying the status.
    async fn http_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<String>;
}

/// Headers for requests carrying a JSON body.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers
}

#[derive(Clone)]
enum Auth {
    None,
    Basic { username: String, password: String },
    Bearer(String),
}

/// reqwest-backed management API client.
#[derive(Clone)]
pub struct ApigeeClient {
    http: reqwest::Client,
    base_url: Url,
    organization: String,
    public: bool,
    auth: Auth,
    retry: RetryConfig,
}

impl ApigeeClient {
    /// Builds a client from provider configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = Url::parse(&config.base_url()).map_err(|e| {
            ProviderError::InvalidConfig(format!("invalid base URL '{}': {}", config.base_url(), e))
        })?;

        let auth = match &config.access_token {
            Some(token) => Auth::Bearer(token.clone()),
            None if config.username.is_empty() => Auth::None,
            None => Auth::Basic {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        };

        Ok(Self {
            http,
            base_url,
            organization: config.organization.clone(),
            public: config.is_public(),
            auth,
            retry: RetryConfig::with_attempts(config.max_retries),
        })
    }

    /// Overrides the deployment mode derived from the server name.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Overrides the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<String> {
        let mut request = self.http.request(method, url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match &self.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Bearer(token) => request.bearer_auth(token),
        };
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ProviderError::request(status, text))
        }
    }
}

impl ApigeeApi for ApigeeClient {
    fn organization(&self) -> &str {
        &self.organization
    }

    fn is_public(&self) -> bool {
        self.public
    }

    async fn http_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<String> {
        let url = self.base_url.join(path).map_err(|e| {
            ProviderError::InvalidConfig(format!("invalid request path '{}': {}", path, e))
        })?;
        let operation_name = format!("{} {}", method, path);
        debug!("{}", operation_name);

        retry(&operation_name, &self.retry, || {
            self.send_once(method.clone(), url.clone(), query, headers.clone(), body.clone())
        })
        .await
    }
}
