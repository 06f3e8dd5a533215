pub mod auth;

pub use auth::AuthStrategy;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use std::time::Duration;
use tracing::warn;

use crate::config::HttpSettings;
use crate::providers::error::ProviderError;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_min_delay: Duration,
    pub retry_max_delay: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_retries: 0,
            retry_min_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(30),
            user_agent: Some(concat!("switchboard/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl From<&HttpSettings> for HttpConfig {
    fn from(settings: &HttpSettings) -> Self {
        let mut config = Self::new()
            .with_timeout(Duration::from_secs(settings.timeout_secs))
            .with_max_retries(settings.max_retries);
        if let Some(ua) = &settings.user_agent {
            config = config.with_user_agent(ua);
        }
        config
    }
}

/// Shared HTTP plumbing for every provider adapter.
///
/// Transient-failure retries are only layered in when `max_retries > 0`.
#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder.build().map_err(|e| {
            ProviderError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let mut middleware = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let retry_policy = ExponentialBackoff::builder()
                .retry_bounds(config.retry_min_delay, config.retry_max_delay)
                .build_with_max_retries(config.max_retries);
            middleware = middleware.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            inner: middleware.build(),
            config,
        })
    }

    #[must_use]
    pub fn post(&self, url: &str, auth: &AuthStrategy) -> RequestBuilder {
        auth.apply(self.inner.post(url))
    }

    /// POST with a serialized JSON body.
    pub fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        auth: &AuthStrategy,
        body: &T,
    ) -> Result<RequestBuilder, ProviderError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ProviderError::InvalidRequest(format!("Failed to encode request: {e}")))?;
        Ok(self
            .post(url, auth)
            .header("content-type", "application/json")
            .body(body))
    }

    #[must_use]
    pub fn get(&self, url: &str, auth: &AuthStrategy) -> RequestBuilder {
        auth.apply(self.inner.get(url))
    }

    /// Sends `request` and turns transport failures and non-2xx statuses into
    /// [`ProviderError`]s. `api_key_env_var` only feeds the authentication hint.
    pub async fn send(
        &self,
        request: RequestBuilder,
        api_key_env_var: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e, self.config.timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ProviderError::from_status(status.as_u16(), &body, api_key_env_var);
        warn!(status = status.as_u16(), error = %err, "provider request failed");
        Err(err)
    }

    /// [`send`](Self::send) followed by JSON decoding of the body.
    pub async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        api_key_env_var: &str,
    ) -> Result<T, ProviderError> {
        self.send(request, api_key_env_var)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_retries, 0);
        assert!(config.user_agent.unwrap().starts_with("switchboard/"));
    }

    #[test]
    fn test_http_config_builder() {
        let config = HttpConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_max_retries(5)
            .with_user_agent("switchboard-test");

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.user_agent, Some("switchboard-test".to_string()));
    }

    #[test]
    fn test_http_config_from_settings() {
        let settings = HttpSettings {
            timeout_secs: 15,
            max_retries: 2,
            user_agent: None,
        };
        let config = HttpConfig::from(&settings);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_http_client_creation() {
        assert!(HttpClient::new().is_ok());
        assert!(HttpClient::with_config(HttpConfig::new().with_max_retries(3)).is_ok());
    }

    #[test]
    fn test_http_client_debug() {
        let client = HttpClient::new().expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("HttpClient"));
    }
}
