use std::time::Duration;
use thiserror::Error;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        hint: Option<String>,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The response parsed but a list the caller indexes into was empty.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. } | Self::Connection(_) | Self::Timeout(_) | Self::Server { .. }
        )
    }

    #[must_use]
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyResponse(what.into())
    }

    /// Classifies a transport failure; `timeout` is the client's configured limit.
    #[must_use]
    pub fn from_transport(err: &reqwest_middleware::Error, timeout: Duration) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => Self::Timeout(timeout),
            other => Self::Connection(other.to_string()),
        }
    }

    /// Maps an HTTP error status and body onto a variant.
    ///
    /// The message is taken from `error.message`, `error` (string), `message`
    /// or `detail` in a JSON body, falling back to the bare status.
    #[must_use]
    pub fn from_status(status: u16, body: &str, api_key_env_var: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 | 403 => Self::Authentication {
                message,
                hint: (!api_key_env_var.is_empty())
                    .then(|| format!("Check your {api_key_env_var} environment variable")),
            },
            404 => Self::ModelNotFound(message),
            429 => Self::RateLimit {
                message,
                retry_after: None,
            },
            400..=499 => Self::InvalidRequest(message),
            500..=599 => Self::Server { status, message },
            _ => Self::InvalidRequest(message),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let candidates = [
        value.get("error").and_then(|e| e.get("message")),
        value.get("error"),
        value.get("message"),
        value.get("detail").and_then(|d| d.get("message")),
        value.get("detail"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(String::from))
}
