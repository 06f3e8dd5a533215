use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::error::ProviderError;

/// The façade operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateText,
    RunHostedModel,
    CreateEmbedding,
    SearchVectors,
    SynthesizeSpeech,
    LoadLocalModel,
    RunPipeline,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GenerateText => "generate_text",
            Self::RunHostedModel => "run_hosted_model",
            Self::CreateEmbedding => "create_embedding",
            Self::SearchVectors => "search_vectors",
            Self::SynthesizeSpeech => "synthesize_speech",
            Self::LoadLocalModel => "load_local_model",
            Self::RunPipeline => "run_pipeline",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum FacadeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{provider} {operation} failed: {source}")]
    Provider {
        provider: String,
        operation: Operation,
        #[source]
        source: ProviderError,
    },

    #[error("{provider} {operation} returned an unexpected response: {detail}")]
    ResponseShape {
        provider: String,
        operation: Operation,
        detail: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{provider} is not enabled; set {var} to use it")]
    Unavailable {
        provider: &'static str,
        var: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FacadeError>;

impl FacadeError {
    /// Wraps an adapter failure. Empty provider lists become `ResponseShape`.
    #[must_use]
    pub fn provider(provider: impl Into<String>, operation: Operation, source: ProviderError) -> Self {
        match source {
            ProviderError::EmptyResponse(detail) => Self::ResponseShape {
                provider: provider.into(),
                operation,
                detail,
            },
            source => Self::Provider {
                provider: provider.into(),
                operation,
                source,
            },
        }
    }

    #[must_use]
    pub fn shape(provider: impl Into<String>, operation: Operation, detail: impl Into<String>) -> Self {
        Self::ResponseShape {
            provider: provider.into(),
            operation,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[must_use]
    pub const fn is_response_shape(&self) -> bool {
        matches!(self, Self::ResponseShape { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = FacadeError::provider(
            "anthropic",
            Operation::GenerateText,
            ProviderError::rate_limit("slow down"),
        );
        assert_eq!(
            err.to_string(),
            "anthropic generate_text failed: Rate limit exceeded: slow down"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_empty_response_becomes_shape_error() {
        let err = FacadeError::provider(
            "openai",
            Operation::CreateEmbedding,
            ProviderError::empty("data"),
        );
        assert!(err.is_response_shape());
        assert_eq!(
            err.to_string(),
            "openai create_embedding returned an unexpected response: data"
        );
    }

    #[test]
    fn test_configuration_from() {
        let err: FacadeError = ConfigError::missing("ALT_LLM_API_KEY").into();
        assert!(err.to_string().contains("ALT_LLM_API_KEY"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FacadeError = json_err.into();
        assert!(matches!(err, FacadeError::Json(_)));
    }
}
