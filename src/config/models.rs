use serde::{Deserialize, Serialize};
use std::fmt;

use super::credentials::{
    ALT_LLM_API_KEY, COMMAND_LLM_API_KEY, FAST_INFERENCE_API_KEY, OPEN_MODEL_API_KEY,
    PRIMARY_LLM_API_KEY, SECONDARY_LLM_API_KEY,
};

/// The text-generation backends the façade can route a prompt to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    Primary,
    /// Anthropic messages.
    Secondary,
    /// Groq chat completions.
    FastInference,
    /// Mistral chat completions.
    Alternate,
    /// Cohere generate; enabled when its credential is set.
    Command,
    /// Together chat completions; enabled when its credential is set.
    OpenModel,
}

impl LlmProvider {
    pub const ALL: [Self; 6] = [
        Self::Primary,
        Self::Secondary,
        Self::FastInference,
        Self::Alternate,
        Self::Command,
        Self::OpenModel,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::FastInference => "fast_inference",
            Self::Alternate => "alternate",
            Self::Command => "command",
            Self::OpenModel => "open_model",
        }
    }

    /// Short vendor name used in logs and errors.
    #[must_use]
    pub const fn vendor(self) -> &'static str {
        match self {
            Self::Primary => "openai",
            Self::Secondary => "anthropic",
            Self::FastInference => "groq",
            Self::Alternate => "mistral",
            Self::Command => "cohere",
            Self::OpenModel => "together",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Primary => "OpenAI",
            Self::Secondary => "Anthropic",
            Self::FastInference => "Groq",
            Self::Alternate => "Mistral",
            Self::Command => "Cohere",
            Self::OpenModel => "Together AI",
        }
    }

    #[must_use]
    pub const fn credential_var(self) -> &'static str {
        match self {
            Self::Primary => PRIMARY_LLM_API_KEY,
            Self::Secondary => SECONDARY_LLM_API_KEY,
            Self::FastInference => FAST_INFERENCE_API_KEY,
            Self::Alternate => ALT_LLM_API_KEY,
            Self::Command => COMMAND_LLM_API_KEY,
            Self::OpenModel => OPEN_MODEL_API_KEY,
        }
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Command | Self::OpenModel)
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Primary => "gpt-4",
            Self::Secondary => "claude-3-sonnet-20240229",
            Self::FastInference => "mixtral-8x7b-32768",
            Self::Alternate => "mistral-tiny",
            Self::Command => "command",
            Self::OpenModel => "togethercomputer/llama-2-70b-chat",
        }
    }

    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Primary => "https://api.openai.com",
            Self::Secondary => "https://api.anthropic.com",
            Self::FastInference => "https://api.groq.com/openai",
            Self::Alternate => "https://api.mistral.ai",
            Self::Command => "https://api.cohere.ai",
            Self::OpenModel => "https://api.together.xyz",
        }
    }

    /// Response-size cap sent when the caller does not set one.
    #[must_use]
    pub const fn default_max_tokens(self) -> Option<u32> {
        match self {
            Self::Secondary => Some(1000),
            Self::Command => Some(300),
            Self::OpenModel => Some(512),
            Self::Primary | Self::FastInference | Self::Alternate => None,
        }
    }

    #[must_use]
    pub const fn is_openai_compatible(self) -> bool {
        matches!(
            self,
            Self::Primary | Self::FastInference | Self::Alternate | Self::OpenModel
        )
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_providers() {
        let required: Vec<_> = LlmProvider::ALL
            .into_iter()
            .filter(|p| p.is_required())
            .collect();
        assert_eq!(
            required,
            vec![
                LlmProvider::Primary,
                LlmProvider::Secondary,
                LlmProvider::FastInference,
                LlmProvider::Alternate
            ]
        );
    }

    #[test]
    fn test_secondary_has_response_cap() {
        assert_eq!(LlmProvider::Secondary.default_max_tokens(), Some(1000));
        assert_eq!(LlmProvider::Primary.default_max_tokens(), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LlmProvider::FastInference).unwrap();
        assert_eq!(json, "\"fast_inference\"");
        assert_eq!(LlmProvider::OpenModel.to_string(), "open_model");
    }

    #[test]
    fn test_openai_compatibility() {
        assert!(LlmProvider::Primary.is_openai_compatible());
        assert!(!LlmProvider::Secondary.is_openai_compatible());
        assert!(!LlmProvider::Command.is_openai_compatible());
    }
}
