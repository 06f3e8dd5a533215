use super::error::{ConfigError, ConfigResult};
use super::models::LlmProvider;
use crate::providers::types::ApiKey;

pub const PRIMARY_LLM_API_KEY: &str = "PRIMARY_LLM_API_KEY";
pub const SECONDARY_LLM_API_KEY: &str = "SECONDARY_LLM_API_KEY";
pub const EMBEDDING_INDEX_API_KEY: &str = "EMBEDDING_INDEX_API_KEY";
pub const EMBEDDING_INDEX_ENVIRONMENT: &str = "EMBEDDING_INDEX_ENVIRONMENT";
pub const FAST_INFERENCE_API_KEY: &str = "FAST_INFERENCE_API_KEY";
pub const ALT_LLM_API_KEY: &str = "ALT_LLM_API_KEY";
pub const SPEECH_SYNTHESIS_API_KEY: &str = "SPEECH_SYNTHESIS_API_KEY";
pub const HOSTED_MODEL_API_TOKEN: &str = "HOSTED_MODEL_API_TOKEN";
pub const COMMAND_LLM_API_KEY: &str = "COMMAND_LLM_API_KEY";
pub const OPEN_MODEL_API_KEY: &str = "OPEN_MODEL_API_KEY";
pub const HF_TOKEN: &str = "HF_TOKEN";

#[derive(Debug, Clone, Copy)]
pub struct CredentialSpec {
    pub var: &'static str,
    pub required: bool,
    pub purpose: &'static str,
}

pub const CREDENTIAL_SPECS: [CredentialSpec; 11] = [
    CredentialSpec {
        var: PRIMARY_LLM_API_KEY,
        required: true,
        purpose: "OpenAI chat, embeddings and prompt pipeline",
    },
    CredentialSpec {
        var: SECONDARY_LLM_API_KEY,
        required: true,
        purpose: "Anthropic messages",
    },
    CredentialSpec {
        var: EMBEDDING_INDEX_API_KEY,
        required: true,
        purpose: "Pinecone vector index",
    },
    CredentialSpec {
        var: EMBEDDING_INDEX_ENVIRONMENT,
        required: true,
        purpose: "Pinecone environment",
    },
    CredentialSpec {
        var: FAST_INFERENCE_API_KEY,
        required: true,
        purpose: "Groq chat completions",
    },
    CredentialSpec {
        var: ALT_LLM_API_KEY,
        required: true,
        purpose: "Mistral chat completions",
    },
    CredentialSpec {
        var: SPEECH_SYNTHESIS_API_KEY,
        required: true,
        purpose: "ElevenLabs speech synthesis",
    },
    CredentialSpec {
        var: HOSTED_MODEL_API_TOKEN,
        required: false,
        purpose: "Replicate hosted models",
    },
    CredentialSpec {
        var: COMMAND_LLM_API_KEY,
        required: false,
        purpose: "Cohere generate",
    },
    CredentialSpec {
        var: OPEN_MODEL_API_KEY,
        required: false,
        purpose: "Together chat completions",
    },
    CredentialSpec {
        var: HF_TOKEN,
        required: false,
        purpose: "Hugging Face Hub (gated models)",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Present,
    Missing,
    Malformed(String),
}

/// Every provider secret, read and validated once.
///
/// Construct with [`Credentials::from_env`] in a binary, or
/// [`Credentials::from_lookup`] anywhere the process environment should not
/// be consulted.
#[derive(Debug, Clone)]
pub struct Credentials {
    primary_llm: ApiKey,
    secondary_llm: ApiKey,
    embedding_index: ApiKey,
    embedding_index_environment: String,
    fast_inference: ApiKey,
    alt_llm: ApiKey,
    speech_synthesis: ApiKey,
    hosted_model: Option<ApiKey>,
    command_llm: Option<ApiKey>,
    open_model: Option<ApiKey>,
    model_hub: Option<ApiKey>,
}

impl Credentials {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads every credential through `lookup`. Fails on the first required
    /// credential that is absent or malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str| -> ConfigResult<ApiKey> {
            let raw = lookup(var).ok_or_else(|| ConfigError::missing(var))?;
            ApiKey::parse(var, &raw)
        };
        let optional = |var: &str| -> ConfigResult<Option<ApiKey>> {
            match lookup(var) {
                Some(raw) if !raw.trim().is_empty() => ApiKey::parse(var, &raw).map(Some),
                _ => Ok(None),
            }
        };

        Ok(Self {
            primary_llm: required(PRIMARY_LLM_API_KEY)?,
            secondary_llm: required(SECONDARY_LLM_API_KEY)?,
            embedding_index: required(EMBEDDING_INDEX_API_KEY)?,
            embedding_index_environment: required(EMBEDDING_INDEX_ENVIRONMENT)?
                .as_str()
                .to_string(),
            fast_inference: required(FAST_INFERENCE_API_KEY)?,
            alt_llm: required(ALT_LLM_API_KEY)?,
            speech_synthesis: required(SPEECH_SYNTHESIS_API_KEY)?,
            hosted_model: optional(HOSTED_MODEL_API_TOKEN)?,
            command_llm: optional(COMMAND_LLM_API_KEY)?,
            open_model: optional(OPEN_MODEL_API_KEY)?,
            model_hub: optional(HF_TOKEN)?,
        })
    }

    /// Per-variable status without failing, for diagnostics. Values are never
    /// included.
    pub fn audit<F>(lookup: F) -> Vec<(CredentialSpec, CredentialState)>
    where
        F: Fn(&str) -> Option<String>,
    {
        CREDENTIAL_SPECS
            .iter()
            .map(|spec| {
                let state = match lookup(spec.var) {
                    None => CredentialState::Missing,
                    Some(raw) => match ApiKey::parse(spec.var, &raw) {
                        Ok(_) => CredentialState::Present,
                        Err(ConfigError::MissingCredential { .. }) => CredentialState::Missing,
                        Err(ConfigError::MalformedCredential { reason, .. }) => {
                            CredentialState::Malformed(reason)
                        }
                        Err(other) => CredentialState::Malformed(other.to_string()),
                    },
                };
                (*spec, state)
            })
            .collect()
    }

    #[must_use]
    pub const fn llm(&self, provider: LlmProvider) -> Option<&ApiKey> {
        match provider {
            LlmProvider::Primary => Some(&self.primary_llm),
            LlmProvider::Secondary => Some(&self.secondary_llm),
            LlmProvider::FastInference => Some(&self.fast_inference),
            LlmProvider::Alternate => Some(&self.alt_llm),
            LlmProvider::Command => self.command_llm.as_ref(),
            LlmProvider::OpenModel => self.open_model.as_ref(),
        }
    }

    #[must_use]
    pub const fn embedding(&self) -> &ApiKey {
        &self.primary_llm
    }

    #[must_use]
    pub const fn index(&self) -> &ApiKey {
        &self.embedding_index
    }

    #[must_use]
    pub fn index_environment(&self) -> &str {
        &self.embedding_index_environment
    }

    #[must_use]
    pub const fn speech(&self) -> &ApiKey {
        &self.speech_synthesis
    }

    #[must_use]
    pub const fn hosted_model(&self) -> Option<&ApiKey> {
        self.hosted_model.as_ref()
    }

    #[must_use]
    pub const fn model_hub(&self) -> Option<&ApiKey> {
        self.model_hub.as_ref()
    }
}
