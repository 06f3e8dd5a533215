use crate::config::LlmProvider;
use crate::providers::http::AuthStrategy;
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

/// Everything that distinguishes one OpenAI-compatible vendor from another.
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub provider_name: &'static str,
    pub base_url: BaseUrl,
    pub auth: AuthStrategy,
    pub default_model: ModelId,
    pub default_max_tokens: Option<u32>,
    pub api_key_env_var: &'static str,
}

impl OpenAICompatConfig {
    #[must_use]
    pub fn custom(provider_name: &'static str, base_url: impl Into<BaseUrl>) -> Self {
        Self {
            provider_name,
            base_url: base_url.into(),
            auth: AuthStrategy::None,
            default_model: ModelId::new(""),
            default_max_tokens: None,
            api_key_env_var: "",
        }
    }

    #[must_use]
    pub fn with_bearer_auth(mut self, key: ApiKey) -> Self {
        self.auth = AuthStrategy::bearer(key);
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<ModelId>) -> Self {
        self.default_model = model.into();
        self
    }

    #[must_use]
    pub const fn with_default_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_api_key_env_var(mut self, var: &'static str) -> Self {
        self.api_key_env_var = var;
        self
    }

    /// Preset for one of the chat-completions providers, with its default
    /// model, base URL and token limit.
    ///
    /// Returns `None` for providers that speak a different wire format.
    #[must_use]
    pub fn for_provider(provider: LlmProvider, api_key: ApiKey) -> Option<Self> {
        if !provider.is_openai_compatible() {
            return None;
        }
        Some(
            Self::custom(provider.vendor(), provider.default_base_url())
                .with_bearer_auth(api_key)
                .with_default_model(provider.default_model())
                .with_default_max_tokens(provider.default_max_tokens())
                .with_api_key_env_var(provider.credential_var()),
        )
    }

    #[must_use]
    pub fn openai(api_key: ApiKey) -> Self {
        Self::custom("openai", "https://api.openai.com")
            .with_bearer_auth(api_key)
            .with_default_model("gpt-4")
            .with_api_key_env_var(LlmProvider::Primary.credential_var())
    }

    #[must_use]
    pub fn groq(api_key: ApiKey) -> Self {
        Self::custom("groq", "https://api.groq.com/openai")
            .with_bearer_auth(api_key)
            .with_default_model("mixtral-8x7b-32768")
            .with_api_key_env_var(LlmProvider::FastInference.credential_var())
    }

    #[must_use]
    pub fn mistral(api_key: ApiKey) -> Self {
        Self::custom("mistral", "https://api.mistral.ai")
            .with_bearer_auth(api_key)
            .with_default_model("mistral-tiny")
            .with_api_key_env_var(LlmProvider::Alternate.credential_var())
    }

    #[must_use]
    pub fn together(api_key: ApiKey) -> Self {
        Self::custom("together", "https://api.together.xyz")
            .with_bearer_auth(api_key)
            .with_default_model("togethercomputer/llama-2-70b-chat")
            .with_default_max_tokens(Some(512))
            .with_api_key_env_var(LlmProvider::OpenModel.credential_var())
    }
}
