pub mod config;
mod convert;
mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::providers::error::ProviderResult;
use crate::providers::http::{HttpClient, HttpConfig};
use crate::providers::types::{BaseUrl, ModelId};

pub use config::OpenAICompatConfig;

/// Chat completions client for every vendor that speaks the OpenAI wire format.
#[derive(Clone)]
pub struct OpenAICompatProvider {
    http: HttpClient,
    config: OpenAICompatConfig,
    model: ModelId,
}

impl std::fmt::Debug for OpenAICompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompatProvider")
            .field("provider", &self.config.provider_name)
            .field("model", &self.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> ProviderResult<Self> {
        Self::with_http_config(config, HttpConfig::default())
    }

    pub fn with_http_config(
        config: OpenAICompatConfig,
        http_config: HttpConfig,
    ) -> ProviderResult<Self> {
        let model = config.default_model.clone();
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            config,
            model,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.config.default_max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        self.config.base_url.join("/v1/chat/completions")
    }
}

#[async_trait]
impl LLM for OpenAICompatProvider {
    fn name(&self) -> &str {
        self.config.provider_name
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        let chat_request =
            convert::to_chat_request(self.model.as_str(), self.config.default_max_tokens, &request);
        debug!(
            provider = self.config.provider_name,
            model = %self.model,
            messages = chat_request.messages.len(),
            "sending chat completion"
        );

        let request = self
            .http
            .post_json(&self.endpoint(), &self.config.auth, &chat_request)?;
        let response: types::ChatCompletionResponse = self
            .http
            .send_json(request, self.config.api_key_env_var)
            .await?;

        convert::from_chat_response(response)
    }
}
