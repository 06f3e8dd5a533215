mod convert;
mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::config::credentials::SECONDARY_LLM_API_KEY;
use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::providers::error::ProviderResult;
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const API_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: ApiKey) -> ProviderResult<Self> {
        Self::with_http_config(api_key, HttpConfig::default())
    }

    pub fn with_http_config(api_key: ApiKey, http_config: HttpConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::anthropic(api_key),
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Used when a request leaves `max_tokens` unset; the Messages API requires it.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl LLM for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        let api_request = convert::to_api_request(&self.model, self.max_tokens, &request);
        let url = self.base_url.join("/v1/messages");
        debug!(model = %self.model, max_tokens = api_request.max_tokens, "sending messages request");

        let request = self
            .http
            .post_json(&url, &self.auth, &api_request)?
            .header("anthropic-version", API_VERSION);

        let api_response: types::ApiResponse =
            self.http.send_json(request, SECONDARY_LLM_API_KEY).await?;

        convert::from_api_response(api_response)
    }
}
