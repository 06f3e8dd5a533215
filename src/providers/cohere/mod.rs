mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::config::credentials::COMMAND_LLM_API_KEY;
use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse, Message, StopReason, Usage};
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "command";
const DEFAULT_MAX_TOKENS: u32 = 300;

/// Cohere's prompt-in, generations-out endpoint.
#[derive(Clone)]
pub struct CohereProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
    max_tokens: u32,
}

impl std::fmt::Debug for CohereProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CohereProvider {
    pub fn new(api_key: ApiKey) -> ProviderResult<Self> {
        Self::with_http_config(api_key, HttpConfig::default())
    }

    pub fn with_http_config(api_key: ApiKey, http_config: HttpConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::bearer(api_key),
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

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The generate endpoint takes one flat prompt.
    fn flatten_prompt(request: &CompletionRequest) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            parts.push(system.clone());
        }
        parts.extend(request.messages.iter().map(Message::text));
        parts.join("\n\n")
    }
}

#[async_trait]
impl LLM for CohereProvider {
    fn name(&self) -> &'static str {
        "cohere"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        let body = types::GenerateRequest {
            model: self.model.as_str().to_string(),
            prompt: Self::flatten_prompt(&request),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature,
        };
        debug!(model = %self.model, max_tokens = body.max_tokens, "sending generate request");

        let url = self.base_url.join("/v1/generate");
        let http_request = self.http.post_json(&url, &self.auth, &body)?;
        let response: types::GenerateResponse =
            self.http.send_json(http_request, COMMAND_LLM_API_KEY).await?;

        let generation = response
            .generations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::empty("response contained no generations"))?;

        Ok(CompletionResponse::new(
            Message::assistant(generation.text),
            StopReason::from_provider(generation.finish_reason.as_deref()),
            Usage::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_prompt() {
        let request = CompletionRequest::prompt("What is 2+2?").with_system_prompt("Answer briefly.");
        assert_eq!(
            CohereProvider::flatten_prompt(&request),
            "Answer briefly.\n\nWhat is 2+2?"
        );
    }

    #[test]
    fn test_provider_defaults() {
        let provider = CohereProvider::new(ApiKey::new("co-key")).expect("create provider");
        assert_eq!(provider.name(), "cohere");
        assert_eq!(provider.model(), "command");
        assert_eq!(provider.max_tokens, 300);
        assert!(!format!("{provider:?}").contains("co-key"));
    }
}
