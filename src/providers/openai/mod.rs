mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::config::credentials::PRIMARY_LLM_API_KEY;
use crate::core::embedding::Embedder;
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// OpenAI embeddings endpoint. Chat completions go through
/// [`OpenAICompatProvider`](crate::providers::openai_compat::OpenAICompatProvider).
#[derive(Clone)]
pub struct OpenAIEmbedder {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
}

impl std::fmt::Debug for OpenAIEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIEmbedder")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIEmbedder {
    pub fn new(api_key: ApiKey) -> ProviderResult<Self> {
        Self::with_http_config(api_key, HttpConfig::default())
    }

    pub fn with_http_config(api_key: ApiKey, http_config: HttpConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::bearer(api_key),
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
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
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let url = self.base_url.join("/v1/embeddings");
        debug!(model = %self.model, chars = text.len(), "requesting embedding");

        let body = types::EmbeddingRequest {
            model: self.model.as_str(),
            input: text,
        };
        let request = self.http.post_json(&url, &self.auth, &body)?;
        let response: types::EmbeddingResponse =
            self.http.send_json(request, PRIMARY_LLM_API_KEY).await?;
        if let Some(usage) = response.usage {
            debug!(prompt_tokens = usage.prompt_tokens, "embedding usage");
        }

        response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| ProviderError::empty("response contained no embedding data"))
    }
}
