//! The single entry point over every hosted AI service.

mod builder;
mod lazy;

pub use builder::FacadeBuilder;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Instrument, Span, debug, info_span, warn};
use uuid::Uuid;

use crate::config::{AppConfig, Credentials, LlmProvider};
use crate::config::credentials::HOSTED_MODEL_API_TOKEN;
use crate::core::embedding::Embedder;
use crate::core::error::{FacadeError, Operation, Result};
use crate::core::llm::LLM;
use crate::core::local_model::{LocalModel, ModelLoader};
use crate::core::pipeline::{LLMChain, PIPELINE_TEMPERATURE, PIPELINE_TEMPLATE, PromptTemplate};
use crate::core::runner::{ModelRef, ModelRunner};
use crate::core::speech::{AudioData, SpeechSynthesizer};
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::core::value::Value;
use crate::core::vector::{DEFAULT_TOP_K, QueryRequest, QueryResult, VectorIndex};

use lazy::LazyHandle;

/// Uniform client over the text-generation, embedding, vector search, speech,
/// hosted-model and local-model providers.
///
/// Every required credential is checked when the façade is built. Provider
/// clients are created on first use and reused. The façade is `Send + Sync`
/// and meant to be shared behind an `Arc`.
pub struct ServiceFacade {
    config: Arc<AppConfig>,
    llms: HashMap<LlmProvider, LazyHandle<dyn LLM>>,
    embedder: LazyHandle<dyn Embedder>,
    vector_index: LazyHandle<dyn VectorIndex>,
    speech: LazyHandle<dyn SpeechSynthesizer>,
    runner: Option<LazyHandle<dyn ModelRunner>>,
    model_loader: LazyHandle<dyn ModelLoader>,
}

fn operation_span(provider: &str, operation: Operation) -> Span {
    info_span!(
        "facade",
        provider,
        operation = %operation,
        request_id = %Uuid::new_v4(),
    )
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FacadeError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

impl ServiceFacade {
    pub fn new(config: AppConfig, credentials: Credentials) -> Result<Self> {
        Self::builder(config).credentials(credentials).build()
    }

    /// Loads [`AppConfig`] from the config file and `SWITCHBOARD_*` variables
    /// and reads credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        let config = AppConfig::load()?;
        let credentials = Credentials::from_env()?;
        Self::new(config, credentials)
    }

    #[must_use]
    pub fn builder(config: AppConfig) -> FacadeBuilder {
        FacadeBuilder::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn is_enabled(&self, provider: LlmProvider) -> bool {
        self.llms.contains_key(&provider)
    }

    #[must_use]
    pub const fn has_hosted_runner(&self) -> bool {
        self.runner.is_some()
    }

    /// Names of every provider this façade can reach, in a stable order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = LlmProvider::ALL
            .iter()
            .filter_map(|p| self.llms.get(p).map(LazyHandle::label))
            .collect();
        let services = [
            Some(self.embedder.label()),
            Some(self.vector_index.label()),
            Some(self.speech.label()),
            self.runner.as_ref().map(LazyHandle::label),
            Some(self.model_loader.label()),
        ];
        for label in services.into_iter().flatten() {
            if !names.contains(&label) {
                names.push(label);
            }
        }
        names
    }

    fn llm_handle(&self, provider: LlmProvider) -> Result<&LazyHandle<dyn LLM>> {
        self.llms.get(&provider).ok_or(FacadeError::Unavailable {
            provider: provider.vendor(),
            var: provider.credential_var(),
        })
    }

    /// Full completion through `provider`. Applies the provider's configured
    /// `max_tokens` when the request leaves it unset.
    pub async fn complete(
        &self,
        provider: LlmProvider,
        mut request: CompletionRequest,
    ) -> Result<CompletionResponse> {
        const OP: Operation = Operation::GenerateText;
        if !request.has_text() {
            return Err(FacadeError::invalid("prompt must not be empty"));
        }
        let slot = self.llm_handle(provider)?;
        let label = slot.label();
        if request.max_tokens.is_none() {
            request.max_tokens = self.config.llm.max_tokens(provider);
        }

        async move {
            let llm = slot.get().map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(model = llm.model(), max_tokens = ?request.max_tokens, "dispatching completion");
            llm.complete(request).await.map_err(|e| {
                warn!(error = %e, "completion failed");
                FacadeError::provider(label, OP, e)
            })
        }
        .instrument(operation_span(label, OP))
        .await
    }

    /// Runs `request` through `provider` and returns the text of the first
    /// content block.
    pub async fn generate(&self, provider: LlmProvider, request: CompletionRequest) -> Result<String> {
        let label = self.llm_handle(provider)?.label();
        self.complete(provider, request)
            .await?
            .into_leading_text(label, Operation::GenerateText)
    }

    /// Sends `prompt` as a single user message and returns the text of the
    /// first content block.
    pub async fn generate_text(&self, provider: LlmProvider, prompt: &str) -> Result<String> {
        require_text("prompt", prompt)?;
        self.generate(provider, CompletionRequest::prompt(prompt)).await
    }

    /// Runs a hosted model. `model_ref` is `owner/name` or
    /// `owner/name:version`; `input` must be a map. The output is returned
    /// as the provider produced it.
    pub async fn run_hosted_model(&self, model_ref: &str, input: Value) -> Result<Value> {
        const OP: Operation = Operation::RunHostedModel;
        require_text("model reference", model_ref)?;
        let model: ModelRef = model_ref.parse()?;
        if input.as_map().is_none() {
            return Err(FacadeError::invalid("hosted model input must be a map"));
        }
        let slot = self.runner.as_ref().ok_or(FacadeError::Unavailable {
            provider: "replicate",
            var: HOSTED_MODEL_API_TOKEN,
        })?;
        let label = slot.label();

        async move {
            let runner = slot.get().map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(model = %model, "running hosted model");
            runner.run(&model, input).await.map_err(|e| {
                warn!(error = %e, "hosted model run failed");
                FacadeError::provider(label, OP, e)
            })
        }
        .instrument(operation_span(label, OP))
        .await
    }

    /// Embeds `text`; the vector length always equals `embedding.dimensions`.
    pub async fn create_embedding(&self, text: &str) -> Result<Vec<f32>> {
        const OP: Operation = Operation::CreateEmbedding;
        require_text("text", text)?;
        let label = self.embedder.label();
        let expected = self.config.embedding.dimensions;

        async move {
            let embedder = self
                .embedder
                .get()
                .map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(model = embedder.model(), "creating embedding");
            let vector = embedder.embed(text).await.map_err(|e| {
                warn!(error = %e, "embedding failed");
                FacadeError::provider(label, OP, e)
            })?;

            if vector.len() != expected {
                return Err(FacadeError::shape(
                    label,
                    OP,
                    format!("expected {expected} dimensions, got {}", vector.len()),
                ));
            }
            Ok(vector)
        }
        .instrument(operation_span(label, OP))
        .await
    }

    /// Nearest neighbours of `vector`, at most `top_k` (default 10), best
    /// first, with metadata.
    pub async fn search_vectors(&self, vector: Vec<f32>, top_k: Option<usize>) -> Result<QueryResult> {
        const OP: Operation = Operation::SearchVectors;
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(FacadeError::invalid("top_k must be at least 1"));
        }
        if vector.is_empty() {
            return Err(FacadeError::invalid("query vector must not be empty"));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(FacadeError::invalid("query vector contains non-finite values"));
        }
        let label = self.vector_index.label();
        let mut request = QueryRequest::new(vector, top_k);
        if let Some(namespace) = &self.config.index.namespace {
            request = request.with_namespace(namespace.as_str());
        }

        async move {
            let index = self
                .vector_index
                .get()
                .map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(index = index.index_name(), top_k, "searching vectors");
            let result = index.query(request).await.map_err(|e| {
                warn!(error = %e, "vector search failed");
                FacadeError::provider(label, OP, e)
            })?;
            Ok(result.ranked(top_k))
        }
        .instrument(operation_span(label, OP))
        .await
    }

    pub async fn synthesize_speech(&self, text: &str, voice_id: &str) -> Result<AudioData> {
        const OP: Operation = Operation::SynthesizeSpeech;
        require_text("text", text)?;
        require_text("voice_id", voice_id)?;
        let label = self.speech.label();

        async move {
            let speech = self
                .speech
                .get()
                .map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(voice_id, "synthesizing speech");
            let audio = speech.synthesize(text, voice_id).await.map_err(|e| {
                warn!(error = %e, "speech synthesis failed");
                FacadeError::provider(label, OP, e)
            })?;
            if audio.is_empty() {
                return Err(FacadeError::shape(label, OP, "no audio returned"));
            }
            Ok(audio)
        }
        .instrument(operation_span(label, OP))
        .await
    }

    /// Fetches (or reuses from the cache) a hub model's tokenizer, config and
    /// weights and reads them into memory.
    pub async fn load_local_model(&self, model_name: &str) -> Result<LocalModel> {
        const OP: Operation = Operation::LoadLocalModel;
        require_text("model_name", model_name)?;
        let label = self.model_loader.label();

        async move {
            let loader = self
                .model_loader
                .get()
                .map_err(|e| FacadeError::provider(label, OP, e))?;
            debug!(model = model_name, "loading local model");
            loader.load(model_name.trim()).await.map_err(|e| {
                warn!(error = %e, "model load failed");
                FacadeError::provider(label, OP, e)
            })
        }
        .instrument(operation_span(label, OP))
        .await
    }

    /// `"Answer the following question: {question}"` bound to the primary LLM
    /// at temperature 0.7.
    pub fn build_prompt_pipeline(&self) -> Result<LLMChain> {
        let slot = self.llm_handle(LlmProvider::Primary)?;
        let llm = slot
            .get()
            .map_err(|e| FacadeError::provider(slot.label(), Operation::RunPipeline, e))?;
        Ok(LLMChain::new(
            llm,
            PromptTemplate::new(PIPELINE_TEMPLATE),
            PIPELINE_TEMPERATURE,
        ))
    }
}

impl std::fmt::Debug for ServiceFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFacade")
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}
