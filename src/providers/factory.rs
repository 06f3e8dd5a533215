//! Builds concrete adapters from settings plus an already-validated credential.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, LlmProvider};
use crate::core::embedding::Embedder;
use crate::core::llm::LLM;
use crate::core::local_model::ModelLoader;
use crate::core::runner::ModelRunner;
use crate::core::speech::SpeechSynthesizer;
use crate::core::vector::VectorIndex;

use super::anthropic::AnthropicProvider;
use super::cohere::CohereProvider;
use super::elevenlabs::ElevenLabsProvider;
use super::error::{ProviderError, ProviderResult};
use super::http::HttpConfig;
use super::huggingface::ModelHub;
use super::openai::OpenAIEmbedder;
use super::openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
use super::pinecone::PineconeIndex;
use super::replicate::ReplicateRunner;
use super::types::ApiKey;

pub fn create_llm(
    provider: LlmProvider,
    api_key: ApiKey,
    config: &AppConfig,
) -> ProviderResult<Arc<dyn LLM>> {
    let http = HttpConfig::from(&config.http);
    let model = config.llm.model(provider);
    let base_url = config.llm.base_url(provider).to_string();
    let max_tokens = config.llm.max_tokens(provider);

    match provider {
        LlmProvider::Secondary => {
            let mut llm = AnthropicProvider::with_http_config(api_key, http)?
                .with_model(model)
                .with_base_url(base_url);
            if let Some(max_tokens) = max_tokens {
                llm = llm.with_max_tokens(max_tokens);
            }
            Ok(Arc::new(llm))
        }
        LlmProvider::Command => {
            let mut llm = CohereProvider::with_http_config(api_key, http)?
                .with_model(model)
                .with_base_url(base_url);
            if let Some(max_tokens) = max_tokens {
                llm = llm.with_max_tokens(max_tokens);
            }
            Ok(Arc::new(llm))
        }
        LlmProvider::Primary
        | LlmProvider::FastInference
        | LlmProvider::Alternate
        | LlmProvider::OpenModel => {
            let compat = OpenAICompatConfig::for_provider(provider, api_key).ok_or_else(|| {
                ProviderError::Configuration(format!("{provider} is not OpenAI-compatible"))
            })?;
            let llm = OpenAICompatProvider::with_http_config(compat, http)?
                .with_model(model)
                .with_base_url(base_url)
                .with_max_tokens(max_tokens);
            Ok(Arc::new(llm))
        }
    }
}

pub fn create_embedder(api_key: ApiKey, config: &AppConfig) -> ProviderResult<Arc<dyn Embedder>> {
    let mut embedder = OpenAIEmbedder::with_http_config(api_key, HttpConfig::from(&config.http))?
        .with_model(config.embedding.model.as_str());
    if let Some(base_url) = &config.embedding.base_url {
        embedder = embedder.with_base_url(base_url);
    }
    Ok(Arc::new(embedder))
}

pub fn create_vector_index(
    api_key: ApiKey,
    environment: &str,
    config: &AppConfig,
) -> ProviderResult<Arc<dyn VectorIndex>> {
    let settings = &config.index;
    let mut index = PineconeIndex::with_http_config(
        api_key,
        environment,
        settings.name.as_str(),
        HttpConfig::from(&config.http),
    )?;
    if let Some(project) = &settings.project {
        index = index.with_project(project.as_str());
    }
    if let Some(host) = &settings.host {
        index = index.with_host(host);
    }
    if let Some(controller) = &settings.controller_url {
        index = index.with_controller_url(controller);
    }
    Ok(Arc::new(index))
}

pub fn create_speech(
    api_key: ApiKey,
    config: &AppConfig,
) -> ProviderResult<Arc<dyn SpeechSynthesizer>> {
    let settings = &config.speech;
    let mut speech = ElevenLabsProvider::with_http_config(api_key, HttpConfig::from(&config.http))?
        .with_model(settings.model.as_str())
        .with_output_format(settings.output_format.clone());
    if let Some(base_url) = &settings.base_url {
        speech = speech.with_base_url(base_url);
    }
    Ok(Arc::new(speech))
}

pub fn create_runner(api_token: ApiKey, config: &AppConfig) -> ProviderResult<Arc<dyn ModelRunner>> {
    let settings = &config.hosted;
    let mut runner = ReplicateRunner::with_http_config(api_token, HttpConfig::from(&config.http))?
        .with_polling(
            Duration::from_millis(settings.poll_interval_ms),
            settings.max_polls,
        );
    if let Some(base_url) = &settings.base_url {
        runner = runner.with_base_url(base_url);
    }
    Ok(Arc::new(runner))
}

pub fn create_model_loader(
    token: Option<ApiKey>,
    config: &AppConfig,
) -> ProviderResult<Arc<dyn ModelLoader>> {
    let settings = &config.hub;
    let mut hub = ModelHub::with_http_config(
        settings.resolved_cache_dir(),
        token,
        HttpConfig::from(&config.http),
    )?
    .with_revision(settings.revision.as_str());
    if let Some(base_url) = &settings.base_url {
        hub = hub.with_base_url(base_url);
    }
    Ok(Arc::new(hub))
}
