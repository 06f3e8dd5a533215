use std::collections::HashMap;
use std::sync::Arc;

use super::ServiceFacade;
use super::lazy::LazyHandle;
use crate::config::credentials::{
    EMBEDDING_INDEX_API_KEY, PRIMARY_LLM_API_KEY, SPEECH_SYNTHESIS_API_KEY,
};
use crate::config::{AppConfig, ConfigError, Credentials, LlmProvider};
use crate::core::embedding::Embedder;
use crate::core::error::Result;
use crate::core::llm::LLM;
use crate::core::local_model::ModelLoader;
use crate::core::runner::ModelRunner;
use crate::core::speech::SpeechSynthesizer;
use crate::core::vector::VectorIndex;
use crate::providers::factory;

/// Assembles a [`ServiceFacade`] from credentials, injected handles, or a mix.
///
/// An injected handle wins over the credential for the same capability. A
/// required capability with neither fails [`build`](Self::build) with
/// [`ConfigError::MissingCredential`].
pub struct FacadeBuilder {
    config: AppConfig,
    credentials: Option<Credentials>,
    llms: HashMap<LlmProvider, Arc<dyn LLM>>,
    embedder: Option<Arc<dyn Embedder>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    runner: Option<Arc<dyn ModelRunner>>,
    model_loader: Option<Arc<dyn ModelLoader>>,
}

impl FacadeBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            credentials: None,
            llms: HashMap::new(),
            embedder: None,
            vector_index: None,
            speech: None,
            runner: None,
            model_loader: None,
        }
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn llm(mut self, provider: LlmProvider, llm: Arc<dyn LLM>) -> Self {
        self.llms.insert(provider, llm);
        self
    }

    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    #[must_use]
    pub fn speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    #[must_use]
    pub fn runner(mut self, runner: Arc<dyn ModelRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    #[must_use]
    pub fn model_loader(mut self, loader: Arc<dyn ModelLoader>) -> Self {
        self.model_loader = Some(loader);
        self
    }

    pub fn build(mut self) -> Result<ServiceFacade> {
        self.config.validate()?;
        let config = Arc::new(self.config);
        let credentials = self.credentials.as_ref();

        let mut llms = HashMap::new();
        for provider in LlmProvider::ALL {
            let label = provider.vendor();
            let handle = if let Some(stub) = self.llms.remove(&provider) {
                LazyHandle::ready(label, stub)
            } else if let Some(key) = credentials.and_then(|c| c.llm(provider)).cloned() {
                let config = Arc::clone(&config);
                LazyHandle::deferred(label, move || {
                    factory::create_llm(provider, key.clone(), &config)
                })
            } else if provider.is_required() {
                return Err(ConfigError::missing(provider.credential_var()).into());
            } else {
                continue;
            };
            llms.insert(provider, handle);
        }

        let embedder = match (self.embedder, credentials) {
            (Some(stub), _) => LazyHandle::ready("openai", stub),
            (None, Some(creds)) => {
                let key = creds.embedding().clone();
                let config = Arc::clone(&config);
                LazyHandle::deferred("openai", move || factory::create_embedder(key.clone(), &config))
            }
            (None, None) => return Err(ConfigError::missing(PRIMARY_LLM_API_KEY).into()),
        };

        let vector_index = match (self.vector_index, credentials) {
            (Some(stub), _) => LazyHandle::ready("pinecone", stub),
            (None, Some(creds)) => {
                let key = creds.index().clone();
                let environment = creds.index_environment().to_string();
                let config = Arc::clone(&config);
                LazyHandle::deferred("pinecone", move || {
                    factory::create_vector_index(key.clone(), &environment, &config)
                })
            }
            (None, None) => return Err(ConfigError::missing(EMBEDDING_INDEX_API_KEY).into()),
        };

        let speech = match (self.speech, credentials) {
            (Some(stub), _) => LazyHandle::ready("elevenlabs", stub),
            (None, Some(creds)) => {
                let key = creds.speech().clone();
                let config = Arc::clone(&config);
                LazyHandle::deferred("elevenlabs", move || factory::create_speech(key.clone(), &config))
            }
            (None, None) => return Err(ConfigError::missing(SPEECH_SYNTHESIS_API_KEY).into()),
        };

        let runner = match (self.runner, credentials.and_then(Credentials::hosted_model)) {
            (Some(stub), _) => Some(LazyHandle::ready("replicate", stub)),
            (None, Some(token)) => {
                let token = token.clone();
                let config = Arc::clone(&config);
                Some(LazyHandle::deferred("replicate", move || {
                    factory::create_runner(token.clone(), &config)
                }))
            }
            (None, None) => None,
        };

        let model_loader = match self.model_loader {
            Some(stub) => LazyHandle::ready("huggingface", stub),
            None => {
                let token = credentials.and_then(Credentials::model_hub).cloned();
                let config = Arc::clone(&config);
                LazyHandle::deferred("huggingface", move || {
                    factory::create_model_loader(token.clone(), &config)
                })
            }
        };

        Ok(ServiceFacade {
            config,
            llms,
            embedder,
            vector_index,
            speech,
            runner,
            model_loader,
        })
    }
}

impl std::fmt::Debug for FacadeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacadeBuilder")
            .field("has_credentials", &self.credentials.is_some())
            .field("stub_llms", &self.llms.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
