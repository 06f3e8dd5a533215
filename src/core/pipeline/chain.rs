use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use super::template::PromptTemplate;
use crate::core::error::{FacadeError, Operation, Result};
use crate::core::llm::LLM;
use crate::core::types::CompletionRequest;

/// A prompt template bound to an LLM at a fixed temperature.
#[derive(Clone)]
pub struct LLMChain {
    llm: Arc<dyn LLM>,
    prompt: PromptTemplate,
    temperature: f32,
}

impl std::fmt::Debug for LLMChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMChain")
            .field("llm", &self.llm.name())
            .field("model", &self.llm.model())
            .field("prompt", &self.prompt)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LLMChain {
    #[must_use]
    pub fn new(llm: Arc<dyn LLM>, prompt: PromptTemplate, temperature: f32) -> Self {
        Self {
            llm,
            prompt,
            temperature,
        }
    }

    #[must_use]
    pub const fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    pub async fn run(&self, inputs: &HashMap<String, String>) -> Result<String> {
        let text = self.prompt.format(inputs)?;
        let provider = self.llm.name().to_string();
        let span = info_span!(
            "facade",
            provider = %provider,
            operation = %Operation::RunPipeline,
            request_id = %Uuid::new_v4(),
        );

        async move {
            debug!(model = self.llm.model(), chars = text.len(), "running prompt pipeline");
            let request = CompletionRequest::prompt(text).with_temperature(self.temperature);
            self.llm
                .complete(request)
                .await
                .map_err(|e| FacadeError::provider(&provider, Operation::RunPipeline, e))?
                .into_leading_text(&provider, Operation::RunPipeline)
        }
        .instrument(span)
        .await
    }

    /// Runs a template with a single variable.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let [variable] = self.prompt.input_variables() else {
            return Err(FacadeError::invalid(format!(
                "ask needs a single-variable template, found {} variables",
                self.prompt.input_variables().len()
            )));
        };
        if question.trim().is_empty() {
            return Err(FacadeError::invalid("question must not be empty"));
        }
        let inputs = HashMap::from([(variable.clone(), question.to_string())]);
        self.run(&inputs).await
    }
}
