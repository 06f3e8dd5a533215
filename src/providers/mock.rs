//! In-memory stand-ins for every capability trait. Deterministic, offline,
//! and shareable across tasks; used by the façade tests and available to
//! downstream crates for theirs.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::embedding::Embedder;
use crate::core::llm::LLM;
use crate::core::local_model::{LocalModel, ModelHandle, ModelLoader, TokenizerHandle, WeightsFormat};
use crate::core::runner::{ModelRef, ModelRunner};
use crate::core::speech::{AudioData, SpeechSynthesizer};
use crate::core::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, Usage,
};
use crate::core::value::Value;
use crate::core::vector::{QueryMatch, QueryRequest, QueryResult, VectorIndex};
use crate::providers::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Content {
        content: Vec<ContentBlock>,
        stop_reason: StopReason,
        usage: Usage,
    },
    /// Answers with `ProviderError::Server { status, message }`.
    Failure { status: u16, message: String },
}

impl MockResponse {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Content {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: Usage::new(10, 5),
        }
    }

    /// A response with no content blocks at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Content {
            content: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::new(10, 0),
        }
    }

    #[must_use]
    pub const fn multi(content: Vec<ContentBlock>, stop_reason: StopReason) -> Self {
        Self::Content {
            content,
            stop_reason,
            usage: Usage::new(10, 5),
        }
    }

    #[must_use]
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
        }
    }
}

/// Replays queued responses in order, then the fallback (if any).
#[derive(Clone)]
pub struct MockLLM {
    name: String,
    model: String,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    fallback: Option<MockResponse>,
    request_history: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLLM {
    #[must_use]
    pub fn new() -> Self {
        Self::named("mock")
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: "mock-model".to_string(),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            fallback: None,
            request_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Served whenever the queue is empty.
    #[must_use]
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    #[must_use]
    pub fn with_default_response(self) -> Self {
        self.with_fallback(MockResponse::text("Mock response"))
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<CompletionRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    pub fn clear_history(&self) {
        self.request_history.lock().clear();
    }

    fn next_response(&self) -> ProviderResult<MockResponse> {
        self.responses
            .lock()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| ProviderError::Configuration("MockLLM: no responses queued".to_string()))
    }
}

impl Default for MockLLM {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLM for MockLLM {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        self.request_history.lock().push(request);

        match self.next_response()? {
            MockResponse::Content {
                content,
                stop_reason,
                usage,
            } => Ok(CompletionResponse::new(
                Message::new(Role::Assistant, content),
                stop_reason,
                usage,
            )),
            MockResponse::Failure { status, message } => Err(ProviderError::server(status, message)),
        }
    }
}

/// FNV-1a; stable across runs and platforms.
fn fingerprint(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Maps each text to a fixed unit vector derived from its bytes.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut state = fingerprint(text) | 1;
        let mut vector: Vec<f32> = (0..self.dimensions)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                #[allow(clippy::cast_precision_loss)]
                let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
                unit.mul_add(2.0, -1.0)
            })
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &'static str {
        "mock-embedding"
    }

    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector_for(text))
    }
}

/// Brute-force cosine search over an in-memory record list.
///
/// Matches come back in insertion order and untruncated, like a provider
/// that ignores `top_k`.
#[derive(Debug, Clone, Default)]
pub struct MockVectorIndex {
    records: Arc<Mutex<Vec<(String, Vec<f32>, Option<Value>)>>>,
    queries: Arc<AtomicUsize>,
}

impl MockVectorIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(self, id: impl Into<String>, vector: Vec<f32>, metadata: Option<Value>) -> Self {
        self.records.lock().push((id.into(), vector, metadata));
        self
    }

    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

#[async_trait]
impl VectorIndex for MockVectorIndex {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn index_name(&self) -> &'static str {
        "mock-index"
    }

    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResult> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let matches = self
            .records
            .lock()
            .iter()
            .map(|(id, vector, metadata)| QueryMatch {
                id: id.clone(),
                score: Self::cosine(&request.vector, vector),
                metadata: if request.include_metadata {
                    metadata.clone()
                } else {
                    None
                },
            })
            .collect();

        Ok(QueryResult {
            matches,
            namespace: request.namespace.unwrap_or_default(),
        })
    }
}

/// Returns the same audio payload for every request.
#[derive(Debug, Clone)]
pub struct MockSpeech {
    audio: Bytes,
    calls: Arc<AtomicUsize>,
}

impl MockSpeech {
    #[must_use]
    pub fn new(audio: impl Into<Bytes>) -> Self {
        Self {
            audio: audio.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSpeech {
    fn default() -> Self {
        Self::new(Bytes::from_static(b"ID3\x04\x00mock-audio"))
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn synthesize(&self, _text: &str, _voice_id: &str) -> ProviderResult<AudioData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AudioData::new(self.audio.clone(), "audio/mpeg"))
    }
}

/// Echoes `{"model": <ref>, "input": <input>}` unless a fixed output is set.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    output: Option<Value>,
    runs: Arc<AtomicUsize>,
}

impl MockRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelRunner for MockRunner {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn run(&self, model: &ModelRef, input: Value) -> ProviderResult<Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone().unwrap_or_else(|| {
            Value::map([("model", Value::from(model.to_string())), ("input", input)])
        }))
    }
}

/// Builds a tiny in-memory model for any name.
#[derive(Debug, Clone, Default)]
pub struct MockModelLoader {
    loads: Arc<AtomicUsize>,
}

impl MockModelLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for MockModelLoader {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn load(&self, model_name: &str) -> ProviderResult<LocalModel> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let tokenizer = TokenizerHandle {
            model_name: model_name.to_string(),
            path: PathBuf::from("tokenizer.json"),
            spec: serde_json::json!({"model": {"vocab": {"<unk>": 0, "hello": 1}}}),
            config: None,
        };
        let model = ModelHandle {
            model_name: model_name.to_string(),
            config: serde_json::json!({"architectures": ["MockForCausalLM"], "model_type": "mock"}),
            weights: Bytes::from_static(&[0u8; 16]),
            weights_path: PathBuf::from(WeightsFormat::Safetensors.file_name()),
            format: WeightsFormat::Safetensors,
        };
        Ok(LocalModel { tokenizer, model })
    }
}
