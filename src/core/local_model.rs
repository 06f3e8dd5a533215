use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use crate::providers::error::ProviderResult;

/// Parsed `tokenizer.json` (and `tokenizer_config.json` when published).
#[derive(Debug, Clone)]
pub struct TokenizerHandle {
    pub model_name: String,
    pub path: PathBuf,
    pub spec: serde_json::Value,
    pub config: Option<serde_json::Value>,
}

impl TokenizerHandle {
    /// Size of `model.vocab`, plus any added tokens.
    #[must_use]
    pub fn vocab_size(&self) -> Option<usize> {
        let vocab = self.spec.get("model")?.get("vocab")?;
        let base = vocab
            .as_object()
            .map(serde_json::Map::len)
            .or_else(|| vocab.as_array().map(Vec::len))?;
        let added = self
            .spec
            .get("added_tokens")
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len);
        Some(base + added)
    }

    #[must_use]
    pub fn tokenizer_class(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .get("tokenizer_class")?
            .as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsFormat {
    Safetensors,
    PyTorch,
}

impl WeightsFormat {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Safetensors => "model.safetensors",
            Self::PyTorch => "pytorch_model.bin",
        }
    }
}

/// Model configuration and raw weights, resident in memory.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub model_name: String,
    pub config: serde_json::Value,
    pub weights: Bytes,
    pub weights_path: PathBuf,
    pub format: WeightsFormat,
}

impl ModelHandle {
    #[must_use]
    pub fn architecture(&self) -> Option<&str> {
        self.config
            .get("architectures")?
            .as_array()?
            .first()?
            .as_str()
    }

    #[must_use]
    pub fn model_type(&self) -> Option<&str> {
        self.config.get("model_type")?.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct LocalModel {
    pub tokenizer: TokenizerHandle,
    pub model: ModelHandle,
}

impl LocalModel {
    #[must_use]
    pub fn into_parts(self) -> (TokenizerHandle, ModelHandle) {
        (self.tokenizer, self.model)
    }
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    fn name(&self) -> &str;
    async fn load(&self, model_name: &str) -> ProviderResult<LocalModel>;
}
