use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::credentials::HF_TOKEN;
use crate::core::local_model::{LocalModel, ModelHandle, ModelLoader, TokenizerHandle, WeightsFormat};
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl};

const DEFAULT_BASE_URL: &str = "https://huggingface.co";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
const WEIGHTS_PREFERENCE: [WeightsFormat; 2] = [WeightsFormat::Safetensors, WeightsFormat::PyTorch];

/// Fetches model artifacts from the Hugging Face Hub into a local cache and
/// reads them into memory.
///
/// Cache layout: `{cache_dir}/{owner--name}/{revision}/{file}`. Files already
/// cached are never downloaded again, and a model whose required files are all
/// cached loads without touching the network.
#[derive(Clone)]
pub struct ModelHub {
    http: HttpClient,
    auth: AuthStrategy,
    base_url: BaseUrl,
    revision: String,
    cache_dir: PathBuf,
}

impl std::fmt::Debug for ModelHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHub")
            .field("base_url", &self.base_url)
            .field("revision", &self.revision)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl ModelHub {
    pub fn new(cache_dir: impl Into<PathBuf>, token: Option<ApiKey>) -> ProviderResult<Self> {
        Self::with_http_config(cache_dir, token, HttpConfig::default())
    }

    pub fn with_http_config(
        cache_dir: impl Into<PathBuf>,
        token: Option<ApiKey>,
        http_config: HttpConfig,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: token.map_or(AuthStrategy::None, AuthStrategy::bearer),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            revision: "main".to_string(),
            cache_dir: cache_dir.into(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Accepts `name` or `owner/name` made of ASCII alphanumerics, `-`, `_` and `.`.
    fn validate_model_name(model_name: &str) -> ProviderResult<()> {
        let valid_part = |part: &str| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        let parts: Vec<&str> = model_name.split('/').collect();
        if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
            return Err(ProviderError::InvalidRequest(format!(
                "invalid model name '{model_name}'"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn cache_path(&self, model_name: &str, file: &str) -> PathBuf {
        self.cache_dir
            .join(model_name.replace('/', "--"))
            .join(&self.revision)
            .join(file)
    }

    fn file_url(&self, model_name: &str, file: &str) -> String {
        self.base_url
            .join(&format!("/{model_name}/resolve/{}/{file}", self.revision))
    }

    async fn cached(&self, model_name: &str, file: &str) -> ProviderResult<Option<PathBuf>> {
        let path = self.cache_path(model_name, file);
        Ok(tokio::fs::try_exists(&path).await?.then_some(path))
    }

    async fn cached_weights(&self, model_name: &str) -> ProviderResult<Option<(PathBuf, WeightsFormat)>> {
        for format in WEIGHTS_PREFERENCE {
            if let Some(path) = self.cached(model_name, format.file_name()).await? {
                return Ok(Some((path, format)));
            }
        }
        Ok(None)
    }

    /// Whether config, tokenizer and some weights file are all on disk.
    async fn is_fully_cached(&self, model_name: &str) -> ProviderResult<bool> {
        Ok(self.cached(model_name, CONFIG_FILE).await?.is_some()
            && self.cached(model_name, TOKENIZER_FILE).await?.is_some()
            && self.cached_weights(model_name).await?.is_some())
    }

    /// Cached path of `file`, downloading it first if needed. `Ok(None)`
    /// means the hub does not publish that file for this model.
    async fn fetch(&self, model_name: &str, file: &str) -> ProviderResult<Option<PathBuf>> {
        if let Some(path) = self.cached(model_name, file).await? {
            debug!(model = model_name, file, "using cached artifact");
            return Ok(Some(path));
        }
        let path = self.cache_path(model_name, file);

        let url = self.file_url(model_name, file);
        debug!(model = model_name, file, "downloading artifact");
        let request = self.http.get(&url, &self.auth);
        let response = match self.http.send(request, HF_TOKEN).await {
            Ok(response) => response,
            Err(ProviderError::ModelNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let parent = path
            .parent()
            .ok_or_else(|| ProviderError::Configuration(format!("bad cache path {}", path.display())))?;
        tokio::fs::create_dir_all(parent).await?;

        let partial = parent.join(format!(".{file}.{}.part", Uuid::new_v4()));
        if let Err(e) = Self::write_body(response, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &path).await?;

        info!(model = model_name, file, path = %path.display(), "cached artifact");
        Ok(Some(path))
    }

    async fn write_body(response: reqwest::Response, dest: &Path) -> ProviderResult<()> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| ProviderError::Connection(format!("download interrupted: {e}")))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn require(&self, model_name: &str, file: &str) -> ProviderResult<PathBuf> {
        self.fetch(model_name, file)
            .await?
            .ok_or_else(|| ProviderError::ModelNotFound(format!("{model_name} has no {file}")))
    }

    async fn read_json(path: &Path) -> ProviderResult<serde_json::Value> {
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw)
            .map_err(|e| ProviderError::ParseError(format!("{}: {e}", path.display())))
    }

    async fn fetch_weights(&self, model_name: &str) -> ProviderResult<(PathBuf, WeightsFormat)> {
        if let Some(hit) = self.cached_weights(model_name).await? {
            debug!(model = model_name, format = ?hit.1, "using cached weights");
            return Ok(hit);
        }
        for format in WEIGHTS_PREFERENCE {
            if let Some(path) = self.fetch(model_name, format.file_name()).await? {
                return Ok((path, format));
            }
        }
        Err(ProviderError::ModelNotFound(format!(
            "{model_name} publishes neither {} nor {}",
            WeightsFormat::Safetensors.file_name(),
            WeightsFormat::PyTorch.file_name()
        )))
    }
}

#[async_trait]
impl ModelLoader for ModelHub {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn load(&self, model_name: &str) -> ProviderResult<LocalModel> {
        Self::validate_model_name(model_name)?;

        // Optional files are only looked up on the hub while something
        // required is still missing.
        let offline = self.is_fully_cached(model_name).await?;
        let config_path = self.require(model_name, CONFIG_FILE).await?;
        let tokenizer_path = self.require(model_name, TOKENIZER_FILE).await?;
        let tokenizer_config_path = if offline {
            self.cached(model_name, TOKENIZER_CONFIG_FILE).await?
        } else {
            self.fetch(model_name, TOKENIZER_CONFIG_FILE).await?
        };
        let tokenizer_config = match tokenizer_config_path {
            Some(path) => Some(Self::read_json(&path).await?),
            None => None,
        };
        let (weights_path, format) = self.fetch_weights(model_name).await?;

        let tokenizer = TokenizerHandle {
            model_name: model_name.to_string(),
            spec: Self::read_json(&tokenizer_path).await?,
            path: tokenizer_path,
            config: tokenizer_config,
        };

        let weights = Bytes::from(tokio::fs::read(&weights_path).await?);
        debug!(model = model_name, bytes = weights.len(), ?format, "loaded weights");
        let model = ModelHandle {
            model_name: model_name.to_string(),
            config: Self::read_json(&config_path).await?,
            weights,
            weights_path,
            format,
        };

        Ok(LocalModel { tokenizer, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(dir: &Path) -> ModelHub {
        ModelHub::new(dir, None).expect("create hub")
    }

    #[test]
    fn test_cache_path_layout() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub(dir.path()).with_revision("v1.0");
        assert_eq!(
            hub.cache_path("openai-community/gpt2", "config.json"),
            dir.path().join("openai-community--gpt2").join("v1.0").join("config.json")
        );
    }

    #[test]
    fn test_file_url() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            hub(dir.path()).file_url("gpt2", "tokenizer.json"),
            "https://huggingface.co/gpt2/resolve/main/tokenizer.json"
        );
    }

    #[test]
    fn test_validate_model_name() {
        assert!(ModelHub::validate_model_name("gpt2").is_ok());
        assert!(ModelHub::validate_model_name("openai-community/gpt2").is_ok());
        assert!(ModelHub::validate_model_name("TinyLlama/TinyLlama-1.1B-Chat-v1.0").is_ok());
        for bad in ["", "a/b/c", "../etc", "org/..", "/gpt2", "gpt 2"] {
            assert!(ModelHub::validate_model_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_cached_files_skip_network() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub(dir.path()).with_base_url("http://127.0.0.1:9");
        let model_dir = dir.path().join("tiny").join("main");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("config.json"), r#"{"model_type": "gpt2"}"#).unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), r#"{"model": {"vocab": {"a": 0}}}"#).unwrap();
        std::fs::write(model_dir.join("tokenizer_config.json"), "{}").unwrap();
        std::fs::write(model_dir.join("model.safetensors"), b"weights").unwrap();

        let loaded = hub.load("tiny").await.expect("load from cache");
        assert_eq!(loaded.model.model_type(), Some("gpt2"));
        assert_eq!(loaded.model.format, WeightsFormat::Safetensors);
        assert_eq!(&loaded.model.weights[..], b"weights");
        assert_eq!(loaded.tokenizer.vocab_size(), Some(1));
    }

    #[tokio::test]
    async fn test_is_fully_cached_accepts_either_weights_format() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub(dir.path());
        let model_dir = dir.path().join("org--tiny").join("main");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("config.json"), "{}").unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), "{}").unwrap();
        assert!(!hub.is_fully_cached("org/tiny").await.unwrap());

        std::fs::write(model_dir.join("pytorch_model.bin"), b"pt").unwrap();
        assert!(hub.is_fully_cached("org/tiny").await.unwrap());
    }
}
