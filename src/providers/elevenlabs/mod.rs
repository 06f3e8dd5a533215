use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::credentials::SPEECH_SYNTHESIS_API_KEY;
use crate::core::speech::{AudioData, SpeechSynthesizer};
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_MODEL: &str = "eleven_monolingual_v1";
const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct SynthesisPayload<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Clone)]
pub struct ElevenLabsProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
    output_format: Option<String>,
}

impl std::fmt::Debug for ElevenLabsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsProvider {
    pub fn new(api_key: ApiKey) -> ProviderResult<Self> {
        Self::with_http_config(api_key, HttpConfig::default())
    }

    pub fn with_http_config(api_key: ApiKey, http_config: HttpConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::elevenlabs(api_key),
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            output_format: None,
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

    /// e.g. `mp3_44100_128` or `pcm_24000`. Unset leaves the account default.
    #[must_use]
    pub fn with_output_format(mut self, format: Option<String>) -> Self {
        self.output_format = format;
        self
    }

    fn endpoint(&self, voice_id: &str) -> ProviderResult<String> {
        if voice_id.is_empty() || !voice_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ProviderError::InvalidRequest(format!(
                "invalid voice id '{voice_id}'"
            )));
        }
        let mut url = self.base_url.join(&format!("/v1/text-to-speech/{voice_id}"));
        if let Some(format) = &self.output_format {
            url.push_str("?output_format=");
            url.push_str(format);
        }
        Ok(url)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> ProviderResult<AudioData> {
        let url = self.endpoint(voice_id)?;
        debug!(voice_id, model = %self.model, chars = text.len(), "synthesizing speech");

        let payload = SynthesisPayload {
            text,
            model_id: self.model.as_str(),
        };
        let request = self
            .http
            .post_json(&url, &self.auth, &payload)?
            .header("accept", DEFAULT_CONTENT_TYPE);
        let response = self.http.send(request, SPEECH_SYNTHESIS_API_KEY).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| DEFAULT_CONTENT_TYPE.to_string(), str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to read audio body: {e}")))?;

        if bytes.is_empty() {
            return Err(ProviderError::empty("response contained no audio"));
        }

        Ok(AudioData::new(bytes, content_type))
    }
}
