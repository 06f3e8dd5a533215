use async_trait::async_trait;
use bytes::Bytes;

use crate::providers::error::ProviderResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub bytes: Bytes,
    pub content_type: String,
}

impl AudioData {
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the content type.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "audio/pcm" | "audio/basic" => "pcm",
            _ => "mp3",
        }
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;
    async fn synthesize(&self, text: &str, voice_id: &str) -> ProviderResult<AudioData>;
}
