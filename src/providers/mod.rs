pub mod error;
pub mod factory;
pub mod http;
pub mod types;

pub mod anthropic;
pub mod cohere;
pub mod elevenlabs;
pub mod huggingface;
pub mod mock;
pub mod openai;
pub mod openai_compat;
pub mod pinecone;
pub mod replicate;

pub use error::{ProviderError, ProviderResult};
pub use types::ApiKey;

pub use anthropic::AnthropicProvider;
pub use cohere::CohereProvider;
pub use elevenlabs::ElevenLabsProvider;
pub use huggingface::ModelHub;
pub use openai::OpenAIEmbedder;
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
pub use pinecone::PineconeIndex;
pub use replicate::ReplicateRunner;
