pub mod embedding;
pub mod error;
pub mod llm;
pub mod local_model;
pub mod pipeline;
pub mod runner;
pub mod speech;
pub mod types;
pub mod value;
pub mod vector;

pub use embedding::Embedder;
pub use error::{FacadeError, Operation, Result};
pub use llm::LLM;
pub use local_model::{LocalModel, ModelHandle, ModelLoader, TokenizerHandle, WeightsFormat};
pub use pipeline::{LLMChain, PromptTemplate};
pub use runner::{ModelRef, ModelRunner};
pub use speech::{AudioData, SpeechSynthesizer};
pub use types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, Usage};
pub use value::Value;
pub use vector::{QueryMatch, QueryRequest, QueryResult, VectorIndex, DEFAULT_TOP_K};
