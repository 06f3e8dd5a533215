//! One typed entry point for hosted AI services: text generation across
//! several LLM vendors, embeddings, vector search, speech synthesis, hosted
//! model runs, local model loading and a one-step prompt pipeline.

pub mod cli;
pub mod config;
pub mod core;
pub mod facade;
pub mod logging;
pub mod providers;

pub use config::{AppConfig, ConfigError, Credentials, FacadeConfig, LlmProvider};
pub use core::{FacadeError, Operation, Result, Value};
pub use facade::{FacadeBuilder, ServiceFacade};
