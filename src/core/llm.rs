use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse};
use crate::providers::error::ProviderResult;

/// A text-generation backend. One implementation per wire protocol; the
/// façade holds each as `Arc<dyn LLM>`.
#[async_trait]
pub trait LLM: Send + Sync {
    /// Vendor name, used in logs and error context.
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse>;
}
