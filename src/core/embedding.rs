use async_trait::async_trait;

use crate::providers::error::ProviderResult;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;
}
