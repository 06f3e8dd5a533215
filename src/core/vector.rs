use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::providers::error::ProviderResult;

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_metadata: bool,
    pub namespace: Option<String>,
}

impl QueryRequest {
    #[must_use]
    pub const fn new(vector: Vec<f32>, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            include_metadata: true,
            namespace: None,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub matches: Vec<QueryMatch>,
    #[serde(default)]
    pub namespace: String,
}

impl QueryResult {
    /// Sorts by descending score and keeps at most `top_k` matches.
    #[must_use]
    pub fn ranked(mut self, top_k: usize) -> Self {
        self.matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.matches.truncate(top_k);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;
    fn index_name(&self) -> &str;
    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResult>;
}
