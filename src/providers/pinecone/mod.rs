mod types;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::credentials::EMBEDDING_INDEX_API_KEY;
use crate::core::vector::{QueryMatch, QueryRequest, QueryResult, VectorIndex};
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl};

/// Query client for one Pinecone index.
///
/// The data-plane host is `{index}-{project}.svc.{environment}.pinecone.io`.
/// When no project id is configured it is fetched once from the
/// environment's controller (`/actions/whoami`) and reused.
pub struct PineconeIndex {
    http: HttpClient,
    auth: AuthStrategy,
    index_name: String,
    environment: String,
    project: OnceCell<String>,
    host: Option<BaseUrl>,
    controller_url: BaseUrl,
}

impl std::fmt::Debug for PineconeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeIndex")
            .field("index_name", &self.index_name)
            .field("environment", &self.environment)
            .field("project", &self.project.get())
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl PineconeIndex {
    pub fn new(
        api_key: ApiKey,
        environment: impl Into<String>,
        index_name: impl Into<String>,
    ) -> ProviderResult<Self> {
        Self::with_http_config(api_key, environment, index_name, HttpConfig::default())
    }

    pub fn with_http_config(
        api_key: ApiKey,
        environment: impl Into<String>,
        index_name: impl Into<String>,
        http_config: HttpConfig,
    ) -> ProviderResult<Self> {
        let environment = environment.into();
        let index_name = index_name.into();
        if environment.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Pinecone environment must not be empty".to_string(),
            ));
        }
        if index_name.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Pinecone index name must not be empty".to_string(),
            ));
        }

        let controller_url = BaseUrl::new(format!("https://controller.{environment}.pinecone.io"));
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::pinecone(api_key),
            index_name,
            environment,
            project: OnceCell::new(),
            host: None,
            controller_url,
        })
    }

    /// Skips the controller lookup.
    #[must_use]
    pub fn with_project(self, project: impl Into<String>) -> Self {
        Self {
            project: OnceCell::new_with(Some(project.into())),
            ..self
        }
    }

    /// Sends queries to `host` instead of the derived data-plane host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<BaseUrl>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_controller_url(mut self, url: impl Into<BaseUrl>) -> Self {
        self.controller_url = url.into();
        self
    }

    async fn project(&self) -> ProviderResult<&str> {
        self.project
            .get_or_try_init(|| async {
                let url = self.controller_url.join("/actions/whoami");
                debug!(environment = %self.environment, "resolving Pinecone project id");
                let request = self.http.get(&url, &self.auth);
                let whoami: types::WhoAmI =
                    self.http.send_json(request, EMBEDDING_INDEX_API_KEY).await?;
                Ok::<_, ProviderError>(whoami.project_name)
            })
            .await
            .map(String::as_str)
    }

    async fn query_url(&self) -> ProviderResult<String> {
        if let Some(host) = &self.host {
            return Ok(host.join("/query"));
        }
        let project = self.project().await?;
        Ok(format!(
            "https://{}-{}.svc.{}.pinecone.io/query",
            self.index_name, project, self.environment
        ))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &'static str {
        "pinecone"
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn query(&self, request: QueryRequest) -> ProviderResult<QueryResult> {
        let url = self.query_url().await?;
        debug!(
            index = %self.index_name,
            top_k = request.top_k,
            dimensions = request.vector.len(),
            "querying vector index"
        );

        let body = types::QueryBody {
            vector: &request.vector,
            top_k: request.top_k,
            include_metadata: request.include_metadata,
            include_values: false,
            namespace: request.namespace.as_deref(),
        };
        let http_request = self.http.post_json(&url, &self.auth, &body)?;
        let response: types::QueryResponse =
            self.http.send_json(http_request, EMBEDDING_INDEX_API_KEY).await?;

        let matches = response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect();

        Ok(QueryResult {
            matches,
            namespace: response.namespace,
        }
        .ranked(request.top_k))
    }
}
