mod types;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::credentials::HOSTED_MODEL_API_TOKEN;
use crate::core::runner::{ModelRef, ModelRunner};
use crate::core::value::Value;
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl};

use types::{Prediction, PredictionRequest, PredictionStatus};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

#[derive(Clone)]
pub struct ReplicateRunner {
    http: HttpClient,
    auth: AuthStrategy,
    base_url: BaseUrl,
    poll_interval: Duration,
    max_polls: u32,
}

impl std::fmt::Debug for ReplicateRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicateRunner")
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .field("max_polls", &self.max_polls)
            .finish_non_exhaustive()
    }
}

impl ReplicateRunner {
    pub fn new(api_token: ApiKey) -> ProviderResult<Self> {
        Self::with_http_config(api_token, HttpConfig::default())
    }

    pub fn with_http_config(api_token: ApiKey, http_config: HttpConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::bearer(api_token),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            poll_interval: Duration::from_secs(1),
            max_polls: 120,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    fn create_url(&self, model: &ModelRef) -> String {
        match model.version {
            Some(_) => self.base_url.join("/v1/predictions"),
            None => self
                .base_url
                .join(&format!("/v1/models/{}/{}/predictions", model.owner, model.name)),
        }
    }

    async fn fetch(&self, id: &str) -> ProviderResult<Prediction> {
        let url = self.base_url.join(&format!("/v1/predictions/{id}"));
        let request = self.http.get(&url, &self.auth);
        self.http.send_json(request, HOSTED_MODEL_API_TOKEN).await
    }

    /// Total time spent polling before giving up, saturating on overflow.
    fn poll_budget(&self) -> Duration {
        self.poll_interval
            .checked_mul(self.max_polls)
            .unwrap_or(Duration::MAX)
    }

    async fn wait(&self, mut prediction: Prediction) -> ProviderResult<Prediction> {
        let mut polls = 0;
        while !prediction.status.is_terminal() {
            if polls >= self.max_polls {
                warn!(id = %prediction.id, polls, "prediction did not finish in time");
                return Err(ProviderError::Timeout(self.poll_budget()));
            }
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            prediction = self.fetch(&prediction.id).await?;
            debug!(id = %prediction.id, status = ?prediction.status, polls, "polled prediction");
        }
        Ok(prediction)
    }
}

#[async_trait]
impl ModelRunner for ReplicateRunner {
    fn name(&self) -> &'static str {
        "replicate"
    }

    async fn run(&self, model: &ModelRef, input: Value) -> ProviderResult<Value> {
        let url = self.create_url(model);
        debug!(model = %model, "creating prediction");

        let body = PredictionRequest {
            version: model.version.as_deref(),
            input: &input,
        };
        let request = self
            .http
            .post_json(&url, &self.auth, &body)?
            .header("Prefer", "wait");
        let created: Prediction = self.http.send_json(request, HOSTED_MODEL_API_TOKEN).await?;

        let prediction = self.wait(created).await?;
        match prediction.status {
            PredictionStatus::Succeeded => Ok(prediction.output),
            _ => Err(ProviderError::InvalidRequest(prediction.error_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ReplicateRunner {
        ReplicateRunner::new(ApiKey::new("r8_secret")).expect("create runner")
    }

    #[test]
    fn test_create_url_with_version() {
        let model: ModelRef = "stability-ai/sdxl:39ed52f2".parse().unwrap();
        assert_eq!(
            runner().create_url(&model),
            "https://api.replicate.com/v1/predictions"
        );
    }

    #[test]
    fn test_create_url_official_model() {
        let model: ModelRef = "meta/meta-llama-3-8b-instruct".parse().unwrap();
        assert_eq!(
            runner().create_url(&model),
            "https://api.replicate.com/v1/models/meta/meta-llama-3-8b-instruct/predictions"
        );
    }

    #[test]
    fn test_poll_budget_saturates() {
        let patient = runner().with_polling(Duration::from_secs(u64::MAX), u32::MAX);
        assert_eq!(patient.poll_budget(), Duration::MAX);
        let quick = runner().with_polling(Duration::from_millis(5), 4);
        assert_eq!(quick.poll_budget(), Duration::from_millis(20));
    }

    #[test]
    fn test_debug_hides_token() {
        assert!(!format!("{:?}", runner()).contains("r8_secret"));
    }
}
