use crate::providers::types::ApiKey;
use reqwest_middleware::RequestBuilder;

#[derive(Clone)]
pub enum AuthStrategy {
    Bearer(ApiKey),
    ApiKeyHeader {
        header_name: &'static str,
        key: ApiKey,
    },
    None,
}

impl AuthStrategy {
    #[must_use]
    pub const fn bearer(key: ApiKey) -> Self {
        Self::Bearer(key)
    }

    #[must_use]
    pub const fn anthropic(key: ApiKey) -> Self {
        Self::ApiKeyHeader {
            header_name: "x-api-key",
            key,
        }
    }

    #[must_use]
    pub const fn elevenlabs(key: ApiKey) -> Self {
        Self::ApiKeyHeader {
            header_name: "xi-api-key",
            key,
        }
    }

    #[must_use]
    pub const fn pinecone(key: ApiKey) -> Self {
        Self::ApiKeyHeader {
            header_name: "Api-Key",
            key,
        }
    }

    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(key) => {
                request.header("Authorization", format!("Bearer {}", key.as_str()))
            }
            Self::ApiKeyHeader { header_name, key } => request.header(*header_name, key.as_str()),
            Self::None => request,
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(key) => f.debug_tuple("Bearer").field(key).finish(),
            Self::ApiKeyHeader { header_name, key } => f
                .debug_struct("ApiKeyHeader")
                .field("header_name", header_name)
                .field("key", key)
                .finish(),
            Self::None => write!(f, "None"),
        }
    }
}
