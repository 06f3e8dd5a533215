pub mod credentials;
pub mod error;
pub mod models;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use credentials::{CREDENTIAL_SPECS, CredentialSpec, CredentialState, Credentials};
pub use error::{ConfigError, ConfigResult};
pub use models::LlmProvider;

const ENV_PREFIX: &str = "SWITCHBOARD";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/switchboard"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("switchboard"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("switchboard"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/switchboard"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            max_retries: 0,
            user_agent: None,
        }
    }
}

/// Per-provider overrides; unset fields fall back to [`LlmProvider`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub primary: LlmEndpoint,
    pub secondary: LlmEndpoint,
    pub fast_inference: LlmEndpoint,
    pub alternate: LlmEndpoint,
    pub command: LlmEndpoint,
    pub open_model: LlmEndpoint,
}

impl LlmSettings {
    #[must_use]
    pub const fn endpoint(&self, provider: LlmProvider) -> &LlmEndpoint {
        match provider {
            LlmProvider::Primary => &self.primary,
            LlmProvider::Secondary => &self.secondary,
            LlmProvider::FastInference => &self.fast_inference,
            LlmProvider::Alternate => &self.alternate,
            LlmProvider::Command => &self.command,
            LlmProvider::OpenModel => &self.open_model,
        }
    }

    #[must_use]
    pub fn model(&self, provider: LlmProvider) -> &str {
        self.endpoint(provider)
            .model
            .as_deref()
            .unwrap_or_else(|| provider.default_model())
    }

    #[must_use]
    pub fn base_url(&self, provider: LlmProvider) -> &str {
        self.endpoint(provider)
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.default_base_url())
    }

    #[must_use]
    pub fn max_tokens(&self, provider: LlmProvider) -> Option<u32> {
        self.endpoint(provider)
            .max_tokens
            .or_else(|| provider.default_max_tokens())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model: String,
    pub dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub name: String,
    /// Project id used to derive the index host. Looked up from the
    /// controller when neither this nor `host` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Full index URL; bypasses host derivation entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            name: "my-index".to_string(),
            project: None,
            host: None,
            controller_url: None,
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: "eleven_monolingual_v1".to_string(),
            output_format: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedSettings {
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for HostedSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_polls: 120,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    pub revision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            revision: "main".to_string(),
            cache_dir: None,
            base_url: None,
        }
    }
}

impl HubSettings {
    /// Configured cache directory, else `$XDG_CACHE_HOME/switchboard/models`,
    /// else `~/.cache/switchboard/models`.
    #[must_use]
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join("switchboard")
            .join("models")
    }
}

/// Non-secret settings. Credentials are never read from or written to the
/// config file; see [`Credentials`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub speech: SpeechSettings,
    pub hosted: HostedSettings,
    pub hub: HubSettings,
}

/// The settings a [`ServiceFacade`](crate::facade::ServiceFacade) is built from.
pub type FacadeConfig = AppConfig;

impl AppConfig {
    /// Layers the user config file (if any) and `SWITCHBOARD_*` variables
    /// (`__` separates sections, e.g. `SWITCHBOARD_HTTP__TIMEOUT_SECS`).
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(Self::get_config_path().as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if self.index.name.trim().is_empty() {
            return Err(ConfigError::Invalid("index.name must not be empty".to_string()));
        }
        if self.hosted.max_polls == 0 {
            return Err(ConfigError::Invalid(
                "hosted.max_polls must be greater than zero".to_string(),
            ));
        }
        if self.hub.revision.trim().is_empty() {
            return Err(ConfigError::Invalid("hub.revision must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> ConfigResult<PathBuf> {
        let path = Self::get_config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::init_at(&path)?;
        Ok(path)
    }

    pub fn init_at(path: &Path) -> ConfigResult<()> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, include_str!("config.template.toml"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index.name, "my-index");
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.embedding.dimensions, 1536);
        assert_eq!(config.http.max_retries, 0);
    }

    #[test]
    fn test_llm_fallbacks() {
        let mut config = AppConfig::default();
        config.llm.secondary.model = Some("claude-3-haiku-20240307".to_string());

        assert_eq!(config.llm.model(LlmProvider::Primary), "gpt-4");
        assert_eq!(
            config.llm.model(LlmProvider::Secondary),
            "claude-3-haiku-20240307"
        );
        assert_eq!(config.llm.max_tokens(LlmProvider::Secondary), Some(1000));
        assert_eq!(
            config.llm.base_url(LlmProvider::Alternate),
            "https://api.mistral.ai"
        );
    }

    #[test]
    fn test_template_parses() {
        let parsed: AppConfig = toml::from_str(include_str!("config.template.toml")).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.index.name, "my-index");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[index]\nname = \"docs\"\n\n[llm.primary]\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.index.name, "docs");
        assert_eq!(config.llm.model(LlmProvider::Primary), "gpt-4o");
        assert_eq!(config.embedding.dimensions, 1536);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[embedding]\ndimensions = 0\n").unwrap();

        let err = AppConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_init_at_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        AppConfig::init_at(&path).unwrap();
        assert!(path.exists());

        let err = AppConfig::init_at(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = AppConfig::default();
        config.index.namespace = Some("prod".to_string());
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_explicit_cache_dir_wins() {
        let hub = HubSettings {
            cache_dir: Some(PathBuf::from("/tmp/models")),
            ..HubSettings::default()
        };
        assert_eq!(hub.resolved_cache_dir(), PathBuf::from("/tmp/models"));
    }
}
