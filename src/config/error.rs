use std::io;
use std::path::PathBuf;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("Malformed credential in {var}: {reason}")]
    MalformedCredential { var: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Config file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl ConfigError {
    #[must_use]
    pub fn missing(var: impl Into<String>) -> Self {
        Self::MissingCredential { var: var.into() }
    }
}
