use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use super::error::FacadeError;
use super::value::Value;
use crate::providers::error::ProviderResult;

/// `owner/name` or `owner/name:version`. Each part is ASCII alphanumerics,
/// `-`, `_` and `.`, so it can be placed in a URL path as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl FromStr for ModelRef {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (path, version) = match s.split_once(':') {
            Some((path, version)) => (path, Some(version)),
            None => (s, None),
        };
        let (owner, name) = path
            .split_once('/')
            .ok_or_else(|| FacadeError::invalid(format!("model reference '{s}' must be owner/name[:version]")))?;

        let valid = |part: &str| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid(owner) || !valid(name) || version.is_some_and(|v| !valid(v)) {
            return Err(FacadeError::invalid(format!(
                "model reference '{s}' must be owner/name[:version]"
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.map(String::from),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait ModelRunner: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, model: &ModelRef, input: Value) -> ProviderResult<Value>;
}
