use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::error::{FacadeError, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// A prompt with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut input_variables: Vec<String> = Vec::new();
        for capture in PLACEHOLDER.captures_iter(&template) {
            let name = &capture[1];
            if !input_variables.iter().any(|v| v == name) {
                input_variables.push(name.to_string());
            }
        }
        Self {
            template,
            input_variables,
        }
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Variables in order of first appearance.
    #[must_use]
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn format(&self, inputs: &HashMap<String, String>) -> Result<String> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|name| !inputs.contains_key(name.as_str()))
        {
            return Err(FacadeError::invalid(format!(
                "missing prompt variable '{missing}'"
            )));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &regex::Captures<'_>| {
            inputs.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}
