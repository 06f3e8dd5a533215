use serde::{Deserialize, Serialize};

use super::error::{FacadeError, Operation, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    /// A block kind this crate does not interpret (tool calls, thinking, ...).
    Unsupported { kind: String },
}

impl ContentBlock {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text { text } = self {
            Some(text)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    #[must_use]
    pub const fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }

    /// Concatenated text of every text block.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    Other,
}

impl StopReason {
    #[must_use]
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            Some("end_turn" | "stop" | "COMPLETE" | "eos") | None => Self::EndTurn,
            Some("max_tokens" | "length" | "MAX_TOKENS") => Self::MaxTokens,
            Some("stop_sequence") => Self::StopSequence,
            Some(_) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A single generation request. Unset sampling fields are left to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    #[must_use]
    pub const fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(vec![Message::user(text)])
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Whether any message carries non-blank text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter_map(ContentBlock::as_text)
            .any(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl CompletionResponse {
    #[must_use]
    pub const fn new(message: Message, stop_reason: StopReason, usage: Usage) -> Self {
        Self {
            message,
            stop_reason,
            usage,
        }
    }

    /// Text of content block 0, if that block is text.
    #[must_use]
    pub fn leading_text(&self) -> Option<&str> {
        self.message.content.first().and_then(ContentBlock::as_text)
    }

    /// Owned text of content block 0. A non-text or blank leading block is a
    /// `ResponseShape` error attributed to `provider`.
    pub fn into_leading_text(self, provider: &str, operation: Operation) -> Result<String> {
        match self.message.content.into_iter().next() {
            Some(ContentBlock::Text { text }) if !text.trim().is_empty() => Ok(text),
            Some(ContentBlock::Text { .. }) => {
                Err(FacadeError::shape(provider, operation, "completion text is empty"))
            }
            Some(ContentBlock::Unsupported { .. }) => Err(FacadeError::shape(
                provider,
                operation,
                "first content block is not text",
            )),
            None => Err(FacadeError::shape(provider, operation, "completion has no content")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_message_user() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.first_text(), Some("hello"));
    }

    #[test]
    fn test_leading_text_requires_text_first() {
        let response = CompletionResponse::new(
            Message::new(
                Role::Assistant,
                vec![
                    ContentBlock::Unsupported {
                        kind: "tool_use".to_string(),
                    },
                    ContentBlock::text("later"),
                ],
            ),
            StopReason::EndTurn,
            Usage::default(),
        );
        assert_eq!(response.leading_text(), None);
        assert_eq!(response.message.first_text(), Some("later"));
    }

    #[test]
    fn test_into_leading_text() {
        let reply = |content| {
            CompletionResponse::new(
                Message::new(Role::Assistant, content),
                StopReason::EndTurn,
                Usage::default(),
            )
        };
        let op = Operation::GenerateText;

        let text = reply(vec![ContentBlock::text("4")]).into_leading_text("openai", op);
        assert_eq!(text.unwrap(), "4");

        for content in [
            vec![],
            vec![ContentBlock::text("  \n")],
            vec![
                ContentBlock::Unsupported {
                    kind: "tool_use".to_string(),
                },
                ContentBlock::text("later"),
            ],
        ] {
            let err = reply(content).into_leading_text("openai", op).unwrap_err();
            assert!(err.is_response_shape(), "unexpected {err:?}");
        }
    }

    #[test]
    fn test_has_text() {
        assert!(CompletionRequest::prompt("hi").has_text());
        assert!(!CompletionRequest::prompt("   ").with_system_prompt("be brief").has_text());
        assert!(!CompletionRequest::new(vec![]).has_text());
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::prompt("hi")
            .with_max_tokens(1000)
            .with_temperature(0.7);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, Some(1000));
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_provider(Some("stop")), StopReason::EndTurn);
        assert_eq!(StopReason::from_provider(Some("length")), StopReason::MaxTokens);
        assert_eq!(
            StopReason::from_provider(Some("max_tokens")),
            StopReason::MaxTokens
        );
        assert_eq!(StopReason::from_provider(Some("weird")), StopReason::Other);
        assert_eq!(StopReason::from_provider(None), StopReason::EndTurn);
    }

    #[test]
    fn test_usage_total() {
        assert_eq!(Usage::new(10, 5).total(), 15);
    }
}
