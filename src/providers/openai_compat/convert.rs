use crate::core::types::{
    CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage,
};
use crate::providers::error::{ProviderError, ProviderResult};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

pub fn to_chat_request(
    model: &str,
    default_max_tokens: Option<u32>,
    request: &CompletionRequest,
) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    messages.extend(request.messages.iter().map(|message| ChatMessage {
        role: role_str(message.role).to_string(),
        content: Some(message.text()),
    }));

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens.or(default_max_tokens),
    }
}

const fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Takes the first choice. A missing choice or missing content is an empty response.
pub fn from_chat_response(response: ChatCompletionResponse) -> ProviderResult<CompletionResponse> {
    let usage = response
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::empty("response contained no choices"))?;

    let text = choice
        .message
        .content
        .ok_or_else(|| ProviderError::empty("first choice has no message content"))?;

    Ok(CompletionResponse::new(
        Message::assistant(text),
        StopReason::from_provider(choice.finish_reason.as_deref()),
        usage,
    ))
}
