use crate::core::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, Usage,
};
use crate::providers::error::{ProviderError, ProviderResult};
use crate::providers::types::ModelId;

use super::types::{ApiContentBlock, ApiMessage, ApiRequest, ApiResponse};

pub fn to_api_request(model: &ModelId, default_max_tokens: u32, request: &CompletionRequest) -> ApiRequest {
    let messages: Vec<ApiMessage> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(to_api_message)
        .filter(|m| !m.content.is_empty())
        .collect();

    ApiRequest {
        model: model.as_str().to_string(),
        messages,
        max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
        system: request.system_prompt.clone(),
        temperature: request.temperature,
    }
}

fn to_api_message(message: &Message) -> ApiMessage {
    let role = match message.role {
        Role::User | Role::System => "user",
        Role::Assistant => "assistant",
    };

    let content = message
        .content
        .iter()
        .filter_map(ContentBlock::as_text)
        .filter(|text| !text.is_empty())
        .map(|text| ApiContentBlock::Text {
            text: text.to_string(),
        })
        .collect();

    ApiMessage {
        role: role.to_string(),
        content,
    }
}

pub fn from_api_response(response: ApiResponse) -> ProviderResult<CompletionResponse> {
    if response.content.is_empty() {
        return Err(ProviderError::empty("response contained no content blocks"));
    }

    let content = response
        .content
        .into_iter()
        .map(|block| match block {
            ApiContentBlock::Text { text } => ContentBlock::Text { text },
            ApiContentBlock::Other => ContentBlock::Unsupported {
                kind: "non-text".to_string(),
            },
        })
        .collect();

    Ok(CompletionResponse::new(
        Message::new(Role::Assistant, content),
        StopReason::from_provider(response.stop_reason.as_deref()),
        Usage::new(response.usage.input_tokens, response.usage.output_tokens),
    ))
}
