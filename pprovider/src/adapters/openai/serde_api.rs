//! OpenAI chat-completions payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Completion, Message, ProviderError, Role, StopReason, ToolCall, ToolDefinition, ToolNameCodec,
    UsageStats,
};

use crate::adapters::arguments_from_json_str;

/// Which request field carries the output token limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenAiTokenParameter {
    MaxTokens,
    MaxCompletionTokens,
}

impl OpenAiTokenParameter {
    pub(crate) fn for_model(model: &str) -> Self {
        if is_reasoning_model(model) {
            Self::MaxCompletionTokens
        } else {
            Self::MaxTokens
        }
    }
}

/// Reasoning-family models reject `temperature` and the legacy `max_tokens` field.
///
/// Routed model ids such as `openai/o3-mini` are matched on their final path segment.
pub fn is_reasoning_model(model: &str) -> bool {
    let name = model
        .rsplit('/')
        .next()
        .unwrap_or(model)
        .trim()
        .to_ascii_lowercase();

    ["o1", "o3", "o4", "gpt-5"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

pub(crate) struct ApiRequestParts<'a> {
    pub model: &'a str,
    pub history: &'a [Message],
    pub tools: &'a [ToolDefinition],
    pub codec: &'a ToolNameCodec,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

pub(crate) fn build_api_request(
    parts: ApiRequestParts<'_>,
) -> Result<OpenAiApiRequest, ProviderError> {
    build_api_request_with_token_parameter(
        OpenAiTokenParameter::for_model(parts.model),
        parts,
    )
}

pub(crate) fn build_api_request_with_token_parameter(
    token_parameter: OpenAiTokenParameter,
    parts: ApiRequestParts<'_>,
) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = parts
        .history
        .iter()
        .map(|message| OpenAiApiMessage::from_message(message, parts.codec))
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "OpenAI request requires at least one message",
        ));
    }

    let tools = if parts.tools.is_empty() {
        None
    } else {
        Some(
            parts
                .tools
                .iter()
                .map(|tool| OpenAiApiTool {
                    r#type: "function",
                    function: OpenAiApiFunction {
                        name: parts.codec.encode(&tool.name),
                        description: tool.description.clone(),
                        parameters: tool.input_schema.clone(),
                    },
                })
                .collect(),
        )
    };

    let (temperature, max_tokens, max_completion_tokens) = match token_parameter {
        OpenAiTokenParameter::MaxTokens => (parts.temperature, parts.max_tokens, None),
        OpenAiTokenParameter::MaxCompletionTokens => (None, None, parts.max_tokens),
    };

    Ok(OpenAiApiRequest {
        model: parts.model.to_string(),
        messages,
        tools,
        temperature,
        max_tokens,
        max_completion_tokens,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls") | Some("function_call") => StopReason::ToolUse,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: &'static str,
    /// Serialized as `null` for assistant turns that only carry tool calls.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiApiToolCallOut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl OpenAiApiMessage {
    fn from_message(message: &Message, codec: &ToolNameCodec) -> Result<Self, ProviderError> {
        match message.role {
            Role::System | Role::User => Ok(Self {
                role: if message.role == Role::System {
                    "system"
                } else {
                    "user"
                },
                content: Some(message.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            }),
            Role::Assistant => {
                let tool_calls = (!message.tool_calls.is_empty()).then(|| {
                    message
                        .tool_calls
                        .iter()
                        .map(|call| OpenAiApiToolCallOut {
                            id: call.id.clone(),
                            r#type: "function",
                            function: OpenAiApiToolCallFunctionOut {
                                name: codec.encode(&call.name),
                                arguments: call.arguments_json(),
                            },
                        })
                        .collect()
                });
                let content = if message.content.is_empty() && tool_calls.is_some() {
                    None
                } else {
                    Some(message.content.clone())
                };

                Ok(Self {
                    role: "assistant",
                    content,
                    tool_calls,
                    tool_call_id: None,
                })
            }
            Role::Tool => {
                let tool_call_id = message.tool_call_id.clone().ok_or_else(|| {
                    ProviderError::invalid_request("tool message is missing tool_call_id")
                })?;

                Ok(Self {
                    role: "tool",
                    content: Some(message.content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(tool_call_id),
                })
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolCallOut {
    pub id: String,
    pub r#type: &'static str,
    pub function: OpenAiApiToolCallFunctionOut,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolCallFunctionOut {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: &'static str,
    pub function: OpenAiApiFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAiApiChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiApiToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiToolCall {
    pub id: String,
    pub function: OpenAiApiToolFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiToolFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

impl OpenAiApiResponse {
    pub(crate) fn into_completion(
        self,
        fallback_model: &str,
        codec: &ToolNameCodec,
    ) -> Result<Completion, ProviderError> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            ProviderError::invalid_response("OpenAI response did not include choices")
        })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let name = codec.decode(&call.function.name);
                let arguments = arguments_from_json_str(&call.function.arguments, &name);
                ToolCall::new(call.id, name, arguments)
            })
            .collect::<Vec<_>>();

        let usage = self
            .usage
            .map(|usage| {
                let stats = UsageStats::new(usage.prompt_tokens, usage.completion_tokens);
                match usage.total_tokens {
                    Some(total) => stats.with_total(total),
                    None => stats,
                }
            })
            .unwrap_or_default();

        Ok(Completion {
            model: self.model.unwrap_or_else(|| fallback_model.to_string()),
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            stop_reason: parse_finish_reason(choice.finish_reason.as_deref()),
        })
    }
}
