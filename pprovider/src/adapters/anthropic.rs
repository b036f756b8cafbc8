//! Anthropic Messages API adapter.
//!
//! System messages are lifted into the top-level `system` field, tool results travel as
//! `tool_result` blocks on a user turn, and consecutive same-role turns are merged because
//! the API requires strict user/assistant alternation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{effective_generation, ensure_history};
use crate::model::join_text_segments;
use crate::{
    Completion, Message, ProviderAdapter, ProviderConfig, ProviderError, ProviderKind,
    ProviderRequest, RequestOptions, Role, StopReason, ToolCall, ToolDefinition, ToolNameCodec,
    UsageStats,
};

use super::{arguments_from_value, decode_body};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    config: ProviderConfig,
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url())
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
        options: &RequestOptions<'_>,
    ) -> Result<ProviderRequest, ProviderError> {
        ensure_history(history)?;
        let generation = effective_generation(&self.config, options);

        let mut system_parts = Vec::new();
        let mut messages: Vec<AnthropicApiMessage> = Vec::new();

        for message in history {
            match message.role {
                Role::System => system_parts.push(message.content.as_str()),
                Role::User => {
                    if !message.content.is_empty() {
                        push_turn(
                            &mut messages,
                            AnthropicRole::User,
                            AnthropicApiBlock::Text {
                                text: message.content.clone(),
                            },
                        );
                    }
                }
                Role::Assistant => {
                    if !message.content.is_empty() {
                        push_turn(
                            &mut messages,
                            AnthropicRole::Assistant,
                            AnthropicApiBlock::Text {
                                text: message.content.clone(),
                            },
                        );
                    }

                    for call in &message.tool_calls {
                        push_turn(
                            &mut messages,
                            AnthropicRole::Assistant,
                            AnthropicApiBlock::ToolUse {
                                id: call.id.clone(),
                                name: options.codec.encode(&call.name),
                                input: Value::Object(call.arguments.clone()),
                            },
                        );
                    }
                }
                Role::Tool => {
                    let tool_use_id = message.tool_call_id.clone().ok_or_else(|| {
                        ProviderError::invalid_request("tool message is missing tool_call_id")
                    })?;
                    push_turn(
                        &mut messages,
                        AnthropicRole::User,
                        AnthropicApiBlock::ToolResult {
                            tool_use_id,
                            content: message.content.clone(),
                        },
                    );
                }
            }
        }

        if messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "Anthropic request requires at least one non-system message",
            ));
        }

        let (tools, tool_choice) = if tools.is_empty() {
            history_only_tools(history, options.codec)
        } else {
            let tools = tools
                .iter()
                .map(|tool| AnthropicApiTool {
                    name: options.codec.encode(&tool.name),
                    description: tool.description.clone(),
                    input_schema: tool.input_schema.clone(),
                })
                .collect();
            (tools, None)
        };

        let system = join_text_segments(system_parts);
        let body = AnthropicApiRequest {
            model: self.config.model.clone(),
            max_tokens: generation.max_tokens.unwrap_or(self.config.max_tokens),
            system: (!system.is_empty()).then_some(system),
            messages,
            temperature: generation.temperature,
            tools,
            tool_choice,
        };

        let body = serde_json::to_value(body).map_err(|err| {
            ProviderError::invalid_request(format!("failed to encode Anthropic request: {err}"))
        })?;

        let mut request = ProviderRequest::new(self.endpoint(), body)
            .with_header("anthropic-version", ANTHROPIC_VERSION);
        if let Some(key) = &self.config.api_key {
            request = request.with_header("x-api-key", key.clone());
        }

        Ok(request)
    }

    fn parse_response(
        &self,
        raw: &Value,
        codec: &ToolNameCodec,
    ) -> Result<Completion, ProviderError> {
        let response: AnthropicApiResponse = decode_body(raw, "Anthropic")?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                AnthropicResponseBlock::Text { text } => text_parts.push(text),
                AnthropicResponseBlock::ToolUse { id, name, input } => {
                    let decoded = codec.decode(&name);
                    let arguments = arguments_from_value(input, &decoded);
                    tool_calls.push(ToolCall::new(id, decoded, arguments));
                }
                AnthropicResponseBlock::Other => {}
            }
        }

        let usage = response
            .usage
            .map(|usage| UsageStats::new(usage.input_tokens, usage.output_tokens))
            .unwrap_or_default();

        Ok(Completion {
            model: response.model.unwrap_or_else(|| self.config.model.clone()),
            content: join_text_segments(text_parts),
            tool_calls,
            usage,
            stop_reason: parse_stop_reason(response.stop_reason.as_deref()),
        })
    }
}

pub(crate) fn parse_stop_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("end_turn") | Some("stop_sequence") => StopReason::EndTurn,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("tool_use") => StopReason::ToolUse,
        Some("refusal") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

/// The API rejects `tool_use` history without tool definitions, so a call with tool use
/// disabled declares the tools named in history and forbids calling them.
fn history_only_tools(
    history: &[Message],
    codec: &ToolNameCodec,
) -> (Vec<AnthropicApiTool>, Option<AnthropicToolChoice>) {
    let mut tools: Vec<AnthropicApiTool> = Vec::new();
    for call in history.iter().flat_map(|message| &message.tool_calls) {
        let name = codec.encode(&call.name);
        if tools.iter().all(|tool| tool.name != name) {
            tools.push(AnthropicApiTool {
                name,
                description: String::new(),
                input_schema: serde_json::json!({"type": "object"}),
            });
        }
    }

    let tool_choice = (!tools.is_empty()).then_some(AnthropicToolChoice::None);
    (tools, tool_choice)
}

fn push_turn(messages: &mut Vec<AnthropicApiMessage>, role: AnthropicRole, block: AnthropicApiBlock) {
    match messages.last_mut() {
        Some(last) if last.role == role => last.content.push(block),
        _ => messages.push(AnthropicApiMessage {
            role,
            content: vec![block],
        }),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<AnthropicToolChoice>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicToolChoice {
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum AnthropicRole {
    User,
    Assistant,
}

#[derive(Debug, Serialize)]
struct AnthropicApiMessage {
    role: AnthropicRole,
    content: Vec<AnthropicApiBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicApiBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct AnthropicApiTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}
