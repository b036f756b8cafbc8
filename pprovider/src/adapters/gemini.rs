//! Google Gemini `generateContent` adapter.
//!
//! Gemini has no tool-call ids on the wire, so results are matched back to calls by
//! function name and call ids are synthesized from the response id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::{effective_generation, ensure_history};
use crate::model::join_text_segments;
use crate::{
    Completion, Message, ProviderAdapter, ProviderConfig, ProviderError, ProviderKind,
    ProviderRequest, RequestOptions, Role, StopReason, ToolCall, ToolDefinition, ToolNameCodec,
    UsageStats,
};

use super::{arguments_from_value, decode_body};

const FALLBACK_CALL_ID_PREFIX: &str = "gemini";

#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    config: ProviderConfig,
}

impl GeminiAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model
        )
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
        let mut contents: Vec<GeminiApiContent> = Vec::new();
        let mut call_names: HashMap<&str, String> = HashMap::new();

        for message in history {
            match message.role {
                Role::System => system_parts.push(message.content.as_str()),
                Role::User => {
                    if !message.content.is_empty() {
                        push_part(
                            &mut contents,
                            GeminiRole::User,
                            GeminiApiPart::text(&message.content),
                        );
                    }
                }
                Role::Assistant => {
                    if !message.content.is_empty() {
                        push_part(
                            &mut contents,
                            GeminiRole::Model,
                            GeminiApiPart::text(&message.content),
                        );
                    }

                    for call in &message.tool_calls {
                        let wire_name = options.codec.encode(&call.name);
                        call_names.insert(call.id.as_str(), wire_name.clone());
                        push_part(
                            &mut contents,
                            GeminiRole::Model,
                            GeminiApiPart {
                                function_call: Some(GeminiApiFunctionCall {
                                    name: wire_name,
                                    args: call.arguments.clone(),
                                }),
                                ..GeminiApiPart::default()
                            },
                        );
                    }
                }
                Role::Tool => {
                    let call_id = message.tool_call_id.as_deref().ok_or_else(|| {
                        ProviderError::invalid_request("tool message is missing tool_call_id")
                    })?;
                    let name = call_names.get(call_id).cloned().ok_or_else(|| {
                        ProviderError::invalid_request(format!(
                            "tool result '{call_id}' has no matching assistant tool call"
                        ))
                    })?;

                    let mut response = Map::new();
                    response.insert("content".to_string(), Value::String(message.content.clone()));
                    push_part(
                        &mut contents,
                        GeminiRole::Function,
                        GeminiApiPart {
                            function_response: Some(GeminiApiFunctionResponse { name, response }),
                            ..GeminiApiPart::default()
                        },
                    );
                }
            }
        }

        if contents.is_empty() {
            return Err(ProviderError::invalid_request(
                "Gemini request requires at least one non-system message",
            ));
        }

        let system = join_text_segments(system_parts);
        let body = GeminiApiRequest {
            contents,
            system_instruction: (!system.is_empty()).then(|| GeminiApiSystemInstruction {
                parts: vec![GeminiApiPart::text(&system)],
            }),
            tools: if tools.is_empty() {
                Vec::new()
            } else {
                vec![GeminiApiToolGroup {
                    function_declarations: tools
                        .iter()
                        .map(|tool| GeminiApiFunctionDeclaration {
                            name: options.codec.encode(&tool.name),
                            description: tool.description.clone(),
                            parameters: tool.input_schema.clone(),
                        })
                        .collect(),
                }]
            },
            generation_config: GeminiApiGenerationConfig {
                max_output_tokens: generation.max_tokens,
                temperature: generation.temperature,
            },
        };

        let body = serde_json::to_value(body).map_err(|err| {
            ProviderError::invalid_request(format!("failed to encode Gemini request: {err}"))
        })?;

        let mut request = ProviderRequest::new(self.endpoint(), body);
        if let Some(key) = &self.config.api_key {
            request = request.with_header("x-goog-api-key", key.clone());
        }

        Ok(request)
    }

    fn parse_response(
        &self,
        raw: &Value,
        codec: &ToolNameCodec,
    ) -> Result<Completion, ProviderError> {
        let response: GeminiApiResponse = decode_body(raw, "Gemini")?;
        let model = response
            .model_version
            .unwrap_or_else(|| self.config.model.clone());
        let usage = response
            .usage_metadata
            .map(|usage| {
                let stats =
                    UsageStats::new(usage.prompt_token_count, usage.candidates_token_count);
                match usage.total_token_count {
                    Some(total) => stats.with_total(total),
                    None => stats,
                }
            })
            .unwrap_or_default();

        let Some(candidate) = response.candidates.into_iter().next() else {
            let blocked = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason);
            return match blocked {
                Some(reason) => {
                    tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
                    Ok(Completion {
                        model,
                        content: String::new(),
                        tool_calls: Vec::new(),
                        usage,
                        stop_reason: StopReason::ContentFilter,
                    })
                }
                None => Err(ProviderError::invalid_response(
                    "Gemini response did not include candidates",
                )),
            };
        };

        let call_id_prefix = response
            .response_id
            .unwrap_or_else(|| FALLBACK_CALL_ID_PREFIX.to_string());

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|content| content.parts).unwrap_or_default() {
            if part.thought {
                continue;
            }
            if let Some(text) = part.text {
                text_parts.push(text);
            }
            if let Some(call) = part.function_call {
                let name = codec.decode(&call.name);
                let arguments = arguments_from_value(call.args, &name);
                let id = format!("{call_id_prefix}-call-{}", tool_calls.len());
                tool_calls.push(ToolCall::new(id, name, arguments));
            }
        }

        let stop_reason = if tool_calls.is_empty() {
            parse_finish_reason(candidate.finish_reason.as_deref())
        } else {
            StopReason::ToolUse
        };

        Ok(Completion {
            model,
            content: join_text_segments(text_parts),
            tool_calls,
            usage,
            stop_reason,
        })
    }
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("STOP") => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
        | Some("SPII") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

fn push_part(contents: &mut Vec<GeminiApiContent>, role: GeminiRole, part: GeminiApiPart) {
    match contents.last_mut() {
        Some(last) if last.role == role => last.parts.push(part),
        _ => contents.push(GeminiApiContent {
            role,
            parts: vec![part],
        }),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiRequest {
    contents: Vec<GeminiApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiApiSystemInstruction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiApiToolGroup>,
    generation_config: GeminiApiGenerationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum GeminiRole {
    User,
    Model,
    Function,
}

#[derive(Debug, Serialize)]
struct GeminiApiContent {
    role: GeminiRole,
    parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiApiSystemInstruction {
    parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiApiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiApiFunctionResponse>,
}

impl GeminiApiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiApiFunctionCall {
    name: String,
    args: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct GeminiApiFunctionResponse {
    name: String,
    response: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiToolGroup {
    function_declarations: Vec<GeminiApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<GeminiApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    response_id: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<GeminiApiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiCandidate {
    #[serde(default)]
    content: Option<GeminiApiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<GeminiApiResponseFunctionCall>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiApiResponseFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn adapter() -> GeminiAdapter {
        GeminiAdapter::new(
            ProviderConfig::new(ProviderKind::Gemini, "gemini-test").with_api_key("g-key"),
        )
    }

    fn args(value: Value) -> crate::ToolArguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn builds_generate_content_request() {
        let codec = ToolNameCodec::new();
        let history = vec![Message::system("be brief"), Message::user("hi")];
        let request = adapter()
            .build_request(&history, &[], &RequestOptions::new(&codec))
            .expect("request should build");

        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(request.header("x-goog-api-key"), Some("g-key"));
        assert_eq!(
            request.body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "generationConfig": {"maxOutputTokens": 4096}
            })
        );
    }

    #[test]
    fn tool_results_become_function_responses_named_after_their_call() {
        let codec = ToolNameCodec::from_names(["analytics/get-metrics"]).expect("codec");
        let call = ToolCall::new("c-0", "analytics/get-metrics", args(json!({"days": 7})));
        let result = crate::ToolResult::success(&call, "{\"visits\":12}");
        let history = vec![
            Message::user("stats?"),
            Message::assistant_with_tool_calls("", vec![call]),
            Message::tool_result(&result),
        ];

        let request = adapter()
            .build_request(&history, &[], &RequestOptions::new(&codec))
            .expect("request should build");

        assert_eq!(
            request.body["contents"],
            json!([
                {"role": "user", "parts": [{"text": "stats?"}]},
                {"role": "model", "parts": [
                    {"functionCall": {"name": "analytics__get-metrics", "args": {"days": 7}}}
                ]},
                {"role": "function", "parts": [
                    {"functionResponse": {
                        "name": "analytics__get-metrics",
                        "response": {"content": "{\"visits\":12}"}
                    }}
                ]}
            ])
        );
    }

    #[test]
    fn orphan_tool_result_is_rejected() {
        let codec = ToolNameCodec::new();
        let orphan = Message::tool_result(&crate::ToolResult::success(
            &ToolCall::new("missing", "ping", Default::default()),
            "x",
        ));

        let error = adapter()
            .build_request(&[Message::user("hi"), orphan], &[], &RequestOptions::new(&codec))
            .expect_err("should fail");
        assert_eq!(error.kind, crate::ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn tools_are_grouped_as_function_declarations() {
        let codec = ToolNameCodec::from_names(["core/site info"]).expect("codec");
        let tools = vec![ToolDefinition::new(
            "core/site info",
            "Site details",
            json!({"type": "object"}),
        )];
        let options = RequestOptions::new(&codec)
            .with_generation(pcommon::GenerationOptions::default().with_temperature(0.5));

        let request = adapter()
            .build_request(&[Message::user("hi")], &tools, &options)
            .expect("request should build");

        assert_eq!(
            request.body["tools"],
            json!([{"functionDeclarations": [{
                "name": "core__site_info",
                "description": "Site details",
                "parameters": {"type": "object"}
            }]}])
        );
        assert_eq!(request.body["generationConfig"]["temperature"], json!(0.5));
    }

    #[test]
    fn parses_function_calls_with_synthesized_ids() {
        let codec = ToolNameCodec::from_names(["analytics/get-metrics"]).expect("codec");
        let raw = json!({
            "responseId": "resp-1",
            "modelVersion": "gemini-test-001",
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking it over", "thought": true},
                    {"text": "Checking."},
                    {"functionCall": {"name": "analytics__get-metrics", "args": {"days": 7}}},
                    {"functionCall": {"name": "ping"}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 8, "totalTokenCount": 48}
        });

        let completion = adapter().parse_response(&raw, &codec).expect("should parse");
        assert_eq!(completion.model, "gemini-test-001");
        assert_eq!(completion.content, "Checking.");
        assert_eq!(completion.stop_reason, StopReason::ToolUse);
        assert_eq!(completion.usage.total_tokens, Some(48));
        assert_eq!(completion.tool_calls[0].id, "resp-1-call-0");
        assert_eq!(completion.tool_calls[0].name, "analytics/get-metrics");
        assert_eq!(completion.tool_calls[1].id, "resp-1-call-1");
        assert!(completion.tool_calls[1].arguments.is_empty());
    }

    #[test]
    fn text_only_response_keeps_finish_reason() {
        let codec = ToolNameCodec::new();
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "one"}, {"text": "two"}]},
                "finishReason": "MAX_TOKENS"
            }]
        });

        let completion = adapter().parse_response(&raw, &codec).expect("should parse");
        assert_eq!(completion.content, "one\n\ntwo");
        assert_eq!(completion.stop_reason, StopReason::MaxTokens);
        assert_eq!(completion.model, "gemini-test");
        assert!(completion.usage.is_zero());
    }

    #[test]
    fn blocked_prompt_is_reported_as_content_filter() {
        let codec = ToolNameCodec::new();
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});

        let completion = adapter().parse_response(&raw, &codec).expect("should parse");
        assert_eq!(completion.stop_reason, StopReason::ContentFilter);
        assert!(completion.content.is_empty());
    }

    #[test]
    fn missing_candidates_without_feedback_is_invalid() {
        let codec = ToolNameCodec::new();
        let error = adapter()
            .parse_response(&json!({}), &codec)
            .expect_err("should fail");
        assert_eq!(error.kind, crate::ProviderErrorKind::InvalidResponse);
    }
}
