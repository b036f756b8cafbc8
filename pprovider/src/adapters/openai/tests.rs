//! Focused unit tests for OpenAI adapter internals.

#![cfg(test)]

use serde_json::json;

use crate::{
    Message, ProviderAdapter, ProviderConfig, ProviderErrorKind, ProviderKind, RequestOptions,
    StopReason, ToolCall, ToolDefinition, ToolNameCodec, ToolResult,
};

use super::OpenAiAdapter;
use super::serde_api::{
    ApiRequestParts, OpenAiTokenParameter, build_api_request_with_token_parameter,
    is_reasoning_model, parse_finish_reason,
};

fn adapter(model: &str) -> OpenAiAdapter {
    OpenAiAdapter::new(
        ProviderConfig::new(ProviderKind::OpenAi, model)
            .with_api_key("sk-test")
            .with_temperature(0.7)
            .with_max_tokens(256),
    )
}

#[test]
fn builds_chat_completions_request_with_bearer_auth() {
    let codec = ToolNameCodec::new();
    let request = adapter("gpt-4o-mini")
        .build_request(
            &[Message::system("be terse"), Message::user("hi")],
            &[],
            &RequestOptions::new(&codec),
        )
        .expect("request should build");

    assert_eq!(request.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(request.header("Authorization"), Some("Bearer sk-test"));
    assert_eq!(
        request.body["messages"],
        json!([
            {"role": "system", "content": "be terse"},
            {"role": "user", "content": "hi"}
        ])
    );
    assert_eq!(request.body["max_tokens"], json!(256));
    assert!(request.body.get("max_completion_tokens").is_none());
    assert!(request.body.get("tools").is_none());
}

#[test]
fn assistant_tool_calls_use_null_content_and_tool_role_results() {
    let codec = ToolNameCodec::from_names(["analytics/get-metrics"]).expect("codec");
    let call = ToolCall::new(
        "call_1",
        "analytics/get-metrics",
        json!({"days": 7}).as_object().cloned().unwrap_or_default(),
    );
    let result = ToolResult::success(&call, "{\"visits\":12}");
    let history = vec![
        Message::user("stats?"),
        Message::assistant_with_tool_calls("", vec![call]),
        Message::tool_result(&result),
    ];

    let request = adapter("gpt-4o-mini")
        .build_request(&history, &[], &RequestOptions::new(&codec))
        .expect("request should build");

    let messages = &request.body["messages"];
    assert_eq!(messages[1]["content"], serde_json::Value::Null);
    assert_eq!(messages[1]["tool_calls"][0]["type"], json!("function"));
    assert_eq!(
        messages[1]["tool_calls"][0]["function"]["name"],
        json!("analytics__get-metrics")
    );
    assert_eq!(
        messages[1]["tool_calls"][0]["function"]["arguments"],
        json!("{\"days\":7}")
    );
    assert_eq!(
        messages[2],
        json!({"role": "tool", "content": "{\"visits\":12}", "tool_call_id": "call_1"})
    );
}

#[test]
fn empty_arguments_are_sent_as_empty_object_string() {
    let codec = ToolNameCodec::new();
    let call = ToolCall::new("call_1", "ping", Default::default());
    let history = vec![
        Message::user("ping it"),
        Message::assistant_with_tool_calls("sure", vec![call]),
    ];

    let request = adapter("gpt-4o-mini")
        .build_request(&history, &[], &RequestOptions::new(&codec))
        .expect("request should build");

    assert_eq!(request.body["messages"][1]["content"], json!("sure"));
    assert_eq!(
        request.body["messages"][1]["tool_calls"][0]["function"]["arguments"],
        json!("{}")
    );
}

#[test]
fn tools_are_declared_as_functions_with_encoded_names() {
    let codec = ToolNameCodec::from_names(["core/site info"]).expect("codec");
    let tools = vec![ToolDefinition::new(
        "core/site info",
        "Site details",
        json!({"type": "object"}),
    )];

    let request = adapter("gpt-4o-mini")
        .build_request(&[Message::user("hi")], &tools, &RequestOptions::new(&codec))
        .expect("request should build");

    assert_eq!(
        request.body["tools"],
        json!([{
            "type": "function",
            "function": {
                "name": "core__site_info",
                "description": "Site details",
                "parameters": {"type": "object"}
            }
        }])
    );
}

#[test]
fn reasoning_models_omit_temperature_and_switch_token_field() {
    let codec = ToolNameCodec::new();
    let request = adapter("openai/o3-mini")
        .build_request(&[Message::user("hi")], &[], &RequestOptions::new(&codec))
        .expect("request should build");

    assert!(request.body.get("temperature").is_none());
    assert!(request.body.get("max_tokens").is_none());
    assert_eq!(request.body["max_completion_tokens"], json!(256));
}

#[test]
fn reasoning_model_detection_matches_known_families() {
    assert!(is_reasoning_model("o1-preview"));
    assert!(is_reasoning_model("O3"));
    assert!(is_reasoning_model("o4-mini"));
    assert!(is_reasoning_model("gpt-5.2"));
    assert!(is_reasoning_model("openrouter/openai/gpt-5-mini"));
    assert!(!is_reasoning_model("gpt-4o-mini"));
    assert!(!is_reasoning_model("omni-moderation"));
}

#[test]
fn build_api_request_switches_token_parameter_name() {
    let codec = ToolNameCodec::new();
    let history = [Message::user("hi")];
    let parts = || ApiRequestParts {
        model: "gpt-5.2",
        history: &history,
        tools: &[],
        codec: &codec,
        temperature: Some(0.0),
        max_tokens: Some(256),
    };

    let legacy = build_api_request_with_token_parameter(OpenAiTokenParameter::MaxTokens, parts())
        .expect("request should build");
    assert_eq!(legacy.max_tokens, Some(256));
    assert_eq!(legacy.max_completion_tokens, None);
    assert_eq!(legacy.temperature, Some(0.0));

    let modern =
        build_api_request_with_token_parameter(OpenAiTokenParameter::MaxCompletionTokens, parts())
            .expect("request should build");
    assert_eq!(modern.max_tokens, None);
    assert_eq!(modern.max_completion_tokens, Some(256));
    assert_eq!(modern.temperature, None);
}

#[test]
fn parse_finish_reason_maps_expected_values() {
    assert_eq!(parse_finish_reason(Some("stop")), StopReason::EndTurn);
    assert_eq!(parse_finish_reason(Some("length")), StopReason::MaxTokens);
    assert_eq!(parse_finish_reason(Some("tool_calls")), StopReason::ToolUse);
    assert_eq!(
        parse_finish_reason(Some("content_filter")),
        StopReason::ContentFilter
    );
    assert_eq!(parse_finish_reason(Some("unknown")), StopReason::Other);
    assert_eq!(parse_finish_reason(None), StopReason::Other);
}

#[test]
fn parses_tool_calls_and_usage() {
    let codec = ToolNameCodec::from_names(["analytics/get-metrics"]).expect("codec");
    let raw = json!({
        "model": "gpt-4o-mini-2024",
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_9",
                    "type": "function",
                    "function": {"name": "analytics__get-metrics", "arguments": "{\"days\":7}"}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60}
    });

    let completion = adapter("gpt-4o-mini")
        .parse_response(&raw, &codec)
        .expect("should parse");

    assert_eq!(completion.model, "gpt-4o-mini-2024");
    assert_eq!(completion.content, "");
    assert_eq!(completion.stop_reason, StopReason::ToolUse);
    assert_eq!(completion.usage.total_tokens, Some(60));
    assert_eq!(completion.tool_calls[0].id, "call_9");
    assert_eq!(completion.tool_calls[0].name, "analytics/get-metrics");
    assert_eq!(completion.tool_calls[0].arguments.get("days"), Some(&json!(7)));
}

#[test]
fn unparsable_arguments_degrade_to_empty_object() {
    let codec = ToolNameCodec::new();
    let raw = json!({
        "choices": [{
            "message": {
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "ping", "arguments": "{\"days\":"}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    });

    let completion = adapter("gpt-4o-mini")
        .parse_response(&raw, &codec)
        .expect("should parse");
    assert!(completion.tool_calls[0].arguments.is_empty());
    assert_eq!(completion.model, "gpt-4o-mini");
    assert!(completion.usage.is_zero());
}

#[test]
fn empty_choices_are_an_invalid_response() {
    let codec = ToolNameCodec::new();
    let error = adapter("gpt-4o-mini")
        .parse_response(&json!({"choices": []}), &codec)
        .expect_err("should fail");
    assert_eq!(error.kind, ProviderErrorKind::InvalidResponse);
}
