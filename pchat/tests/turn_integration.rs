use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use pchat::{Orchestrator, TurnRequest};
use pcommon::ConversationId;
use pprovider::{
    HttpResponse, HttpTransport, ProviderClient, ProviderConfig, ProviderError, ProviderFuture,
    ProviderKind, ProviderRequest, Role, StopReason, ToolDefinition, UsageStats, build_adapter,
};
use ptooling::{ToolError, ToolRegistry};
use serde_json::{Value, json};

#[derive(Debug, Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Value>>,
    sent: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedTransport {
    fn replying(replies: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent_bodies(&self) -> Vec<Value> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .map(|request| request.body.clone())
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn post_json<'a>(
        &'a self,
        request: ProviderRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            self.sent.lock().expect("sent lock").push(request);
            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .ok_or_else(|| ProviderError::transport("no scripted reply left"))?;
            Ok(HttpResponse::new(200, reply.to_string()))
        })
    }
}

fn metrics_registry(fail: bool) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(
        ToolDefinition::new(
            "cat/action-name",
            "Fetch site metrics",
            json!({"type": "object", "properties": {"days": {"type": "integer"}}}),
        ),
        move |arguments, _| {
            if fail {
                return Err(ToolError::execution("analytics backend returned 502"));
            }
            Ok(json!({"visits": 1200, "days": arguments.get("days")}).to_string())
        },
    );
    Arc::new(registry)
}

fn orchestrator(
    kind: ProviderKind,
    transport: Arc<ScriptedTransport>,
    registry: Arc<ToolRegistry>,
) -> Orchestrator {
    let config = ProviderConfig::with_default_model(kind).with_api_key("test-key");
    let client = ProviderClient::new(build_adapter(config), transport);
    Orchestrator::builder(Arc::new(client), registry)
        .build()
        .unwrap_or_else(|error| panic!("orchestrator should build: {error}"))
}

fn anthropic_tool_use() -> Value {
    json!({
        "model": "claude-test",
        "content": [
            {"type": "text", "text": "Let me check."},
            {"type": "tool_use", "id": "t1", "name": "cat__action-name", "input": {"days": 7}}
        ],
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 100, "output_tokens": 20}
    })
}

fn anthropic_text(text: &str, input: u64, output: u64) -> Value {
    json!({
        "model": "claude-test",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": input, "output_tokens": output}
    })
}

#[tokio::test]
async fn direct_answer_round_trip() {
    let transport = ScriptedTransport::replying(vec![anthropic_text("hello", 8, 2)]);
    let orchestrator = orchestrator(
        ProviderKind::Anthropic,
        transport.clone(),
        metrics_registry(false),
    );

    let result = orchestrator
        .run_turn(TurnRequest::new("conv-a", "hi"))
        .await
        .expect("turn should succeed");

    assert_eq!(result.content, "hello");
    assert!(result.failed_tools.is_empty());
    assert_eq!(result.stop_reason, StopReason::EndTurn);
    assert_eq!(transport.sent_bodies().len(), 1);
}

#[tokio::test]
async fn tool_round_trip_persists_the_full_exchange_and_sums_usage() {
    let transport = ScriptedTransport::replying(vec![
        anthropic_tool_use(),
        anthropic_text("Here are your metrics", 180, 30),
    ]);
    let orchestrator = orchestrator(
        ProviderKind::Anthropic,
        transport.clone(),
        metrics_registry(false),
    );

    let result = orchestrator
        .run_turn(TurnRequest::new("conv-b", "show me metrics"))
        .await
        .expect("turn should succeed");

    assert_eq!(result.content, "Here are your metrics");
    let calls = result.tool_calls.clone().expect("tool calls");
    assert_eq!(calls[0].name, "cat/action-name");
    assert_eq!(calls[0].arguments.get("days"), Some(&json!(7)));
    assert_eq!(result.usage.input_tokens, 280);
    assert_eq!(result.usage.output_tokens, 50);

    let history = orchestrator
        .store()
        .list(&ConversationId::from("conv-b"))
        .await
        .expect("history");
    let roles = history.iter().map(|message| message.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );
    assert_eq!(history[1].tool_calls[0].id, "t1");
    assert_eq!(history[2].tool_call_id.as_deref(), Some("t1"));
    assert_eq!(history[3].usage, Some(result.usage));

    let bodies = transport.sent_bodies();
    assert_eq!(bodies[0]["tools"][0]["name"], "cat__action-name");
    assert_eq!(bodies[1]["tool_choice"]["type"], "none");
    assert_eq!(bodies[1]["tools"][0]["name"], "cat__action-name");
    let follow_up_messages = bodies[1]["messages"].as_array().expect("messages");
    let tool_result_turn = follow_up_messages.last().expect("tool result turn");
    assert_eq!(tool_result_turn["role"], "user");
    assert_eq!(tool_result_turn["content"][0]["type"], "tool_result");
    assert_eq!(tool_result_turn["content"][0]["tool_use_id"], "t1");
}

#[tokio::test]
async fn failing_tool_still_produces_a_final_answer() {
    let transport = ScriptedTransport::replying(vec![
        anthropic_tool_use(),
        anthropic_text("I could not reach analytics right now.", 150, 12),
    ]);
    let orchestrator = orchestrator(
        ProviderKind::Anthropic,
        transport.clone(),
        metrics_registry(true),
    );

    let result = orchestrator
        .run_turn(TurnRequest::new("conv-c", "show me metrics"))
        .await
        .expect("turn should succeed");

    assert_eq!(result.content, "I could not reach analytics right now.");
    assert_eq!(result.failed_tools.len(), 1);
    assert_eq!(result.failed_tools[0].name, "cat/action-name");
    assert_eq!(result.failed_tools[0].arguments.get("days"), Some(&json!(7)));
    assert_eq!(result.failed_tools[0].error, "analytics backend returned 502");
    assert!(!result.tool_results[0].succeeded);
    assert_eq!(
        result.tool_results[0].content,
        "Error: analytics backend returned 502"
    );

    let bodies = transport.sent_bodies();
    assert_eq!(bodies.len(), 2);
}

#[tokio::test]
async fn gemini_turn_joins_synthesized_call_ids() {
    let transport = ScriptedTransport::replying(vec![
        json!({
            "responseId": "resp-9",
            "modelVersion": "gemini-test",
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "cat__action-name", "args": {"days": 7}}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 50, "candidatesTokenCount": 5, "totalTokenCount": 55}
        }),
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Traffic is up."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 80, "candidatesTokenCount": 6, "totalTokenCount": 86}
        }),
    ]);
    let orchestrator = orchestrator(ProviderKind::Gemini, transport.clone(), metrics_registry(false));

    let result = orchestrator
        .run_turn(TurnRequest::new("conv-d", "traffic?"))
        .await
        .expect("turn should succeed");

    assert_eq!(result.content, "Traffic is up.");
    assert_eq!(result.tool_results[0].tool_call_id, "resp-9-call-0");
    assert_eq!(result.usage.total(), 141);

    let bodies = transport.sent_bodies();
    let contents = bodies[1]["contents"].as_array().expect("contents");
    let function_turn = contents.last().expect("function turn");
    assert_eq!(function_turn["role"], "function");
    assert_eq!(
        function_turn["parts"][0]["functionResponse"]["name"],
        "cat__action-name"
    );
}

#[tokio::test]
async fn missing_credentials_send_nothing_and_store_nothing() {
    for kind in ProviderKind::ALL {
        let transport = ScriptedTransport::replying(Vec::new());
        let client = ProviderClient::new(
            build_adapter(ProviderConfig::with_default_model(kind)),
            transport.clone(),
        );
        let orchestrator = Orchestrator::builder(Arc::new(client), metrics_registry(false))
            .build()
            .unwrap_or_else(|error| panic!("orchestrator should build: {error}"));

        let error = orchestrator
            .run_turn(TurnRequest::new("conv-e", "hi"))
            .await
            .expect_err("turn should fail");

        assert!(error.is_user_error(), "{kind}: {error}");
        assert!(transport.sent_bodies().is_empty());
        assert!(
            orchestrator
                .store()
                .list(&ConversationId::from("conv-e"))
                .await
                .expect("history")
                .is_empty()
        );
    }
}

#[tokio::test]
async fn openai_follow_up_carries_tool_role_messages() {
    let transport = ScriptedTransport::replying(vec![
        json!({
            "model": "gpt-test",
            "choices": [{
                "message": {"role": "assistant", "content": null, "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "cat__action-name", "arguments": "{\"days\":7}"}
                }]},
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 60, "completion_tokens": 9, "total_tokens": 69}
        }),
        json!({
            "model": "gpt-test",
            "choices": [{
                "message": {"role": "assistant", "content": "1,200 visits."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 90, "completion_tokens": 4, "total_tokens": 94}
        }),
    ]);
    let orchestrator = orchestrator(ProviderKind::OpenAi, transport.clone(), metrics_registry(false));

    let result = orchestrator
        .run_turn(TurnRequest::new("conv-f", "visits?"))
        .await
        .expect("turn should succeed");

    assert_eq!(result.content, "1,200 visits.");
    assert_eq!(result.usage, UsageStats::new(150, 13).with_total(163));

    let bodies = transport.sent_bodies();
    let messages = bodies[1]["messages"].as_array().expect("messages");
    let tool_message = messages.last().expect("tool message");
    assert_eq!(tool_message["role"], "tool");
    assert_eq!(tool_message["tool_call_id"], "call_1");
}
