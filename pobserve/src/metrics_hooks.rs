//! `metrics` counters and histograms for provider calls, tool executions and turns.
//!
//! ```rust
//! use pobserve::MetricsObservabilityHooks;
//! use pprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! accepts_provider_hooks(&MetricsObservabilityHooks);
//! ```

use std::time::Duration;

use pchat::{ChatError, TurnHooks, TurnPhase, TurnResult};
use pcommon::ConversationId;
use pprovider::{ProviderError, ProviderKind, ProviderOperationHooks, ToolCall, UsageStats};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, provider: ProviderKind, model: &str) {
        metrics::counter!(
            "parley_provider_requests_total",
            "provider" => provider.as_str(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_success(
        &self,
        provider: ProviderKind,
        model: &str,
        usage: &UsageStats,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_provider_success_total",
            "provider" => provider.as_str(),
            "model" => model.to_string()
        )
        .increment(1);
        metrics::counter!(
            "parley_provider_input_tokens_total",
            "provider" => provider.as_str(),
            "model" => model.to_string()
        )
        .increment(usage.input_tokens);
        metrics::counter!(
            "parley_provider_output_tokens_total",
            "provider" => provider.as_str(),
            "model" => model.to_string()
        )
        .increment(usage.output_tokens);
        metrics::histogram!(
            "parley_provider_request_duration_seconds",
            "provider" => provider.as_str(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failure(
        &self,
        provider: ProviderKind,
        model: &str,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_provider_failure_total",
            "provider" => provider.as_str(),
            "model" => model.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "parley_provider_request_duration_seconds",
            "provider" => provider.as_str(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "parley_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_timeout(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _limit: Duration,
    ) {
        metrics::counter!(
            "parley_tool_execution_timeout_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl TurnHooks for MetricsObservabilityHooks {
    fn on_phase(&self, _conversation_id: &ConversationId, phase: TurnPhase) {
        metrics::counter!("parley_turn_phase_total", "phase" => phase.as_str()).increment(1);
    }

    fn on_turn_complete(
        &self,
        _conversation_id: &ConversationId,
        result: &TurnResult,
        elapsed: Duration,
    ) {
        let kind = if result.used_tools() { "tool_round_trip" } else { "direct" };
        metrics::counter!("parley_turn_success_total", "kind" => kind).increment(1);
        metrics::counter!("parley_turn_failed_tools_total").increment(result.failed_tools.len() as u64);
        metrics::counter!("parley_turn_tokens_total", "direction" => "input")
            .increment(result.usage.input_tokens);
        metrics::counter!("parley_turn_tokens_total", "direction" => "output")
            .increment(result.usage.output_tokens);
        metrics::histogram!("parley_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "parley_turn_failure_total",
            "error_kind" => error.kind.as_str(),
            "phase" => error.phase.map_or("none", TurnPhase::as_str)
        )
        .increment(1);
        metrics::histogram!("parley_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
