//! Structured `tracing` events for provider calls, tool executions and turns.
//!
//! ```rust
//! use pchat::TurnHooks;
//! use pobserve::TracingObservabilityHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! accepts_turn_hooks(&TracingObservabilityHooks);
//! ```

use std::time::Duration;

use pchat::{ChatError, TurnHooks, TurnPhase, TurnResult};
use pcommon::ConversationId;
use pprovider::{ProviderError, ProviderKind, ProviderOperationHooks, ToolCall, UsageStats};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_request_start(&self, provider: ProviderKind, model: &str) {
        tracing::info!(
            phase = "provider",
            event = "request_start",
            provider = %provider,
            model
        );
    }

    fn on_success(
        &self,
        provider: ProviderKind,
        model: &str,
        usage: &UsageStats,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(
        &self,
        provider: ProviderKind,
        model: &str,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            model,
            error_kind = error.kind.as_str(),
            status = error.status,
            retryable = error.retryable,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            conversation_id = %context.conversation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            conversation_id = %context.conversation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            output_bytes = result.output.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_timeout(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        limit: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_timeout",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            conversation_id = %context.conversation_id,
            limit_ms = limit.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            conversation_id = %context.conversation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = error.kind.as_str(),
            retryable = error.retryable,
            error = %error
        );
    }
}

impl TurnHooks for TracingObservabilityHooks {
    fn on_phase(&self, conversation_id: &ConversationId, phase: TurnPhase) {
        tracing::debug!(
            phase = "turn",
            event = "phase",
            conversation_id = %conversation_id,
            turn_phase = phase.as_str()
        );
    }

    fn on_turn_complete(
        &self,
        conversation_id: &ConversationId,
        result: &TurnResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "turn",
            event = "complete",
            conversation_id = %conversation_id,
            tool_calls = result.tool_calls.as_ref().map_or(0, Vec::len),
            failed_tools = result.failed_tools.len(),
            input_tokens = result.usage.input_tokens,
            output_tokens = result.usage.output_tokens,
            stop_reason = ?result.stop_reason,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            conversation_id = %conversation_id,
            turn_phase = error.phase.map(TurnPhase::as_str),
            error_kind = error.kind.as_str(),
            retryable = error.is_retryable(),
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
