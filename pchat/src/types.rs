//! Turn requests, results, phases and the retry path's request/result pair.

use pcommon::{ConversationId, GenerationOptions, TraceId};
use pprovider::{StopReason, ToolArguments, ToolCall, ToolResult, UsageStats};
use ptooling::ToolError;

/// States of one two-phase turn, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    AwaitingCompletion,
    ToolCallsDetected,
    ExecutingTools,
    AwaitingFollowUp,
    Done,
}

impl TurnPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingCompletion => "awaiting_completion",
            Self::ToolCallsDetected => "tool_calls_detected",
            Self::ExecutingTools => "executing_tools",
            Self::AwaitingFollowUp => "awaiting_follow_up",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolExecutionMode {
    #[default]
    Sequential,
    /// Fan out every call of a turn at once; results are still persisted in call order.
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatPolicy {
    pub tool_execution: ToolExecutionMode,
    pub system_prompt: Option<String>,
}

impl ChatPolicy {
    pub fn with_tool_execution(mut self, mode: ToolExecutionMode) -> Self {
        self.tool_execution = mode;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub conversation_id: ConversationId,
    pub user_input: String,
    /// Overrides [`ChatPolicy::system_prompt`] for this turn. Never persisted.
    pub system_prompt: Option<String>,
    pub generation: GenerationOptions,
    pub trace_id: Option<TraceId>,
}

impl TurnRequest {
    pub fn new(conversation_id: impl Into<ConversationId>, user_input: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_input: user_input.into(),
            system_prompt: None,
            generation: GenerationOptions::default(),
            trace_id: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// A tool call that failed during a turn, kept so a caller can offer a retry.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedTool {
    pub name: String,
    pub arguments: ToolArguments,
    pub error: String,
}

impl FailedTool {
    pub fn new(call: &ToolCall, error: &ToolError) -> Self {
        Self {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            error: error.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub conversation_id: ConversationId,
    pub content: String,
    /// Calls requested in phase one, or `None` when the model answered directly.
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_results: Vec<ToolResult>,
    pub usage: UsageStats,
    pub stop_reason: StopReason,
    pub failed_tools: Vec<FailedTool>,
}

impl TurnResult {
    pub fn used_tools(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryRequest {
    pub conversation_id: ConversationId,
    pub tool_name: String,
    pub arguments: ToolArguments,
    pub summarize: bool,
}

impl RetryRequest {
    pub fn new(
        conversation_id: impl Into<ConversationId>,
        tool_name: impl Into<String>,
        arguments: ToolArguments,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            tool_name: tool_name.into(),
            arguments,
            summarize: false,
        }
    }

    pub fn from_failed(conversation_id: impl Into<ConversationId>, failed: &FailedTool) -> Self {
        Self::new(conversation_id, failed.name.clone(), failed.arguments.clone())
    }

    pub fn with_summary(mut self) -> Self {
        self.summarize = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryResult {
    pub tool_name: String,
    pub arguments: ToolArguments,
    pub succeeded: bool,
    pub content: String,
    pub formatted: String,
    pub summary: Option<String>,
    pub usage: UsageStats,
}
