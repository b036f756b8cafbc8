//! Small convenience constructors for common types.

use crate::{
    ConversationId, FailedTool, Message, ProviderKind, RetryRequest, ToolCall, ToolResult,
    TurnRequest,
};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

/// Tool-role message answering `call`.
pub fn tool_message(call: &ToolCall, content: impl Into<String>) -> Message {
    Message::tool_result(&ToolResult::success(call, content))
}

pub fn turn(
    conversation_id: impl Into<ConversationId>,
    user_input: impl Into<String>,
) -> TurnRequest {
    TurnRequest::new(conversation_id, user_input)
}

/// Retry request for a tool that failed in an earlier turn, with a summary.
pub fn retry_failed(conversation_id: impl Into<ConversationId>, failed: &FailedTool) -> RetryRequest {
    RetryRequest::from_failed(conversation_id, failed).with_summary()
}

pub fn parse_provider_kind(value: &str) -> Option<ProviderKind> {
    value.parse().ok()
}
