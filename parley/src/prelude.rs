//! Common imports for most parley applications.

pub use crate::{
    assistant_message, build_runtime, build_runtime_with, build_runtime_with_store,
    parse_provider_kind, retry_failed, system_message, tool_message, turn, user_message,
};
pub use crate::{pl_messages, pl_msg, pl_tool, pl_turn};
pub use crate::{
    AbilityRegistry, AppConfig, ChatError, ChatErrorKind, ChatPolicy, ConversationId,
    ConversationStore, DefaultToolRuntime, FailedTool, InMemoryConversationStore, Message,
    ModelProvider, Orchestrator, ProviderClient, ProviderConfig, ProviderError, ProviderKind,
    RetryRequest, RetryResult, Role, RuntimeBundle, Tool, ToolCall, ToolDefinition, ToolError,
    ToolExecutionMode, ToolRegistry, ToolRuntime, TurnRequest, TurnResult, UsageStats,
};
