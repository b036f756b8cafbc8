//! Unified facade over the parley workspace crates.
//!
//! Most applications only need this crate: it re-exports the provider,
//! tooling, chat and observability layers and adds environment-driven
//! configuration plus one-call runtime wiring.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parley::{AppConfig, ProviderConfig, ProviderKind, ToolRegistry, build_runtime};
//!
//! let config = AppConfig::new(
//!     ProviderConfig::with_default_model(ProviderKind::OpenAi).with_api_key("sk-test"),
//! )
//! .with_system_prompt("You are a site analytics assistant.");
//!
//! let runtime = build_runtime(config, Arc::new(ToolRegistry::new())).expect("runtime");
//! assert_eq!(runtime.provider.kind(), ProviderKind::OpenAi);
//! ```

mod config;
mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use pchat;
pub use pcommon;
pub use pobserve;
pub use pprovider;
pub use ptooling;

#[doc(hidden)]
pub use serde_json as __serde_json;

pub use config::{
    AppConfig, BASE_URL_VAR, ENABLED_TOOLS_VAR, MAX_TOKENS_VAR, MODEL_VAR, PROVIDER_VAR,
    SYSTEM_PROMPT_VAR, TEMPERATURE_VAR, TIMEOUT_VAR, TOOL_EXECUTION_VAR, TOOL_TIMEOUT_VAR,
};
pub use pchat::{
    ChatError, ChatErrorKind, ChatPolicy, ConversationStore, FailedTool,
    InMemoryConversationStore, NoopTurnHooks, Orchestrator, OrchestratorBuilder, RetryRequest,
    RetryResult, ToolExecutionMode, TurnHooks, TurnPhase, TurnRequest, TurnResult,
    format_tool_output,
};
pub use pcommon::{BoxFuture, ConversationId, GenerationOptions, MessageId, MetadataMap, TraceId};
pub use pobserve::{
    MetricsObservabilityHooks, SafeProviderHooks, SafeToolHooks, SafeTurnHooks,
    TracingObservabilityHooks,
};
pub use pprovider::{
    Completion, CompletionRequest, Message, ModelProvider, ProviderClient, ProviderConfig,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderKind, Role, SecretString,
    StopReason, ToolArguments, ToolCall, ToolDefinition, ToolNameCodec, ToolResult, UsageStats,
};
pub use ptooling::{
    AbilityRegistry, AllowAllTools, DefaultToolRuntime, FunctionTool, Tool, ToolAllowList,
    ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFilter, ToolFuture,
    ToolRegistry, ToolRuntime,
};

pub use runtime::{
    RuntimeBundle, build_runtime, build_runtime_with, build_runtime_with_store, provider_client,
};
pub use util::{
    assistant_message, parse_provider_kind, retry_failed, system_message, tool_message, turn,
    user_message,
};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn pl_msg_macro_creates_expected_message() {
        let message = crate::pl_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn pl_messages_macro_builds_message_vector() {
        let messages = crate::pl_messages![
            system => "You are concise.",
            user => "Which pages grew fastest?",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(crate::pl_messages![].is_empty());
    }

    #[test]
    fn pl_tool_macro_defaults_to_an_empty_object_schema() {
        let tool = crate::pl_tool!("search/queries", "Top search queries");
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.input_schema["properties"].as_object().is_some());
    }

    #[test]
    fn pl_turn_macro_sets_optional_prompt() {
        let plain = crate::pl_turn!("conv-1", "hi");
        assert!(plain.system_prompt.is_none());

        let prompted = crate::pl_turn!("conv-1", "hi", "Be brief.");
        assert_eq!(prompted.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(prompted.conversation_id.as_str(), "conv-1");
    }
}
