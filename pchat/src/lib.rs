//! Tool-grounded chat turns over a model provider, an ability registry and a
//! conversation store.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pchat::{ChatPolicy, Orchestrator, ToolExecutionMode};
//! use pprovider::{ProviderClient, ProviderConfig, ProviderKind};
//! use ptooling::ToolRegistry;
//!
//! let provider = ProviderClient::from_config(
//!     ProviderConfig::with_default_model(ProviderKind::Anthropic).with_api_key("sk-test"),
//! )
//! .expect("client");
//!
//! let orchestrator = Orchestrator::builder(Arc::new(provider), Arc::new(ToolRegistry::new()))
//!     .policy(ChatPolicy::default().with_tool_execution(ToolExecutionMode::Concurrent))
//!     .build()
//!     .expect("orchestrator");
//!
//! assert!(orchestrator.available_tools().is_empty());
//! ```

mod error;
mod hooks;
mod orchestrator;
mod retry;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatPolicy, ConversationStore, FailedTool,
        InMemoryConversationStore, Orchestrator, OrchestratorBuilder, RetryRequest, RetryResult,
        ToolExecutionMode, TurnHooks, TurnPhase, TurnRequest, TurnResult,
    };
    pub use pcommon::{ConversationId, MessageId, TraceId};
    pub use ptooling::{
        AbilityRegistry, DefaultToolRuntime, Tool, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolRegistry, ToolRuntime,
    };
}

pub use error::{ChatError, ChatErrorKind};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use retry::format_tool_output;
pub use store::{ChatFuture, ConversationStore, InMemoryConversationStore};
pub use types::{
    ChatPolicy, FailedTool, RetryRequest, RetryResult, ToolExecutionMode, TurnPhase,
    TurnRequest, TurnResult,
};
