//! Capability layer: the ability registry contract, tool filtering, and the tool executor.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pprovider::ToolDefinition;
//! use ptooling::{AbilityRegistry, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_sync_fn(
//!     ToolDefinition::new("core/ping", "Liveness check", serde_json::json!({"type": "object"})),
//!     |_args, _ctx| Ok("pong".to_string()),
//! );
//!
//! let registry: Arc<dyn AbilityRegistry> = Arc::new(registry);
//! assert_eq!(registry.list_tools()[0].name, "core/ping");
//! ```

mod args;
mod error;
mod filter;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        AbilityRegistry, AllowAllTools, DefaultToolRuntime, Tool, ToolAllowList, ToolError,
        ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFilter, ToolFuture,
        ToolRegistry, ToolRuntime,
    };
}

pub use args::{
    optional_string, optional_u64, parse_json_object, parse_json_value, required_string,
};
pub use error::{ToolError, ToolErrorKind};
pub use filter::{AllowAllTools, ToolAllowList, ToolFilter};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::{AbilityRegistry, ToolRegistry};
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
