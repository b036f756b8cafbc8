//! Common `pprovider` imports for downstream crates.

pub use crate::{
    Completion, CompletionRequest, Message, ModelProvider, ProviderClient, ProviderConfig,
    ProviderError, ProviderErrorKind, ProviderKind, ProviderOperationHooks, Role, StopReason,
    ToolArguments, ToolCall, ToolDefinition, ToolNameCodec, ToolResult, UsageStats,
};
pub use pcommon::{BoxFuture, GenerationOptions, MetadataMap};
