//! Provider layer: canonical chat model, tool-name codec, wire adapters, and the HTTP client.
//!
//! ```rust
//! use pprovider::{Message, ProviderConfig, ProviderKind, RequestOptions, ToolNameCodec, build_adapter};
//!
//! let adapter = build_adapter(
//!     ProviderConfig::new(ProviderKind::Anthropic, "claude-sonnet-4-5").with_api_key("sk-ant"),
//! );
//! let codec = ToolNameCodec::new();
//! let request = adapter
//!     .build_request(
//!         &[Message::system("be brief"), Message::user("hello")],
//!         &[],
//!         &RequestOptions::new(&codec),
//!     )
//!     .expect("request should build");
//!
//! assert_eq!(request.body["system"], "be brief");
//! assert_eq!(request.header("x-api-key"), Some("sk-ant"));
//! ```

mod adapter;
pub mod adapters;
mod client;
mod config;
mod credentials;
mod error;
mod hooks;
mod model;
pub mod prelude;
mod provider;
mod tool_name;
mod transport;

pub use adapter::{ProviderAdapter, ProviderRequest, RequestOptions, build_adapter};
pub use client::ProviderClient;
pub use config::{
    DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT, ProviderConfig, ProviderKind, UnknownProviderKind,
};
pub use credentials::SecretString;
pub use error::{ProviderError, ProviderErrorKind};
pub use hooks::{NoopProviderHooks, ProviderOperationHooks};
pub use model::{
    Completion, Message, Role, StopReason, ToolArguments, ToolCall, ToolDefinition, ToolResult,
    UsageStats,
};
pub use provider::{CompletionRequest, ModelProvider, ProviderFuture};
pub use tool_name::{
    MAX_TOOL_NAME_LEN, NameCollisionError, ToolNameCodec, decode_tool_name, encode_tool_name,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
