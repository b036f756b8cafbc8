//! Observability hooks for provider calls, tool executions and chat turns.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pobserve::{MetricsObservabilityHooks, SafeProviderHooks, SafeTurnHooks, TracingObservabilityHooks};
//! use pprovider::{ProviderClient, ProviderConfig, ProviderKind};
//!
//! let client = ProviderClient::from_config(ProviderConfig::with_default_model(ProviderKind::Gemini))
//!     .expect("client")
//!     .with_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)));
//!
//! let _turn_hooks = SafeTurnHooks::new(MetricsObservabilityHooks);
//! assert!(!pprovider::ModelProvider::is_configured(&client));
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeProviderHooks, SafeToolHooks, SafeTurnHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeProviderHooks, SafeToolHooks, SafeTurnHooks,
        TracingObservabilityHooks,
    };
}
