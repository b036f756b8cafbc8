//! Stateless translation between canonical messages and provider wire JSON.
//!
//! ```rust
//! use pprovider::{Message, ProviderConfig, ProviderKind, RequestOptions, ToolNameCodec, build_adapter};
//!
//! let adapter = build_adapter(ProviderConfig::with_default_model(ProviderKind::Gemini));
//! assert!(!adapter.is_configured());
//!
//! let codec = ToolNameCodec::new();
//! let request = adapter
//!     .build_request(&[Message::user("hi")], &[], &RequestOptions::new(&codec))
//!     .expect("request should build");
//! assert!(request.url.ends_with(":generateContent"));
//! ```

use std::sync::Arc;

use pcommon::GenerationOptions;
use serde_json::Value;

use crate::adapters::anthropic::AnthropicAdapter;
use crate::adapters::gemini::GeminiAdapter;
use crate::adapters::openai::OpenAiAdapter;
use crate::{
    Completion, Message, ProviderConfig, ProviderError, ProviderKind, SecretString,
    ToolDefinition, ToolNameCodec,
};

/// Fully-built HTTP request for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, SecretString)>,
    pub body: Value,
}

impl ProviderRequest {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<SecretString>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.expose())
    }
}

/// Per-call inputs that are not part of the conversation itself.
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions<'a> {
    pub codec: &'a ToolNameCodec,
    pub generation: GenerationOptions,
}

impl<'a> RequestOptions<'a> {
    pub fn new(codec: &'a ToolNameCodec) -> Self {
        Self {
            codec,
            generation: GenerationOptions::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }
}

pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn config(&self) -> &ProviderConfig;

    fn configuration_errors(&self) -> Vec<String> {
        self.config().configuration_errors()
    }

    fn is_configured(&self) -> bool {
        self.configuration_errors().is_empty()
    }

    fn build_request(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
        options: &RequestOptions<'_>,
    ) -> Result<ProviderRequest, ProviderError>;

    fn parse_response(
        &self,
        raw: &Value,
        codec: &ToolNameCodec,
    ) -> Result<Completion, ProviderError>;

    /// Pulls the human-readable message out of a provider error body.
    fn extract_error_message(&self, body: &str) -> Option<String> {
        let parsed = serde_json::from_str::<Value>(body).ok()?;
        parsed
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }
}

pub fn build_adapter(config: ProviderConfig) -> Arc<dyn ProviderAdapter> {
    match config.kind {
        ProviderKind::Anthropic => Arc::new(AnthropicAdapter::new(config)),
        ProviderKind::OpenAi => Arc::new(OpenAiAdapter::new(config)),
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(config)),
    }
}

pub(crate) fn ensure_history(history: &[Message]) -> Result<(), ProviderError> {
    if history.is_empty() {
        return Err(ProviderError::invalid_request(
            "at least one message is required",
        ));
    }

    Ok(())
}

/// Per-call options layered over the adapter's configured defaults.
pub(crate) fn effective_generation(
    config: &ProviderConfig,
    options: &RequestOptions<'_>,
) -> GenerationOptions {
    options.generation.or(config.generation_defaults())
}
