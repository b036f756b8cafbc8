//! OpenAI chat-completions adapter.

mod serde_api;
mod tests;

use serde_json::Value;

use crate::adapter::{effective_generation, ensure_history};
use crate::{
    Completion, Message, ProviderAdapter, ProviderConfig, ProviderError, ProviderKind,
    ProviderRequest, RequestOptions, ToolDefinition, ToolNameCodec,
};

use super::decode_body;
use serde_api::{ApiRequestParts, OpenAiApiResponse, build_api_request};

pub use serde_api::is_reasoning_model;

#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    config: ProviderConfig,
}

impl OpenAiAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url())
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
        options: &RequestOptions<'_>,
    ) -> Result<ProviderRequest, ProviderError> {
        ensure_history(history)?;
        let generation = effective_generation(&self.config, options);

        let api_request = build_api_request(ApiRequestParts {
            model: &self.config.model,
            history,
            tools,
            codec: options.codec,
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        })?;

        let body = serde_json::to_value(api_request).map_err(|err| {
            ProviderError::invalid_request(format!("failed to encode OpenAI request: {err}"))
        })?;

        let mut request = ProviderRequest::new(self.endpoint(), body);
        if let Some(key) = &self.config.api_key {
            request = request.with_header("authorization", format!("Bearer {}", key.expose()));
        }

        Ok(request)
    }

    fn parse_response(
        &self,
        raw: &Value,
        codec: &ToolNameCodec,
    ) -> Result<Completion, ProviderError> {
        let response: OpenAiApiResponse = decode_body(raw, "OpenAI")?;
        response.into_completion(&self.config.model, codec)
    }
}
