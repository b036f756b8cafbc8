//! [`ModelProvider`] implementation that pairs an adapter with an HTTP transport.
//!
//! ```rust
//! use pprovider::{ModelProvider, ProviderClient, ProviderConfig, ProviderKind};
//!
//! let client = ProviderClient::from_config(ProviderConfig::with_default_model(ProviderKind::Anthropic))
//!     .expect("transport should build");
//! assert_eq!(client.kind(), ProviderKind::Anthropic);
//! assert!(!client.is_configured());
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::{
    Completion, CompletionRequest, HttpTransport, ModelProvider, NoopProviderHooks,
    ProviderAdapter, ProviderConfig, ProviderError, ProviderFuture, ProviderKind,
    ProviderOperationHooks, ReqwestTransport, RequestOptions, build_adapter,
};

#[derive(Clone)]
pub struct ProviderClient {
    adapter: Arc<dyn ProviderAdapter>,
    transport: Arc<dyn HttpTransport>,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl ProviderClient {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            adapter,
            transport,
            hooks: Arc::new(NoopProviderHooks),
        }
    }

    /// Adapter chosen by [`ProviderConfig::kind`] over a reqwest transport with the configured timeout.
    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(build_adapter(config), Arc::new(transport)))
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }

    pub fn config(&self) -> &ProviderConfig {
        self.adapter.config()
    }

    async fn send(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let options = RequestOptions::new(&request.codec).with_generation(request.generation);
        let http_request =
            self.adapter
                .build_request(&request.messages, &request.tools, &options)?;

        let response = self.transport.post_json(http_request).await?;
        if !response.is_success() {
            let message = self
                .adapter
                .extract_error_message(&response.body)
                .unwrap_or_else(|| {
                    format!(
                        "{} request failed with status {}",
                        self.adapter.kind(),
                        response.status
                    )
                });
            return Err(ProviderError::api(response.status, message));
        }

        let raw = serde_json::from_str::<Value>(&response.body).map_err(|err| {
            ProviderError::invalid_response(format!("response body is not valid JSON: {err}"))
        })?;

        self.adapter.parse_response(&raw, &request.codec)
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("kind", &self.adapter.kind())
            .field("model", &self.adapter.config().model)
            .field("transport", &self.transport)
            .finish()
    }
}

impl ModelProvider for ProviderClient {
    fn kind(&self) -> ProviderKind {
        self.adapter.kind()
    }

    fn configuration_errors(&self) -> Vec<String> {
        self.adapter.configuration_errors()
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<Completion, ProviderError>> {
        Box::pin(async move {
            let errors = self.configuration_errors();
            if !errors.is_empty() {
                return Err(ProviderError::not_configured(errors.join("; ")));
            }

            let kind = self.adapter.kind();
            let model = self.adapter.config().model.as_str();
            self.hooks.on_request_start(kind, model);
            let started = Instant::now();

            let result = self.send(request).await;
            match &result {
                Ok(completion) => {
                    self.hooks
                        .on_success(kind, model, &completion.usage, started.elapsed())
                }
                Err(error) => self.hooks.on_failure(kind, model, error, started.elapsed()),
            }

            result
        })
    }
}
