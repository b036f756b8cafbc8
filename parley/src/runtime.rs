//! Runtime wiring: configuration plus a registry in, a ready orchestrator out.

use std::sync::Arc;

use pobserve::{SafeProviderHooks, SafeToolHooks, SafeTurnHooks, TracingObservabilityHooks};

use crate::{
    AbilityRegistry, AppConfig, ChatError, ConversationStore, DefaultToolRuntime,
    InMemoryConversationStore, ModelProvider, Orchestrator, ProviderClient,
};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub config: AppConfig,
    pub provider: Arc<dyn ModelProvider>,
    pub store: Arc<dyn ConversationStore>,
    pub orchestrator: Orchestrator,
}

/// HTTP client for the configured provider with tracing hooks attached.
pub fn provider_client(config: &AppConfig) -> Result<ProviderClient, ChatError> {
    let client = ProviderClient::from_config(config.provider.clone())?;
    Ok(client.with_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks))))
}

pub fn build_runtime(
    config: AppConfig,
    registry: Arc<dyn AbilityRegistry>,
) -> Result<RuntimeBundle, ChatError> {
    build_runtime_with_store(config, registry, Arc::new(InMemoryConversationStore::new()))
}

pub fn build_runtime_with_store(
    config: AppConfig,
    registry: Arc<dyn AbilityRegistry>,
    store: Arc<dyn ConversationStore>,
) -> Result<RuntimeBundle, ChatError> {
    let provider: Arc<dyn ModelProvider> = Arc::new(provider_client(&config)?);
    build_runtime_with(config, provider, registry, store)
}

/// Wires any provider, including test fakes, into an orchestrator.
pub fn build_runtime_with(
    config: AppConfig,
    provider: Arc<dyn ModelProvider>,
    registry: Arc<dyn AbilityRegistry>,
    store: Arc<dyn ConversationStore>,
) -> Result<RuntimeBundle, ChatError> {
    let mut tool_runtime = DefaultToolRuntime::new(Arc::clone(&registry))
        .with_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)));
    if let Some(timeout) = config.tool_timeout {
        tool_runtime = tool_runtime.with_timeout(timeout);
    }

    let orchestrator = Orchestrator::builder(Arc::clone(&provider), registry)
        .store(Arc::clone(&store))
        .tool_runtime(Arc::new(tool_runtime))
        .tool_filter(config.tool_filter())
        .hooks(Arc::new(SafeTurnHooks::new(TracingObservabilityHooks)))
        .policy(config.chat_policy())
        .build()?;

    Ok(RuntimeBundle {
        config,
        provider,
        store,
        orchestrator,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        ChatErrorKind, Completion, CompletionRequest, ConversationId, ProviderConfig,
        ProviderError, ProviderFuture, ProviderKind, ToolCall, ToolDefinition, ToolRegistry,
        TurnRequest, UsageStats,
    };

    struct FakeProvider {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ModelProvider for FakeProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Anthropic
        }

        fn configuration_errors(&self) -> Vec<String> {
            Vec::new()
        }

        fn complete<'a>(
            &'a self,
            request: CompletionRequest,
        ) -> ProviderFuture<'a, Result<Completion, ProviderError>> {
            Box::pin(async move {
                let first = request.tools.len();
                self.requests.lock().expect("requests lock").push(request);
                if first > 0 {
                    Ok(Completion {
                        tool_calls: vec![ToolCall::new("t1", "ads/spend", Default::default())],
                        ..Completion::text("fake", "", UsageStats::new(3, 1))
                    })
                } else {
                    Ok(Completion::text("fake", "done", UsageStats::new(4, 2)))
                }
            })
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register_fn(
            ToolDefinition::new("ads/spend", "Ad spend", json!({"type": "object"})),
            |_, _| async {
                futures_timer::Delay::new(Duration::from_millis(200)).await;
                Ok("{}".to_string())
            },
        );
        registry.register_sync_fn(
            ToolDefinition::new("search/queries", "Top queries", json!({"type": "object"})),
            |_, _| Ok("[]".to_string()),
        );
        Arc::new(registry)
    }

    #[tokio::test]
    async fn runtime_applies_config_filter_timeout_and_prompt() {
        let provider = Arc::new(FakeProvider {
            requests: Mutex::new(Vec::new()),
        });
        let config = AppConfig::new(ProviderConfig::with_default_model(ProviderKind::Anthropic))
            .with_system_prompt("Be brief.")
            .with_enabled_tools(["ads/spend"])
            .with_tool_timeout(Duration::from_millis(20));

        let runtime = build_runtime_with(
            config,
            provider.clone(),
            registry(),
            Arc::new(InMemoryConversationStore::new()),
        )
        .expect("runtime");

        let result = runtime
            .orchestrator
            .run_turn(TurnRequest::new("conv-1", "how much did we spend?"))
            .await
            .expect("turn");

        assert_eq!(result.content, "done");
        assert_eq!(result.failed_tools.len(), 1);
        assert!(result.failed_tools[0].error.contains("did not finish within 20ms"));

        {
            let requests = provider.requests.lock().expect("requests lock");
            assert_eq!(requests[0].messages[0].content, "Be brief.");
            assert_eq!(requests[0].tools.len(), 1);
        }

        let stored = runtime
            .store
            .list(&ConversationId::from("conv-1"))
            .await
            .expect("history");
        assert_eq!(stored.len(), 4);
    }

    #[test]
    fn colliding_registry_is_rejected_at_startup() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("a/b", "", json!({"type": "object"})),
            |_, _| Ok(String::new()),
        );
        registry.register_sync_fn(
            ToolDefinition::new("a__b", "", json!({"type": "object"})),
            |_, _| Ok(String::new()),
        );

        let error = build_runtime(
            AppConfig::new(ProviderConfig::with_default_model(ProviderKind::OpenAi)),
            Arc::new(registry),
        )
        .err()
        .expect("runtime should not build");
        assert_eq!(error.kind, ChatErrorKind::Configuration);
    }
}
