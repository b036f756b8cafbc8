//! Ability registry contract and the in-process tool registry.

use std::future::Future;
use std::sync::Arc;

use pcommon::Registry;
use pprovider::{NameCollisionError, ToolArguments, ToolDefinition, ToolNameCodec};

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext, ToolFuture};

/// External source of callable tools.
///
/// Names may contain `/`; wire encoding is handled by the provider layer.
pub trait AbilityRegistry: Send + Sync {
    fn list_tools(&self) -> Vec<ToolDefinition>;

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a ToolArguments,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;

    /// Wire-name table for the listed tools; fails if two names encode identically.
    fn name_codec(&self) -> Result<ToolNameCodec, NameCollisionError> {
        ToolNameCodec::from_names(self.list_tools().iter().map(|tool| tool.name.as_str()))
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Result<String, ToolError>
            + Send
            + Sync
            + 'static,
    {
        self.register_fn(definition, move |arguments, context| {
            let output = handler(arguments, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    /// Definitions ordered by name so provider payloads are stable.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = self
            .tools
            .values()
            .map(|tool| tool.definition())
            .collect::<Vec<_>>();
        definitions.sort_by(|left, right| left.name.cmp(&right.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl AbilityRegistry for ToolRegistry {
    fn list_tools(&self) -> Vec<ToolDefinition> {
        self.definitions()
    }

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a ToolArguments,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let tool = self
                .get(name)
                .ok_or_else(|| ToolError::not_found(format!("tool '{name}' is not registered")))?;
            tool.invoke(arguments, context).await
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, format!("{name} tool"), json!({"type": "object"}))
    }

    #[test]
    fn registry_tracks_registered_tools_in_name_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_sync_fn(definition("search/queries"), |_, _| Ok("[]".into()));
        registry.register_sync_fn(definition("analytics/get-metrics"), |_, _| Ok("{}".into()));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("analytics/get-metrics"));

        let names = registry
            .list_tools()
            .into_iter()
            .map(|tool| tool.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["analytics/get-metrics", "search/queries"]);

        assert!(registry.remove("search/queries").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn name_codec_detects_wire_collisions() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(definition("reports/daily"), |_, _| Ok(String::new()));
        registry.register_sync_fn(definition("reports__daily"), |_, _| Ok(String::new()));

        let error = registry.name_codec().expect_err("names should collide");
        assert_eq!(error.wire_name, "reports__daily");
    }

    #[tokio::test]
    async fn invoke_dispatches_by_registry_name() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(definition("analytics/get-metrics"), |args, ctx| async move {
            Ok(format!(
                "{}:{}",
                ctx.conversation_id,
                args.get("days").cloned().unwrap_or_default()
            ))
        });

        let arguments = json!({"days": 7}).as_object().cloned().unwrap_or_default();
        let context = ToolExecutionContext::new("conv-1");
        let output = registry
            .invoke("analytics/get-metrics", &arguments, &context)
            .await
            .expect("tool should run");
        assert_eq!(output, "conv-1:7");

        let error = registry
            .invoke("missing", &arguments, &context)
            .await
            .expect_err("unknown tool should fail");
        assert_eq!(error.kind, ToolErrorKind::NotFound);
    }
}
