//! Tool executor: runs one model-requested call against an ability registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use pprovider::ToolCall;

use crate::{
    AbilityRegistry, NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult,
    ToolFuture, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<dyn AbilityRegistry>,
    timeout: Option<Duration>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<dyn AbilityRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<dyn AbilityRegistry> {
        Arc::clone(&self.registry)
    }

    async fn invoke(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<String, ToolError> {
        let invocation = self
            .registry
            .invoke(&tool_call.name, &tool_call.arguments, context);

        match self.timeout {
            None => invocation.await,
            Some(limit) => match select(invocation, Delay::new(limit)).await {
                Either::Left((result, _)) => result,
                Either::Right(_) => {
                    self.hooks.on_execution_timeout(tool_call, context, limit);
                    Err(ToolError::timed_out_after(limit))
                }
            },
        }
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(tool_call, &context);
            let started = Instant::now();

            match self.invoke(tool_call, &context).await {
                Ok(output) => {
                    let result = ToolExecutionResult::from_call(tool_call, output);
                    self.hooks.on_execution_success(
                        tool_call,
                        &context,
                        &result,
                        started.elapsed(),
                    );
                    Ok(result)
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks
                        .on_execution_failure(tool_call, &context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }
}
