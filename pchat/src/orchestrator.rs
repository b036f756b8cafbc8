//! Two-phase turn orchestration: complete, run requested tools, follow up.
//!
//! A turn appends the user message, asks the provider for a completion with the
//! filtered tool list, and either stores the answer directly or executes every
//! requested call, stores one tool message per call, and asks again with tool
//! use disabled. Tool failures never abort a turn; provider and store failures
//! do, carrying the [`TurnPhase`] they happened in. Messages already appended
//! stay appended.

use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use futures_util::stream::FuturesOrdered;
use pcommon::{ConversationId, GenerationOptions};
use pprovider::{
    Completion, CompletionRequest, Message, ModelProvider, ProviderError, ToolCall,
    ToolDefinition, ToolNameCodec, ToolResult, UsageStats,
};
use ptooling::{
    AbilityRegistry, AllowAllTools, DefaultToolRuntime, ToolError, ToolExecutionContext,
    ToolExecutionResult, ToolFilter, ToolRuntime,
};

use crate::{
    ChatError, ChatPolicy, ConversationStore, FailedTool, InMemoryConversationStore,
    NoopTurnHooks, ToolExecutionMode, TurnHooks, TurnPhase, TurnRequest, TurnResult,
};

pub struct OrchestratorBuilder {
    provider: Arc<dyn ModelProvider>,
    registry: Arc<dyn AbilityRegistry>,
    store: Option<Arc<dyn ConversationStore>>,
    tool_runtime: Option<Arc<dyn ToolRuntime>>,
    tool_filter: Arc<dyn ToolFilter>,
    hooks: Arc<dyn TurnHooks>,
    policy: ChatPolicy,
}

impl OrchestratorBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>, registry: Arc<dyn AbilityRegistry>) -> Self {
        Self {
            provider,
            registry,
            store: None,
            tool_runtime: None,
            tool_filter: Arc::new(AllowAllTools),
            hooks: Arc::new(NoopTurnHooks),
            policy: ChatPolicy::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the default runtime, which invokes the registry without a timeout.
    pub fn tool_runtime(mut self, tool_runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tool_runtime = Some(tool_runtime);
        self
    }

    pub fn tool_filter(mut self, tool_filter: Arc<dyn ToolFilter>) -> Self {
        self.tool_filter = tool_filter;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fails with a configuration error when two registry names share a wire name.
    pub fn build(self) -> Result<Orchestrator, ChatError> {
        let codec = self.registry.name_codec()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new()));
        let tool_runtime = self
            .tool_runtime
            .unwrap_or_else(|| Arc::new(DefaultToolRuntime::new(Arc::clone(&self.registry))));

        Ok(Orchestrator {
            provider: self.provider,
            registry: self.registry,
            store,
            tool_runtime,
            tool_filter: self.tool_filter,
            hooks: self.hooks,
            policy: self.policy,
            codec: Arc::new(codec),
        })
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    pub(crate) provider: Arc<dyn ModelProvider>,
    registry: Arc<dyn AbilityRegistry>,
    store: Arc<dyn ConversationStore>,
    tool_runtime: Arc<dyn ToolRuntime>,
    tool_filter: Arc<dyn ToolFilter>,
    hooks: Arc<dyn TurnHooks>,
    policy: ChatPolicy,
    pub(crate) codec: Arc<ToolNameCodec>,
}

impl Orchestrator {
    pub fn builder(
        provider: Arc<dyn ModelProvider>,
        registry: Arc<dyn AbilityRegistry>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder::new(provider, registry)
    }

    pub fn store(&self) -> Arc<dyn ConversationStore> {
        Arc::clone(&self.store)
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Tools the model may see after the caller's filter is applied.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        self.tool_filter.filter(self.registry.list_tools())
    }

    pub async fn run_turn(&self, request: TurnRequest) -> Result<TurnResult, ChatError> {
        let conversation_id = request.conversation_id.clone();
        let started = Instant::now();

        let outcome = self.drive_turn(request).await;
        match &outcome {
            Ok(result) => self
                .hooks
                .on_turn_complete(&conversation_id, result, started.elapsed()),
            Err(error) => self
                .hooks
                .on_turn_failure(&conversation_id, error, started.elapsed()),
        }

        outcome
    }

    async fn drive_turn(&self, request: TurnRequest) -> Result<TurnResult, ChatError> {
        if request.user_input.trim().is_empty() {
            return Err(ChatError::invalid_request("user_input must not be empty"));
        }
        self.ensure_provider_configured()
            .map_err(|error| error.in_phase(TurnPhase::AwaitingCompletion))?;

        let TurnRequest {
            conversation_id,
            user_input,
            system_prompt,
            generation,
            trace_id,
        } = request;
        let system_prompt = system_prompt.or_else(|| self.policy.system_prompt.clone());

        let phase = TurnPhase::AwaitingCompletion;
        self.hooks.on_phase(&conversation_id, phase);
        self.persist(&conversation_id, Message::user(user_input), phase)
            .await?;

        let first = self
            .complete(
                &conversation_id,
                system_prompt.as_deref(),
                self.available_tools(),
                generation,
                phase,
            )
            .await?;

        if !first.has_tool_calls() {
            let Completion {
                content,
                usage,
                stop_reason,
                ..
            } = first;
            self.persist(
                &conversation_id,
                Message::assistant(content.clone()).with_usage(usage),
                phase,
            )
            .await?;
            self.hooks.on_phase(&conversation_id, TurnPhase::Done);

            return Ok(TurnResult {
                conversation_id,
                content,
                tool_calls: None,
                tool_results: Vec::new(),
                usage,
                stop_reason,
                failed_tools: Vec::new(),
            });
        }

        let phase = TurnPhase::ToolCallsDetected;
        self.hooks.on_phase(&conversation_id, phase);
        let Completion {
            content,
            tool_calls,
            usage: first_usage,
            ..
        } = first;
        self.persist(
            &conversation_id,
            Message::assistant_with_tool_calls(content, tool_calls.clone()).with_usage(first_usage),
            phase,
        )
        .await?;

        let phase = TurnPhase::ExecutingTools;
        self.hooks.on_phase(&conversation_id, phase);
        let mut context = ToolExecutionContext::new(conversation_id.clone());
        if let Some(trace_id) = trace_id {
            context = context.with_trace_id(trace_id);
        }

        let mut tool_results = Vec::with_capacity(tool_calls.len());
        let mut failed_tools = Vec::new();
        match self.policy.tool_execution {
            ToolExecutionMode::Sequential => {
                for call in &tool_calls {
                    let outcome = self.execute_call(call, context.clone()).await;
                    let result = self
                        .record_outcome(&conversation_id, call, outcome, &mut failed_tools)
                        .await?;
                    tool_results.push(result);
                }
            }
            ToolExecutionMode::Concurrent => {
                // Yields in call order, so each result is stored as soon as
                // every earlier call has finished.
                let mut pending = tool_calls
                    .iter()
                    .map(|call| self.execute_call(call, context.clone()))
                    .collect::<FuturesOrdered<_>>();
                for call in &tool_calls {
                    let Some(outcome) = pending.next().await else {
                        break;
                    };
                    let result = self
                        .record_outcome(&conversation_id, call, outcome, &mut failed_tools)
                        .await?;
                    tool_results.push(result);
                }
            }
        }

        let phase = TurnPhase::AwaitingFollowUp;
        self.hooks.on_phase(&conversation_id, phase);
        let follow_up = self
            .complete(
                &conversation_id,
                system_prompt.as_deref(),
                Vec::new(),
                generation,
                phase,
            )
            .await?;

        if follow_up.has_tool_calls() {
            tracing::warn!(
                conversation_id = %conversation_id,
                ignored = follow_up.tool_calls.len(),
                "follow-up completion requested tools while tool use was disabled"
            );
        }

        let usage = UsageStats::accumulate(Some(&first_usage), Some(&follow_up.usage));
        self.persist(
            &conversation_id,
            Message::assistant(follow_up.content.clone()).with_usage(usage),
            phase,
        )
        .await?;
        self.hooks.on_phase(&conversation_id, TurnPhase::Done);

        Ok(TurnResult {
            conversation_id,
            content: follow_up.content,
            tool_calls: Some(tool_calls),
            tool_results,
            usage,
            stop_reason: follow_up.stop_reason,
            failed_tools,
        })
    }

    pub(crate) fn ensure_provider_configured(&self) -> Result<(), ChatError> {
        let errors = self.provider.configuration_errors();
        if errors.is_empty() {
            return Ok(());
        }

        Err(ProviderError::not_configured(format!(
            "{} provider is not configured: {}",
            self.provider.kind(),
            errors.join("; ")
        ))
        .into())
    }

    async fn persist(
        &self,
        conversation_id: &ConversationId,
        message: Message,
        phase: TurnPhase,
    ) -> Result<(), ChatError> {
        self.store
            .append(conversation_id, message)
            .await
            .map(|_| ())
            .map_err(|error| error.in_phase(phase))
    }

    /// Completes over the stored history with the system prompt prepended.
    async fn complete(
        &self,
        conversation_id: &ConversationId,
        system_prompt: Option<&str>,
        tools: Vec<ToolDefinition>,
        generation: GenerationOptions,
        phase: TurnPhase,
    ) -> Result<Completion, ChatError> {
        let history = self
            .store
            .list(conversation_id)
            .await
            .map_err(|error| error.in_phase(phase))?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = system_prompt.filter(|prompt| !prompt.trim().is_empty()) {
            messages.push(Message::system(prompt));
        }
        messages.extend(history);

        let request = CompletionRequest::new(messages)
            .with_tools(tools)
            .with_codec(Arc::clone(&self.codec))
            .with_generation(generation);

        self.provider
            .complete(request)
            .await
            .map_err(|error| ChatError::from(error).in_phase(phase))
    }

    /// Converts one outcome into a tool message and stores it right away.
    async fn record_outcome(
        &self,
        conversation_id: &ConversationId,
        call: &ToolCall,
        outcome: Result<ToolExecutionResult, ToolError>,
        failed_tools: &mut Vec<FailedTool>,
    ) -> Result<ToolResult, ChatError> {
        let result = match outcome {
            Ok(executed) => executed.into_tool_result(),
            Err(error) => {
                tracing::debug!(
                    tool = %call.name,
                    call_id = %call.id,
                    error = %error,
                    "tool call failed; reporting failure to the model"
                );
                failed_tools.push(FailedTool::new(call, &error));
                ToolResult::failure(call, &error.message)
            }
        };
        self.persist(
            conversation_id,
            Message::tool_result(&result),
            TurnPhase::ExecutingTools,
        )
        .await?;
        Ok(result)
    }

    /// Runs one call, refusing names the caller's filter excludes.
    pub(crate) async fn execute_call(
        &self,
        call: &ToolCall,
        context: ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        if !self.tool_filter.allows(&call.name) {
            return Err(ToolError::not_available(&call.name)
                .with_tool_name(call.name.clone())
                .with_tool_call_id(call.id.clone()));
        }

        self.tool_runtime.execute(call, context).await
    }
}
