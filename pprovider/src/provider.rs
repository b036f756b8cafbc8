use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use pcommon::GenerationOptions;

use crate::{Completion, Message, ProviderError, ProviderKind, ToolDefinition, ToolNameCodec};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One completion call: the full history plus the tools the model may call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub codec: Arc<ToolNameCodec>,
    pub generation: GenerationOptions,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            codec: Arc::new(ToolNameCodec::new()),
            generation: GenerationOptions::default(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_codec(mut self, codec: Arc<ToolNameCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }
}

pub trait ModelProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn configuration_errors(&self) -> Vec<String>;

    fn is_configured(&self) -> bool {
        self.configuration_errors().is_empty()
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<Completion, ProviderError>>;
}
