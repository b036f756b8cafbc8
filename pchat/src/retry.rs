//! Standalone re-execution of one tool, with an optional one-shot summary.
//!
//! A retry reads no conversation history and appends nothing. The summary, when
//! requested, comes from an ephemeral completion with tool use disabled.
//!
//! ```rust
//! use pchat::format_tool_output;
//!
//! assert_eq!(format_tool_output("{\"visits\":3}"), "{\n  \"visits\": 3\n}");
//! assert_eq!(format_tool_output("plain text"), "plain text");
//! ```

use std::sync::Arc;

use pprovider::{CompletionRequest, Message, ToolCall, ToolResult, UsageStats};
use ptooling::ToolExecutionContext;
use serde_json::Value;

use crate::{ChatError, Orchestrator, RetryRequest, RetryResult};

const RETRY_CALL_ID: &str = "retry-1";

const SUMMARY_INSTRUCTION: &str = "You summarize the output of a single tool call for the user. \
Answer in a few plain sentences, highlight notable numbers, and do not invent data that is not \
in the result.";

/// Pretty-prints JSON objects and arrays; any other text is returned unchanged.
pub fn format_tool_output(content: &str) -> String {
    match serde_json::from_str::<Value>(content) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.to_string())
        }
        _ => content.to_string(),
    }
}

impl Orchestrator {
    pub async fn retry_tool(&self, request: RetryRequest) -> Result<RetryResult, ChatError> {
        let RetryRequest {
            conversation_id,
            tool_name,
            arguments,
            summarize,
        } = request;

        if tool_name.trim().is_empty() {
            return Err(ChatError::invalid_request("tool_name must not be empty"));
        }
        if summarize {
            self.ensure_provider_configured()?;
        }

        let call = ToolCall::new(RETRY_CALL_ID, tool_name.clone(), arguments.clone());
        let (succeeded, content) = match self
            .execute_call(&call, ToolExecutionContext::new(conversation_id))
            .await
        {
            Ok(executed) => (true, executed.output),
            Err(error) => (false, ToolResult::failure(&call, &error.message).content),
        };
        let formatted = format_tool_output(&content);

        let (summary, usage) = if summarize && succeeded {
            let prompt = format!("Result of the '{tool_name}' tool:\n\n{formatted}");
            let request = CompletionRequest::new(vec![
                Message::system(SUMMARY_INSTRUCTION),
                Message::user(prompt),
            ])
            .with_codec(Arc::clone(&self.codec));

            let completion = self.provider.complete(request).await?;
            (Some(completion.content), completion.usage)
        } else {
            (None, UsageStats::default())
        };

        Ok(RetryResult {
            tool_name,
            arguments,
            succeeded,
            content,
            formatted,
            summary,
            usage,
        })
    }
}
