//! Provider-agnostic message, tool, and completion model types.
//!
//! ```rust
//! use pprovider::{Message, Role, ToolCall, ToolResult, UsageStats};
//!
//! let call = ToolCall::new("t1", "get-metrics", serde_json::Map::new());
//! let assistant = Message::assistant_with_tool_calls("", vec![call.clone()]);
//! assert!(assistant.has_tool_calls());
//!
//! let result = ToolResult::success(&call, "{\"visits\":12}");
//! let tool = Message::tool_result(&result);
//! assert_eq!(tool.role, Role::Tool);
//! assert_eq!(tool.tool_call_id.as_deref(), Some("t1"));
//!
//! let total = UsageStats::accumulate(Some(&UsageStats::new(10, 2)), None);
//! assert_eq!(total.input_tokens, 10);
//! ```

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured tool-call arguments. An empty map is the explicit "no arguments" value.
pub type ToolArguments = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        };

        f.write_str(role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            usage: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id.clone()),
            ..Self::new(Role::Tool, result.content.clone())
        }
    }

    pub fn with_usage(mut self, usage: UsageStats) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Arguments rendered as a JSON object string; `{}` when there are none.
    pub fn arguments_json(&self) -> String {
        Value::Object(self.arguments.clone()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub content: String,
    pub succeeded: bool,
}

impl ToolResult {
    pub fn success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            succeeded: true,
        }
    }

    pub fn failure(call: &ToolCall, error: impl Display) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: format!("Error: {error}"),
            succeeded: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl UsageStats {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: None,
        }
    }

    pub fn with_total(mut self, total_tokens: u64) -> Self {
        self.total_tokens = Some(total_tokens);
        self
    }

    /// Reported total, or input plus output when the provider did not send one.
    pub fn total(&self) -> u64 {
        self.total_tokens
            .unwrap_or_else(|| self.input_tokens.saturating_add(self.output_tokens))
    }

    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.total() == 0
    }

    /// Sums two optional usage records. A missing side counts as zero.
    ///
    /// The sum carries a total only when at least one side reported one.
    pub fn accumulate(first: Option<&UsageStats>, second: Option<&UsageStats>) -> UsageStats {
        let a = first.copied().unwrap_or_default();
        let b = second.copied().unwrap_or_default();
        let total_tokens = match (a.total_tokens, b.total_tokens) {
            (None, None) => None,
            _ => Some(a.total().saturating_add(b.total())),
        };

        UsageStats {
            input_tokens: a.input_tokens.saturating_add(b.input_tokens),
            output_tokens: a.output_tokens.saturating_add(b.output_tokens),
            total_tokens,
        }
    }
}

impl Add for UsageStats {
    type Output = UsageStats;

    fn add(self, rhs: UsageStats) -> Self::Output {
        UsageStats::accumulate(Some(&self), Some(&rhs))
    }
}

impl AddAssign for UsageStats {
    fn add_assign(&mut self, rhs: UsageStats) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    ContentFilter,
    Other,
}

/// One parsed provider completion in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub model: String,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: UsageStats,
    pub stop_reason: StopReason,
}

impl Completion {
    pub fn text(model: impl Into<String>, content: impl Into<String>, usage: UsageStats) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            tool_calls: Vec::new(),
            usage,
            stop_reason: StopReason::EndTurn,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Joins text segments the way every adapter reports multi-part output.
pub(crate) fn join_text_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .filter(|segment| !segment.as_ref().is_empty())
        .map(|segment| segment.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}
