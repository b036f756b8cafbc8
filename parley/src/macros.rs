/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use parley::{Role, pl_msg};
///
/// let message = pl_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! pl_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant; tool messages need a call id")
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use parley::{Role, pl_messages};
///
/// let messages = pl_messages![
///     system => "You are concise.",
///     user => "How many visits last week?",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! pl_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::pl_msg!($role => $content)),+]
    };
}

/// Builds a [`ToolDefinition`](crate::ToolDefinition) with an inline JSON schema.
///
/// ```rust
/// use parley::pl_tool;
///
/// let tool = pl_tool!("analytics/get-metrics", "Site metrics for the last N days", {
///     "type": "object",
///     "properties": {"days": {"type": "integer"}},
///     "required": ["days"]
/// });
///
/// assert_eq!(tool.name, "analytics/get-metrics");
/// assert_eq!(tool.input_schema["required"][0], "days");
/// ```
#[macro_export]
macro_rules! pl_tool {
    ($name:expr, $description:expr $(,)?) => {
        $crate::ToolDefinition::new(
            $name,
            $description,
            $crate::__serde_json::json!({"type": "object", "properties": {}}),
        )
    };
    ($name:expr, $description:expr, $($schema:tt)+) => {
        $crate::ToolDefinition::new($name, $description, $crate::__serde_json::json!($($schema)+))
    };
}

/// Creates a [`TurnRequest`](crate::TurnRequest), optionally with a system prompt.
///
/// ```rust
/// use parley::pl_turn;
///
/// let request = pl_turn!("conv-1", "How is traffic?", "Answer with numbers.");
/// assert_eq!(request.conversation_id.as_str(), "conv-1");
/// assert_eq!(request.system_prompt.as_deref(), Some("Answer with numbers."));
/// ```
#[macro_export]
macro_rules! pl_turn {
    ($conversation_id:expr, $user_input:expr $(,)?) => {
        $crate::TurnRequest::new($conversation_id, $user_input)
    };
    ($conversation_id:expr, $user_input:expr, $system_prompt:expr $(,)?) => {
        $crate::TurnRequest::new($conversation_id, $user_input).with_system_prompt($system_prompt)
    };
}
