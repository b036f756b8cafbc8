pub mod anthropic;
pub mod gemini;
pub mod openai;

use serde_json::Value;

use crate::{ProviderError, ToolArguments};

/// Converts a provider-supplied argument value into the canonical object form.
///
/// Anything other than an object degrades to "no arguments" so one malformed call
/// cannot fail the whole completion.
pub(crate) fn arguments_from_value(value: Value, tool_name: &str) -> ToolArguments {
    match value {
        Value::Object(map) => map,
        Value::Null => ToolArguments::new(),
        other => {
            tracing::warn!(
                tool_name,
                argument_type = json_type_name(&other),
                "tool call arguments are not a JSON object, using empty arguments"
            );
            ToolArguments::new()
        }
    }
}

pub(crate) fn arguments_from_json_str(raw: &str, tool_name: &str) -> ToolArguments {
    if raw.trim().is_empty() {
        return ToolArguments::new();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => arguments_from_value(value, tool_name),
        Err(err) => {
            tracing::warn!(
                tool_name,
                error = %err,
                "failed to parse tool call arguments, using empty arguments"
            );
            ToolArguments::new()
        }
    }
}

pub(crate) fn decode_body<T>(raw: &Value, provider: &str) -> Result<T, ProviderError>
where
    T: serde::de::DeserializeOwned,
{
    T::deserialize(raw).map_err(|err| {
        ProviderError::invalid_response(format!("unexpected {provider} response shape: {err}"))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
