//! Typed accessors over structured tool arguments.
//!
//! ```rust
//! use ptooling::{optional_u64, parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"site":"example.com","days":7}"#).expect("object should parse");
//! assert_eq!(required_string(&args, "site").expect("site"), "example.com");
//! assert_eq!(optional_u64(&args, "days").expect("days"), Some(7));
//! ```

use pprovider::ToolArguments;
use serde_json::Value;

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    Ok(serde_json::from_str(args_json)?)
}

/// Parses a JSON object; a blank string is the empty argument set.
pub fn parse_json_object(args_json: &str) -> Result<ToolArguments, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(ToolArguments::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(args: &ToolArguments, key: &str) -> Result<String, ToolError> {
    optional_string(args, key)?
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &ToolArguments, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "argument '{key}' must be a string"
        ))),
    }
}

pub fn optional_u64(args: &ToolArguments, key: &str) -> Result<Option<u64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "argument '{key}' must be a non-negative integer"
            ))
        }),
    }
}
