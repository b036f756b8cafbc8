//! Tool name encoding for provider identifier restrictions.
//!
//! Registry names use `/` as a category separator, but provider wire formats only accept
//! `[A-Za-z0-9_-]` identifiers of at most [`MAX_TOOL_NAME_LEN`] characters.
//!
//! ```rust
//! use pprovider::{ToolNameCodec, decode_tool_name, encode_tool_name};
//!
//! assert_eq!(encode_tool_name("cat/action-name"), "cat__action-name");
//! assert_eq!(decode_tool_name("cat__action-name"), "cat/action-name");
//!
//! let codec = ToolNameCodec::from_names(["analytics/get.report"]).expect("no collisions");
//! let wire = codec.encode("analytics/get.report");
//! assert_eq!(wire, "analytics__get_report");
//! assert_eq!(codec.decode(&wire), "analytics/get.report");
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_TOOL_NAME_LEN: usize = 128;

const SEPARATOR: char = '/';
const SEPARATOR_SUBSTITUTE: &str = "__";
const FORBIDDEN_SUBSTITUTE: char = '_';

pub fn encode_tool_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch == SEPARATOR {
            encoded.push_str(SEPARATOR_SUBSTITUTE);
        } else if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            encoded.push(ch);
        } else {
            encoded.push(FORBIDDEN_SUBSTITUTE);
        }
    }

    if encoded.len() > MAX_TOOL_NAME_LEN {
        // Encoded output is pure ASCII, so byte truncation is char-safe.
        encoded.truncate(MAX_TOOL_NAME_LEN);
    }

    encoded
}

pub fn decode_tool_name(wire_name: &str) -> String {
    wire_name.replace(SEPARATOR_SUBSTITUTE, &SEPARATOR.to_string())
}

/// Two registry names that share one wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollisionError {
    pub wire_name: String,
    pub first: String,
    pub second: String,
}

impl Display for NameCollisionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tool names '{}' and '{}' both encode to '{}'",
            self.first, self.second, self.wire_name
        )
    }
}

impl Error for NameCollisionError {}

/// Lossless wire-name mapping for a known set of registry names.
///
/// Names the table has never seen fall back to [`decode_tool_name`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolNameCodec {
    by_wire: HashMap<String, String>,
}

impl ToolNameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, NameCollisionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_wire: HashMap<String, String> = HashMap::new();
        for name in names {
            let name = name.as_ref();
            let wire_name = encode_tool_name(name);
            match by_wire.get(&wire_name) {
                Some(existing) if existing != name => {
                    return Err(NameCollisionError {
                        wire_name,
                        first: existing.clone(),
                        second: name.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    by_wire.insert(wire_name, name.to_string());
                }
            }
        }

        Ok(Self { by_wire })
    }

    pub fn encode(&self, name: &str) -> String {
        encode_tool_name(name)
    }

    pub fn decode(&self, wire_name: &str) -> String {
        self.by_wire
            .get(wire_name)
            .cloned()
            .unwrap_or_else(|| decode_tool_name(wire_name))
    }

    pub fn len(&self) -> usize {
        self.by_wire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wire.is_empty()
    }
}
