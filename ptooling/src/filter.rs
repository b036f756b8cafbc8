//! Caller-level narrowing of the tools a turn may see and run.
//!
//! ```rust
//! use ptooling::{ToolAllowList, ToolFilter};
//!
//! let filter = ToolAllowList::new()
//!     .allow("analytics/get-metrics")
//!     .allow("ads/spend")
//!     .deny("ads/spend");
//!
//! assert!(filter.allows("analytics/get-metrics"));
//! assert!(!filter.allows("ads/spend"));
//! assert!(!filter.allows("search/queries"));
//! ```

use std::collections::HashSet;

use pprovider::ToolDefinition;

pub trait ToolFilter: Send + Sync {
    fn allows(&self, tool_name: &str) -> bool;

    fn filter(&self, tools: Vec<ToolDefinition>) -> Vec<ToolDefinition> {
        tools
            .into_iter()
            .filter(|tool| self.allows(&tool.name))
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllTools;

impl ToolFilter for AllowAllTools {
    fn allows(&self, _tool_name: &str) -> bool {
        true
    }
}

/// Explicit allow and deny sets. Deny wins; an unset allow set admits everything not denied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolAllowList {
    allowed: Option<HashSet<String>>,
    denied: HashSet<String>,
}

impl ToolAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), Self::allow)
    }

    pub fn allow(mut self, tool_name: impl Into<String>) -> Self {
        self.allowed
            .get_or_insert_with(HashSet::new)
            .insert(tool_name.into());
        self
    }

    pub fn deny(mut self, tool_name: impl Into<String>) -> Self {
        self.denied.insert(tool_name.into());
        self
    }
}

impl ToolFilter for ToolAllowList {
    fn allows(&self, tool_name: &str) -> bool {
        if self.denied.contains(tool_name) {
            return false;
        }

        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(tool_name))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tools(names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .map(|name| ToolDefinition::new(*name, "", json!({"type": "object"})))
            .collect()
    }

    #[test]
    fn allow_all_keeps_every_tool() {
        let kept = AllowAllTools.filter(tools(&["a", "b"]));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn deny_only_list_admits_everything_else() {
        let filter = ToolAllowList::new().deny("b");
        let kept = filter.filter(tools(&["a", "b", "c"]));
        let names = kept.iter().map(|tool| tool.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn allow_list_from_names_excludes_unlisted_tools() {
        let filter = ToolAllowList::from_names(["a"]);
        assert!(filter.allows("a"));
        assert!(!filter.allows("b"));
    }
}
