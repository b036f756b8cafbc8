//! Process configuration read once at startup.
//!
//! Adapters never read the environment themselves; everything they need is
//! carried by the [`ProviderConfig`] built here.
//!
//! ```rust
//! use parley::{AppConfig, ProviderKind};
//!
//! let config = AppConfig::from_lookup(|key| match key {
//!     "PARLEY_PROVIDER" => Some("openai".to_string()),
//!     "PARLEY_MODEL" => Some("gpt-4o-mini".to_string()),
//!     "OPENAI_API_KEY" => Some("sk-test".to_string()),
//!     _ => None,
//! })
//! .expect("config");
//!
//! assert_eq!(config.provider.kind, ProviderKind::OpenAi);
//! assert_eq!(config.provider.model, "gpt-4o-mini");
//! assert!(config.provider.configuration_errors().is_empty());
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pchat::{ChatError, ChatPolicy, ToolExecutionMode};
use pprovider::{ProviderConfig, ProviderKind};
use ptooling::{AllowAllTools, ToolAllowList, ToolFilter};

pub const PROVIDER_VAR: &str = "PARLEY_PROVIDER";
pub const MODEL_VAR: &str = "PARLEY_MODEL";
pub const BASE_URL_VAR: &str = "PARLEY_BASE_URL";
pub const TEMPERATURE_VAR: &str = "PARLEY_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "PARLEY_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "PARLEY_TIMEOUT_SECS";
pub const SYSTEM_PROMPT_VAR: &str = "PARLEY_SYSTEM_PROMPT";
pub const ENABLED_TOOLS_VAR: &str = "PARLEY_ENABLED_TOOLS";
pub const TOOL_EXECUTION_VAR: &str = "PARLEY_TOOL_EXECUTION";
pub const TOOL_TIMEOUT_VAR: &str = "PARLEY_TOOL_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub system_prompt: Option<String>,
    /// `None` exposes every registry tool.
    pub enabled_tools: Option<Vec<String>>,
    pub tool_execution: ToolExecutionMode,
    pub tool_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            system_prompt: None,
            enabled_tools: None,
            tool_execution: ToolExecutionMode::default(),
            tool_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    ///
    /// A missing API key is not an error here; turns report it as
    /// `NotConfigured` before any request is sent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let kind = match read(PROVIDER_VAR) {
            Some(value) => ProviderKind::from_str(&value)
                .map_err(|error| ChatError::configuration(format!("{PROVIDER_VAR}: {error}")))?,
            None => ProviderKind::Anthropic,
        };

        let mut provider = match read(MODEL_VAR) {
            Some(model) => ProviderConfig::new(kind, model),
            None => ProviderConfig::with_default_model(kind),
        };
        if let Some(api_key) = read(kind.api_key_env()) {
            provider = provider.with_api_key(api_key);
        }
        if let Some(base_url) = read(BASE_URL_VAR) {
            provider = provider.with_base_url(base_url);
        }
        if let Some(temperature) = parse_var::<f32>(TEMPERATURE_VAR, read(TEMPERATURE_VAR))? {
            provider = provider.with_temperature(temperature);
        }
        if let Some(max_tokens) = parse_var::<u32>(MAX_TOKENS_VAR, read(MAX_TOKENS_VAR))? {
            provider = provider.with_max_tokens(max_tokens);
        }
        if let Some(timeout) = parse_timeout(TIMEOUT_VAR, read(TIMEOUT_VAR))? {
            provider = provider.with_timeout(timeout);
        }

        let enabled_tools = read(ENABLED_TOOLS_VAR).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let tool_execution = match read(TOOL_EXECUTION_VAR).as_deref() {
            None => ToolExecutionMode::Sequential,
            Some(value) => parse_execution_mode(value)?,
        };

        let tool_timeout = parse_timeout(TOOL_TIMEOUT_VAR, read(TOOL_TIMEOUT_VAR))?;

        Ok(Self {
            provider,
            system_prompt: read(SYSTEM_PROMPT_VAR),
            enabled_tools,
            tool_execution,
            tool_timeout,
        })
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_enabled_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_tools = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tool_execution(mut self, mode: ToolExecutionMode) -> Self {
        self.tool_execution = mode;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn chat_policy(&self) -> ChatPolicy {
        let policy = ChatPolicy::default().with_tool_execution(self.tool_execution);
        match &self.system_prompt {
            Some(prompt) => policy.with_system_prompt(prompt.clone()),
            None => policy,
        }
    }

    pub fn tool_filter(&self) -> Arc<dyn ToolFilter> {
        match &self.enabled_tools {
            Some(names) => Arc::new(ToolAllowList::from_names(names.iter().cloned())),
            None => Arc::new(AllowAllTools),
        }
    }
}

fn parse_var<T>(key: &str, value: Option<String>) -> Result<Option<T>, ChatError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|error| {
                ChatError::configuration(format!("{key}: invalid value '{raw}': {error}"))
            })
        })
        .transpose()
}

/// Whole seconds; zero would expire every request immediately.
fn parse_timeout(key: &str, value: Option<String>) -> Result<Option<Duration>, ChatError> {
    match parse_var::<u64>(key, value)? {
        Some(0) => Err(ChatError::configuration(format!(
            "{key}: timeout must be greater than zero"
        ))),
        seconds => Ok(seconds.map(Duration::from_secs)),
    }
}

fn parse_execution_mode(value: &str) -> Result<ToolExecutionMode, ChatError> {
    match value.to_ascii_lowercase().as_str() {
        "sequential" => Ok(ToolExecutionMode::Sequential),
        "concurrent" | "parallel" => Ok(ToolExecutionMode::Concurrent),
        other => Err(ChatError::configuration(format!(
            "{TOOL_EXECUTION_VAR}: expected 'sequential' or 'concurrent', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pchat::ChatErrorKind;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_anthropic_with_its_default_model() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("config");

        assert_eq!(config.provider.kind, ProviderKind::Anthropic);
        assert_eq!(config.provider.model, ProviderKind::Anthropic.default_model());
        assert!(!config.provider.configuration_errors().is_empty());
        assert_eq!(config.tool_execution, ToolExecutionMode::Sequential);
        assert!(config.enabled_tools.is_none());
    }

    #[test]
    fn reads_every_setting() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PARLEY_PROVIDER", "gemini"),
            ("PARLEY_MODEL", "gemini-2.0-flash"),
            ("PARLEY_BASE_URL", "http://localhost:9000"),
            ("PARLEY_TEMPERATURE", "0.2"),
            ("PARLEY_MAX_TOKENS", "512"),
            ("PARLEY_TIMEOUT_SECS", "15"),
            ("PARLEY_SYSTEM_PROMPT", "You are a site analytics assistant."),
            ("PARLEY_ENABLED_TOOLS", "analytics/get-metrics, search/queries,,"),
            ("PARLEY_TOOL_EXECUTION", "concurrent"),
            ("PARLEY_TOOL_TIMEOUT_SECS", "5"),
            ("GEMINI_API_KEY", "g-key"),
        ]))
        .expect("config");

        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.provider.base_url(), "http://localhost:9000");
        assert_eq!(config.provider.temperature, Some(0.2));
        assert_eq!(config.provider.max_tokens, 512);
        assert_eq!(config.provider.timeout, Duration::from_secs(15));
        assert!(config.provider.configuration_errors().is_empty());
        assert_eq!(
            config.enabled_tools,
            Some(vec![
                "analytics/get-metrics".to_string(),
                "search/queries".to_string()
            ])
        );
        assert_eq!(config.tool_timeout, Some(Duration::from_secs(5)));

        let policy = config.chat_policy();
        assert_eq!(policy.tool_execution, ToolExecutionMode::Concurrent);
        assert_eq!(
            policy.system_prompt.as_deref(),
            Some("You are a site analytics assistant.")
        );

        let filter = config.tool_filter();
        assert!(filter.allows("search/queries"));
        assert!(!filter.allows("ads/spend"));
    }

    #[test]
    fn only_the_selected_providers_key_is_used() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PARLEY_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "wrong-provider"),
        ]))
        .expect("config");

        assert!(!config.provider.configuration_errors().is_empty());
    }

    #[test]
    fn malformed_values_are_configuration_errors() {
        let cases = [
            ("PARLEY_PROVIDER", "mystery"),
            ("PARLEY_TEMPERATURE", "warm"),
            ("PARLEY_MAX_TOKENS", "-1"),
            ("PARLEY_TIMEOUT_SECS", "soon"),
            ("PARLEY_TOOL_EXECUTION", "sometimes"),
        ];

        for (key, value) in cases {
            let error = AppConfig::from_lookup(lookup(&[(key, value)]))
                .expect_err("value should be rejected");
            assert_eq!(error.kind, ChatErrorKind::Configuration, "{key}");
            assert!(error.message.starts_with(key), "{}", error.message);
        }
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        for key in ["PARLEY_TIMEOUT_SECS", "PARLEY_TOOL_TIMEOUT_SECS"] {
            let error = AppConfig::from_lookup(lookup(&[(key, "0")]))
                .expect_err("zero timeout should be rejected");
            assert_eq!(error.kind, ChatErrorKind::Configuration);
            assert_eq!(error.message, format!("{key}: timeout must be greater than zero"));
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PARLEY_PROVIDER", "  "),
            ("PARLEY_SYSTEM_PROMPT", ""),
        ]))
        .expect("config");

        assert_eq!(config.provider.kind, ProviderKind::Anthropic);
        assert!(config.system_prompt.is_none());
    }
}
