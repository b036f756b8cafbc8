//! Provider selection and the immutable per-adapter configuration record.
//!
//! ```rust
//! use std::time::Duration;
//! use pprovider::{ProviderConfig, ProviderKind};
//!
//! let config = ProviderConfig::new(ProviderKind::OpenAi, "gpt-4o-mini")
//!     .with_api_key("sk-test")
//!     .with_temperature(0.2)
//!     .with_timeout(Duration::from_secs(30));
//!
//! assert!(config.configuration_errors().is_empty());
//! assert_eq!("claude".parse::<ProviderKind>(), Ok(ProviderKind::Anthropic));
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use pcommon::GenerationOptions;

use crate::SecretString;

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::Anthropic, Self::OpenAi, Self::Gemini];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Environment variable conventionally holding this backend's API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Highest sampling temperature the backend accepts.
    pub fn max_temperature(self) -> f32 {
        match self {
            Self::Anthropic => 1.0,
            Self::OpenAi | Self::Gemini => 2.0,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-5",
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProviderKind(pub String);

impl Display for UnknownProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown provider '{}'", self.0)
    }
}

impl std::error::Error for UnknownProviderKind {}

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "chatgpt" | "gpt" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(UnknownProviderKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: None,
            model: model.into(),
            base_url: None,
            temperature: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_model(kind: ProviderKind) -> Self {
        Self::new(kind, kind.default_model())
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
            .trim_end_matches('/')
    }

    /// Configured defaults as per-call generation options.
    pub fn generation_defaults(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    pub fn configuration_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match &self.api_key {
            None => errors.push(format!("{} API key is not configured", self.kind)),
            Some(key) if key.is_blank() => {
                errors.push(format!("{} API key must not be empty", self.kind))
            }
            Some(_) => {}
        }

        if self.model.trim().is_empty() {
            errors.push("model must not be empty".to_string());
        }

        let max_temperature = self.kind.max_temperature();
        if let Some(temperature) = self.temperature
            && !(0.0..=max_temperature).contains(&temperature)
        {
            errors.push(format!(
                "temperature must be in the inclusive range 0.0..={max_temperature:.1} for {}",
                self.kind
            ));
        }

        if self.max_tokens == 0 {
            errors.push("max_tokens must be greater than zero".to_string());
        }

        errors
    }
}
