//! Turn-level errors and classification.
//!
//! ```rust
//! use pchat::{ChatError, ChatErrorKind, TurnPhase};
//! use pprovider::{ProviderError, ProviderErrorKind};
//!
//! let error = ChatError::from(ProviderError::api(503, "overloaded"))
//!     .in_phase(TurnPhase::AwaitingFollowUp);
//!
//! assert_eq!(error.kind, ChatErrorKind::Provider(ProviderErrorKind::Api));
//! assert_eq!(error.status, Some(503));
//! assert!(error.is_retryable());
//! assert_eq!(error.phase, Some(TurnPhase::AwaitingFollowUp));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use pprovider::{NameCollisionError, ProviderError, ProviderErrorKind};

use crate::TurnPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Provider(ProviderErrorKind),
    Store,
    Configuration,
}

impl ChatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Provider(kind) => kind.as_str(),
            Self::Store => "store",
            Self::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub phase: Option<TurnPhase>,
    pub status: Option<u16>,
    retryable: bool,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            status: None,
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Configuration, message)
    }

    /// Records the turn phase the failure happened in. An existing phase is kept.
    pub fn in_phase(mut self, phase: TurnPhase) -> Self {
        self.phase.get_or_insert(phase);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Failures the caller can fix by changing the request or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ChatErrorKind::InvalidRequest
                | ChatErrorKind::Configuration
                | ChatErrorKind::Provider(ProviderErrorKind::NotConfigured)
                | ChatErrorKind::Provider(ProviderErrorKind::InvalidRequest)
        )
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(status) = self.status {
            write!(f, " ({status})")?;
        }
        if let Some(phase) = self.phase {
            write!(f, " during {}", phase.as_str())?;
        }
        write!(f, ": {}", self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        Self {
            kind: ChatErrorKind::Provider(value.kind),
            message: value.message,
            phase: None,
            status: value.status,
            retryable: value.retryable,
        }
    }
}

impl From<NameCollisionError> for ChatError {
    fn from(value: NameCollisionError) -> Self {
        ChatError::configuration(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_kind_status_and_retryability() {
        let error = ChatError::from(ProviderError::api(401, "bad key"));
        assert_eq!(error.kind, ChatErrorKind::Provider(ProviderErrorKind::Api));
        assert_eq!(error.status, Some(401));
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "api (401): bad key");

        let transport = ChatError::from(ProviderError::transport("connection reset"));
        assert!(transport.is_retryable());
    }

    #[test]
    fn name_collisions_become_configuration_errors() {
        let error = ChatError::from(NameCollisionError {
            wire_name: "a__b".to_string(),
            first: "a/b".to_string(),
            second: "a__b".to_string(),
        });

        assert_eq!(error.kind, ChatErrorKind::Configuration);
        assert!(error.is_user_error());
        assert!(error.message.contains("a__b"));
    }

    #[test]
    fn first_recorded_phase_wins() {
        let error = ChatError::store("disk full")
            .in_phase(TurnPhase::ExecutingTools)
            .in_phase(TurnPhase::Done);

        assert_eq!(error.phase, Some(TurnPhase::ExecutingTools));
        assert_eq!(error.to_string(), "store during executing_tools: disk full");
    }

    #[test]
    fn not_configured_is_a_user_error() {
        let error = ChatError::from(ProviderError::not_configured("missing key"));
        assert!(error.is_user_error());
        assert!(!ChatError::store("poisoned").is_user_error());
    }
}
