//! Operational hook contract for completion calls.

use std::time::Duration;

use crate::{ProviderError, ProviderKind, UsageStats};

pub trait ProviderOperationHooks: Send + Sync {
    fn on_request_start(&self, _provider: ProviderKind, _model: &str) {}

    fn on_success(
        &self,
        _provider: ProviderKind,
        _model: &str,
        _usage: &UsageStats,
        _elapsed: Duration,
    ) {
    }

    fn on_failure(
        &self,
        _provider: ProviderKind,
        _model: &str,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProviderHooks;

impl ProviderOperationHooks for NoopProviderHooks {}
