//! Turn lifecycle hooks.
//!
//! ```rust
//! use pchat::{NoopTurnHooks, TurnHooks};
//!
//! fn accepts_hooks(_hooks: &dyn TurnHooks) {}
//!
//! accepts_hooks(&NoopTurnHooks);
//! ```

use std::time::Duration;

use pcommon::ConversationId;

use crate::{ChatError, TurnPhase, TurnResult};

pub trait TurnHooks: Send + Sync {
    fn on_phase(&self, _conversation_id: &ConversationId, _phase: TurnPhase) {}

    fn on_turn_complete(
        &self,
        _conversation_id: &ConversationId,
        _result: &TurnResult,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_failure(
        &self,
        _conversation_id: &ConversationId,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
