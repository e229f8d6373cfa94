//! Lifecycle callbacks around each orchestrator turn.
//!
//! ```rust
//! use wchat::{ChatTurnHooks, NoopChatTurnHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ChatTurnHooks) {}
//!
//! assert_hooks_trait(&NoopChatTurnHooks);
//! ```

use std::time::Duration;

use wcommon::SessionId;

use crate::{ChatError, Step, TurnKind};

pub trait ChatTurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _kind: TurnKind) {}

    /// Called once per completed model step, in step order.
    fn on_step(&self, _session_id: &SessionId, _step_number: usize, _step: &Step) {}

    fn on_turn_complete(&self, _session_id: &SessionId, _kind: TurnKind, _elapsed: Duration) {}

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        _kind: TurnKind,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatTurnHooks;

impl ChatTurnHooks for NoopChatTurnHooks {}
