//! Asynchronous abstraction for sourcing squad actions.
//!
//! Battles bind one [`ActionController`] per side so the same state machine
//! can run with human input, scripted fixtures, or AI policies.
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{BattleState, SquadId};

use super::action::BattleAction;
use super::errors::{ControllerKind, Result};

#[async_trait]
pub trait ActionController: Send + Sync {
    /// Human controllers are asked again after a cancelled action; any other
    /// kind loses the turn.
    fn kind(&self) -> ControllerKind;

    /// Provide an action for `actor`, or `None` to skip the turn.
    ///
    /// The machine awaits at most one request at a time.
    async fn request_action(
        &self,
        state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>>;
}

/// A shared controller, so callers can keep a handle to it after binding.
#[async_trait]
impl<T: ActionController + ?Sized> ActionController for Arc<T> {
    fn kind(&self) -> ControllerKind {
        (**self).kind()
    }

    async fn request_action(
        &self,
        state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>> {
        (**self).request_action(state, actor).await
    }
}
