//! Action controller implementations for different squad behaviors.

pub mod ai;
pub mod interactive;
pub mod scripted;

use async_trait::async_trait;
use battle_core::{BattleState, SquadId};

use crate::api::{ActionController, BattleAction, ControllerKind, Result};

pub use ai::AiController;
pub use interactive::{InteractiveController, InteractiveHandle, TurnPrompt};
pub use scripted::{ScriptedController, ScriptedStep};

/// A controller that always skips.
/// Useful for testing or as a placeholder side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipController;

#[async_trait]
impl ActionController for SkipController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Ai
    }

    async fn request_action(
        &self,
        _state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>> {
        Ok(Some(BattleAction::skip(actor)))
    }
}
