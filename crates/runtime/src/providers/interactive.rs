//! Controller answered from outside the battle task, e.g. by a UI.
use async_trait::async_trait;
use battle_core::{BattleState, SquadId};
use tokio::sync::{mpsc, oneshot};

use crate::api::{ActionController, BattleAction, ControllerKind, Result, RuntimeError};

/// A request for one squad's action, delivered to the [`InteractiveHandle`].
#[derive(Debug)]
pub struct TurnPrompt {
    pub actor: SquadId,
    pub round: u32,
    reply: oneshot::Sender<Option<BattleAction>>,
}

impl TurnPrompt {
    /// Answers with `action`. Use [`BattleAction::pending`] to pick the
    /// target afterwards, while the machine shows valid targets.
    pub fn respond(self, action: BattleAction) -> bool {
        self.reply.send(Some(action)).is_ok()
    }

    /// Gives up the turn.
    pub fn pass(self) -> bool {
        self.reply.send(None).is_ok()
    }
}

/// Receiving end of an [`InteractiveController`].
#[derive(Debug)]
pub struct InteractiveHandle {
    prompts: mpsc::Receiver<TurnPrompt>,
}

impl InteractiveHandle {
    /// Next prompt, or `None` once the controller is gone.
    pub async fn next_prompt(&mut self) -> Option<TurnPrompt> {
        self.prompts.recv().await
    }
}

/// Human controller. Cancelled actions are requested again.
#[derive(Debug, Clone)]
pub struct InteractiveController {
    prompts: mpsc::Sender<TurnPrompt>,
}

impl InteractiveController {
    pub fn channel(buffer: usize) -> (Self, InteractiveHandle) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { prompts: tx }, InteractiveHandle { prompts: rx })
    }
}

#[async_trait]
impl ActionController for InteractiveController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Human
    }

    async fn request_action(
        &self,
        state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>> {
        let (reply, answer) = oneshot::channel();
        self.prompts
            .send(TurnPrompt {
                actor,
                round: state.round(),
                reply,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        answer.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}
