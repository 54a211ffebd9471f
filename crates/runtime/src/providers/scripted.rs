//! Fixed action scripts, mostly for tests and replays.
use std::collections::VecDeque;

use async_trait::async_trait;
use battle_core::{ActionIntent, ActionKind, BattleState, SquadId};
use tokio::sync::Mutex;

use crate::api::{ActionController, BattleAction, ControllerKind, Result};

/// One scripted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedStep {
    Act(ActionKind),
    /// Attaches a pending action with `intent`, then cancels it.
    Cancel(ActionIntent),
    /// Returns no action.
    Pass,
}

/// Replays a queue of steps, one per request, regardless of the actor.
/// Once the script runs out every request is answered with `None`.
pub struct ScriptedController {
    kind: ControllerKind,
    steps: Mutex<VecDeque<ScriptedStep>>,
}

impl ScriptedController {
    pub fn new(steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        Self {
            kind: ControllerKind::Ai,
            steps: Mutex::new(steps.into_iter().collect()),
        }
    }

    /// Script from concrete actions only.
    pub fn from_actions(actions: impl IntoIterator<Item = ActionKind>) -> Self {
        Self::new(actions.into_iter().map(ScriptedStep::Act))
    }

    /// Reports `kind` to the machine, which changes how cancellation is
    /// handled.
    pub fn with_kind(mut self, kind: ControllerKind) -> Self {
        self.kind = kind;
        self
    }

    pub async fn remaining(&self) -> usize {
        self.steps.lock().await.len()
    }
}

#[async_trait]
impl ActionController for ScriptedController {
    fn kind(&self) -> ControllerKind {
        self.kind
    }

    async fn request_action(
        &self,
        _state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>> {
        let step = self.steps.lock().await.pop_front();
        Ok(match step {
            Some(ScriptedStep::Act(kind)) => Some(BattleAction::from_kind(actor, kind)),
            Some(ScriptedStep::Cancel(intent)) => {
                let (action, picker) = BattleAction::pending(actor, intent);
                picker.cancel();
                Some(action)
            }
            Some(ScriptedStep::Pass) | None => None,
        })
    }
}
