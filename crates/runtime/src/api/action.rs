//! Pending battle actions and their single resolution point.
//!
//! A [`BattleAction`] is what a controller hands to the state machine. Its
//! target may already be known, or it may still be waiting on a
//! [`TargetPicker`] held by whoever drives the controller (a UI, a test). The
//! machine is the only consumer: it attaches the action, computes target
//! validity, then awaits [`BattleAction::resolve`] exactly once.
use std::fmt;
use std::sync::Arc;

use battle_core::{AbilityId, ActionIntent, ActionKind, SquadId, TargetResolver};
use tokio::sync::oneshot;

use super::errors::{Result, RuntimeError};

/// Answer sent through a [`TargetPicker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetChoice {
    Target(SquadId),
    Cancel,
}

/// Terminal outcome of [`BattleAction::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Resolved(ActionKind),
    Cancelled,
}

enum TargetSource {
    None,
    Fixed(SquadId),
    Pending(oneshot::Receiver<TargetChoice>),
    Consumed,
}

pub struct BattleAction {
    actor: SquadId,
    intent: ActionIntent,
    resolver: Option<Arc<dyn TargetResolver>>,
    target: TargetSource,
}

impl BattleAction {
    fn new(actor: SquadId, intent: ActionIntent, target: TargetSource) -> Self {
        Self {
            actor,
            intent,
            resolver: None,
            target,
        }
    }

    pub fn attack(actor: SquadId, target: SquadId) -> Self {
        Self::new(actor, ActionIntent::Attack, TargetSource::Fixed(target))
    }

    pub fn defend(actor: SquadId) -> Self {
        Self::new(actor, ActionIntent::Defend, TargetSource::None)
    }

    pub fn skip(actor: SquadId) -> Self {
        Self::new(actor, ActionIntent::SkipTurn, TargetSource::None)
    }

    pub fn ability(actor: SquadId, ability: AbilityId, target: SquadId) -> Self {
        Self::new(
            actor,
            ActionIntent::UseAbility(ability),
            TargetSource::Fixed(target),
        )
    }

    /// Wraps an already complete action.
    pub fn from_kind(actor: SquadId, kind: ActionKind) -> Self {
        match kind {
            ActionKind::Attack { target } => Self::attack(actor, target),
            ActionKind::UseAbility { ability, target } => Self::ability(actor, ability, target),
            ActionKind::Defend => Self::defend(actor),
            ActionKind::SkipTurn => Self::skip(actor),
        }
    }

    /// An action whose target is chosen later through the returned picker.
    ///
    /// Dropping the picker without answering cancels the action.
    pub fn pending(actor: SquadId, intent: ActionIntent) -> (Self, TargetPicker) {
        let (tx, rx) = oneshot::channel();
        (
            Self::new(actor, intent, TargetSource::Pending(rx)),
            TargetPicker { tx },
        )
    }

    /// Overrides the target rule used for validity and highlights.
    pub fn with_resolver(mut self, resolver: Arc<dyn TargetResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn actor(&self) -> SquadId {
        self.actor
    }

    pub fn intent(&self) -> ActionIntent {
        self.intent
    }

    pub fn resolver(&self) -> Option<&Arc<dyn TargetResolver>> {
        self.resolver.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.target, TargetSource::Pending(_))
    }

    /// Waits for the action to become concrete or be cancelled.
    ///
    /// Can be called once; later calls fail with
    /// [`RuntimeError::AlreadyResolved`].
    pub async fn resolve(&mut self) -> Result<ActionOutcome> {
        let target = match std::mem::replace(&mut self.target, TargetSource::Consumed) {
            TargetSource::Consumed => return Err(RuntimeError::AlreadyResolved),
            TargetSource::None => None,
            TargetSource::Fixed(target) => Some(target),
            TargetSource::Pending(rx) => match rx.await {
                Ok(TargetChoice::Target(target)) => Some(target),
                Ok(TargetChoice::Cancel) | Err(_) => return Ok(ActionOutcome::Cancelled),
            },
        };
        self.intent
            .with_target(target)
            .map(ActionOutcome::Resolved)
            .ok_or(RuntimeError::MissingTarget)
    }
}

impl fmt::Debug for BattleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            TargetSource::None => "none".to_owned(),
            TargetSource::Fixed(target) => target.to_string(),
            TargetSource::Pending(_) => "pending".to_owned(),
            TargetSource::Consumed => "consumed".to_owned(),
        };
        f.debug_struct("BattleAction")
            .field("actor", &self.actor)
            .field("intent", &self.intent)
            .field("resolver", &self.resolver.as_ref().map(|r| r.name()))
            .field("target", &target)
            .finish()
    }
}

/// Completes a [`BattleAction::pending`] action.
#[derive(Debug)]
pub struct TargetPicker {
    tx: oneshot::Sender<TargetChoice>,
}

impl TargetPicker {
    /// Returns false if the action was already dropped.
    pub fn pick(self, target: SquadId) -> bool {
        self.tx.send(TargetChoice::Target(target)).is_ok()
    }

    pub fn cancel(self) -> bool {
        self.tx.send(TargetChoice::Cancel).is_ok()
    }
}
