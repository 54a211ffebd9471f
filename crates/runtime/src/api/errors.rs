//! Unified error types surfaced by the runtime API.
//!
//! Setup failures are fatal and surface from
//! [`BattleContextBuilder::build`](crate::BattleContextBuilder::build).
//! Failures inside a running battle are logged and turned into skipped turns
//! by the state machine, so only a few variants ever escape `run()`.
use std::fmt;

use battle_core::{ActionError, BattleError, GridError, SetupError, Side, SquadId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle context requires a {name} before building")]
    MissingCollaborator { name: &'static str },

    #[error("no action controller bound for side {side}")]
    ControllerNotSet { side: Side },

    #[error("action controller channel closed")]
    ChannelClosed,

    #[error("action was already resolved")]
    AlreadyResolved,

    #[error("intent requires a target but none was supplied")]
    MissingTarget,

    #[error("action actor {provided} does not match active squad {expected}")]
    ActorMismatch { expected: SquadId, provided: SquadId },

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl RuntimeError {
    /// Stable code for logs, delegating to the wrapped core error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCollaborator { .. } => "runtime_missing_collaborator",
            Self::ControllerNotSet { .. } => "runtime_controller_not_set",
            Self::ChannelClosed => "runtime_channel_closed",
            Self::AlreadyResolved => "runtime_already_resolved",
            Self::MissingTarget => "runtime_missing_target",
            Self::ActorMismatch { .. } => "runtime_actor_mismatch",
            Self::Setup(e) => e.error_code(),
            Self::Grid(e) => e.error_code(),
            Self::Action(e) => e.error_code(),
        }
    }
}

/// Who drives a controller: a person answering prompts or a policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    Human,
    Ai,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControllerKind::Human => "human",
            ControllerKind::Ai => "ai",
        };
        write!(f, "{}", label)
    }
}
