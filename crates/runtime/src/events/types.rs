//! Event types for different topics.

use battle_core::{
    AbilityView, ActionIntent, ActionReport, BattleResult, DamageOutcome, EffectReport, Highlight,
    SlotId, SquadId,
};
use serde::{Deserialize, Serialize};

/// Why a squad lost its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The squad was defeated before it could act.
    Defeated,
    Stunned,
    /// The controller had no action.
    NoAction,
    /// Requesting or resolving the action failed.
    Failed,
    Cancelled,
    Defended,
    Skipped,
}

/// Round and turn progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    RoundStarted { round: u32 },

    /// Initiative order after it changed, front first.
    QueueChanged { queue: Vec<SquadId> },

    ActiveUnitChanged { squad: Option<SquadId> },

    AbilitiesPublished {
        squad: SquadId,
        abilities: Vec<AbilityView>,
    },

    TurnSkipped { squad: SquadId, reason: SkipReason },
}

/// Action lifecycle and everything it caused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEvent {
    Attached { actor: SquadId, intent: ActionIntent },

    Resolved { actor: SquadId, report: ActionReport },

    Cancelled { actor: SquadId },

    Failed { actor: SquadId, error: String },

    DamageApplied {
        target: SquadId,
        outcome: DamageOutcome,
    },

    EffectTriggered(EffectReport),
}

/// Slot presentation and occupancy changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridEvent {
    HighlightChanged { slot: SlotId, highlight: Highlight },

    HighlightsReset,

    SquadRemoved {
        squad: SquadId,
        slot: Option<SlotId>,
    },
}

/// Battle lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    Started { squads: usize, seed: u64 },

    FleeRequested,

    /// The round limit ended an undecided battle.
    TimedOut { rounds: u32 },

    Finished(BattleResult),
}
