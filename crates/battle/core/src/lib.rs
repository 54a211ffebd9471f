//! Deterministic squad-combat rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical battle model: squads and their stats,
//! the positional grid, the initiative queue, targeting rules, damage and
//! status effects, and the result evaluator. Everything here is synchronous
//! and driven by a seeded [`BattleRng`], so the same inputs always replay the
//! same battle. All mutation goes through [`BattleState`]; the async
//! orchestration lives in `battle-runtime`.
pub mod abilities;
pub mod action;
pub mod combat;
pub mod config;
pub mod content;
pub mod effects;
pub mod error;
pub mod grid;
pub mod queue;
pub mod result;
pub mod rng;
pub mod squad;
pub mod state;
pub mod stats;
pub mod targeting;

pub use abilities::{
    AbilityBook, AbilityDefinition, AbilityEffect, AbilityId, AbilityOutcome, AbilityReport,
    AbilityTarget, AbilityView,
};
pub use action::{
    ActionError, ActionIntent, ActionKind, ActionReport, ActionTag, PostResolution, TurnFlow,
};
pub use combat::{AttackReport, AttackRoll, Damage, DamageOutcome, DamageType};
pub use config::BattleConfig;
pub use content::{ContentSource, RosterEntry, SetupError, StaticContent};
pub use effects::{
    AttachOutcome, EffectDefinition, EffectError, EffectHook, EffectId, EffectKind,
    EffectOutcome, EffectReport, Stacking, StatusEffect, StatusEffects,
};
pub use error::{BattleError, ErrorSeverity};
pub use grid::{GridAllocator, GridError, GridSide, Highlight, Row, SlotId};
pub use queue::InitiativeQueue;
pub use result::{BattleResult, BattleStatus, SquadDelta};
pub use rng::{BattleRng, PcgRng, RngOracle, compute_seed};
pub use squad::{
    AttackKind, CombatStats, DamageRange, DefenseTypes, Side, SquadDefinition, SquadId,
    SquadModel,
};
pub use state::BattleState;
pub use stats::{Bonus, BonusStack, ModifierSet, StatKind, StatModifier};
pub use targeting::{
    AlliedResolver, OpposingResolver, SelfResolver, TargetResolver, TargetingError,
    evaluate_targets, resolver_for_ability,
};
