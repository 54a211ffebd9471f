//! Timed status effects and the hooks that activate them.
//!
//! An effect sits on a squad with a trigger hook and a tick budget. Every
//! activation through its hook consumes one tick; when the budget runs out the
//! effect removes itself together with any stat modifiers it granted.
mod apply;
mod status;

use std::fmt;

pub use apply::{EffectError, EffectOutcome, EffectReport};
pub use status::{AttachOutcome, StatusEffect, StatusEffects};

use crate::combat::DamageType;
use crate::stats::StatModifier;

/// Battle moments at which status effects can fire.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectHook {
    OnAttach,
    OnTurnStart,
    OnTurnEnd,
    OnRoundStart,
    OnRoundEnd,
    OnAttack,
    OnAbility,
    OnDefend,
    OnSkip,
    OnAction,
    OnApplyDamage,
    OnDealDamage,
}

/// Identifier of one attached effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// Policy when an effect with the same name is already on the squad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stacking {
    /// Reset the existing instance's remaining ticks.
    #[default]
    Refresh,
    /// Attach an independent instance.
    Stack,
    /// Keep the existing instance untouched.
    Ignore,
}

/// What an effect does each time it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Non-dodgeable damage to the holder.
    Damage { amount: u32, damage_type: DamageType },
    Heal { amount: u32 },
    /// Stat modifiers held for as long as the effect is attached.
    Modifiers(Vec<StatModifier>),
    /// Holder loses its turn; one tick is consumed per lost turn.
    Stun,
    /// Damage to a random other living squad on the holder's side.
    Spread { amount: u32, damage_type: DamageType },
}

/// Content definition of a status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub name: String,
    pub kind: EffectKind,
    pub trigger: EffectHook,
    /// Activations before the effect expires. Zero is treated as one.
    pub max_ticks: u32,
    pub stacking: Stacking,
}

impl EffectDefinition {
    pub fn new(name: impl Into<String>, kind: EffectKind, trigger: EffectHook, max_ticks: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            trigger,
            max_ticks,
            stacking: Stacking::default(),
        }
    }

    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = stacking;
        self
    }

    pub fn is_stun(&self) -> bool {
        matches!(self.kind, EffectKind::Stun)
    }
}
