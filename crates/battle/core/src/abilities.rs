//! Squad abilities with per-ability cooldowns.
use std::fmt;

use arrayvec::ArrayVec;

use crate::combat::{AttackReport, DamageType};
use crate::config::BattleConfig;
use crate::effects::{AttachOutcome, EffectDefinition};
use crate::squad::SquadId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u16);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

/// Who an ability may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityTarget {
    Enemy,
    Ally,
    SelfOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityEffect {
    /// An attack scaled by `multiplier` percent and dealt as `damage_type`.
    Strike {
        multiplier: u32,
        damage_type: DamageType,
    },
    /// Attach a status effect to the target.
    Apply(EffectDefinition),
    Heal { amount: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    /// Rounds before the ability is ready again after use.
    pub cooldown: u32,
    pub target: AbilityTarget,
    pub effect: AbilityEffect,
}

/// Cooldown tracker of one ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityState {
    pub id: AbilityId,
    pub remaining_cooldown: u32,
}

/// Cooldowns of every ability a squad owns, independent of each other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBook {
    abilities: ArrayVec<AbilityState, { BattleConfig::MAX_ABILITIES }>,
}

impl AbilityBook {
    /// All abilities start ready. Definitions past capacity are dropped.
    pub fn from_definitions(definitions: &[AbilityDefinition]) -> Self {
        let abilities = definitions
            .iter()
            .take(BattleConfig::MAX_ABILITIES)
            .map(|d| AbilityState {
                id: d.id,
                remaining_cooldown: 0,
            })
            .collect();
        Self { abilities }
    }

    /// Advances every cooldown by one round.
    pub fn tick_all(&mut self) {
        for ability in &mut self.abilities {
            ability.remaining_cooldown = ability.remaining_cooldown.saturating_sub(1);
        }
    }

    /// Unknown abilities are never ready.
    pub fn is_ready(&self, id: AbilityId) -> bool {
        self.remaining_cooldown(id) == Some(0)
    }

    pub fn remaining_cooldown(&self, id: AbilityId) -> Option<u32> {
        self.abilities
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.remaining_cooldown)
    }

    pub fn start_cooldown(&mut self, id: AbilityId, rounds: u32) {
        if let Some(ability) = self.abilities.iter_mut().find(|a| a.id == id) {
            ability.remaining_cooldown = rounds;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityState> {
        self.abilities.iter()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

/// Ability listing for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityView {
    pub id: AbilityId,
    pub name: String,
    pub target: AbilityTarget,
    pub ready: bool,
    pub remaining_cooldown: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityOutcome {
    Struck(AttackReport),
    Applied {
        target: SquadId,
        outcome: AttachOutcome,
    },
    Healed {
        target: SquadId,
        amount: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityReport {
    pub actor: SquadId,
    pub ability: AbilityId,
    pub outcome: AbilityOutcome,
}
