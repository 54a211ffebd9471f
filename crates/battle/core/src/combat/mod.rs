//! Damage model: attack rolls, hit checks and outcomes.
mod damage;
mod hit;
mod result;

pub use damage::{AttackRoll, roll_attack};
pub use hit::{is_critical, is_dodged, reduce_by_defense};
pub use result::{AttackReport, DamageOutcome};

use crate::squad::SquadId;

/// Damage channel, matched against the target's defense of the same type.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Physical,
    Magic,
    Absolute,
}

/// A single packet of incoming damage before defenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    pub value: u32,
    pub damage_type: DamageType,
    pub source: Option<SquadId>,
    /// Only dodgeable damage goes through the target's miss check.
    pub dodgeable: bool,
}

impl Damage {
    /// Damage from a squad's attack or strike ability.
    pub fn attack(value: u32, damage_type: DamageType, source: SquadId) -> Self {
        Self {
            value,
            damage_type,
            source: Some(source),
            dodgeable: true,
        }
    }

    /// Damage from a status effect. Never dodged.
    pub fn effect(value: u32, damage_type: DamageType) -> Self {
        Self {
            value,
            damage_type,
            source: None,
            dodgeable: false,
        }
    }
}
