//! Squads: stacks of identical units fighting as one piece on the grid.
mod definition;
mod model;

use std::fmt;

pub use definition::{AttackKind, CombatStats, DamageRange, DefenseTypes, SquadDefinition};
pub use model::SquadModel;

use crate::grid::GridSide;

/// Unique identifier of a squad within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquadId(pub u32);

impl fmt::Display for SquadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allegiance of a squad.
///
/// Hero and Ally squads fight on the ally grid side; Enemy and Neutral squads
/// occupy the enemy grid side. Neutral squads count as neither friendly nor
/// enemy when the battle checks for completion.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Hero,
    Ally,
    Enemy,
    Neutral,
}

impl Side {
    pub const fn is_friendly(self) -> bool {
        matches!(self, Side::Hero | Side::Ally)
    }

    pub const fn is_enemy(self) -> bool {
        matches!(self, Side::Enemy)
    }

    /// Initiative tie-break rank: friendly squads act before neutral, neutral
    /// before enemy.
    pub const fn friendliness(self) -> i8 {
        match self {
            Side::Hero | Side::Ally => 1,
            Side::Neutral => 0,
            Side::Enemy => -1,
        }
    }

    pub const fn grid_side(self) -> GridSide {
        match self {
            Side::Hero | Side::Ally => GridSide::Ally,
            Side::Enemy | Side::Neutral => GridSide::Enemy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_parse_case_insensitively() {
        assert_eq!("HERO".parse::<Side>().unwrap(), Side::Hero);
        assert_eq!("neutral".parse::<Side>().unwrap(), Side::Neutral);
        assert_eq!(Side::Enemy.to_string(), "enemy");
    }

    #[test]
    fn friendliness_orders_friendly_over_neutral_over_enemy() {
        assert!(Side::Hero.friendliness() > Side::Neutral.friendliness());
        assert!(Side::Neutral.friendliness() > Side::Enemy.friendliness());
        assert_eq!(Side::Hero.friendliness(), Side::Ally.friendliness());
    }

    #[test]
    fn neutral_squads_stand_on_enemy_side() {
        assert_eq!(Side::Neutral.grid_side(), GridSide::Enemy);
        assert_eq!(Side::Hero.grid_side(), GridSide::Ally);
    }
}
