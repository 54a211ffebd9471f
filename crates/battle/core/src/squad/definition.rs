//! Immutable squad content: what a unit type is, independent of any battle.
use crate::abilities::AbilityDefinition;
use crate::combat::DamageType;

/// How a squad delivers its basic attack.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackKind {
    /// Limited to the opposing front row while it holds a live squad.
    Melee,
    Ranged,
    Magic,
}

impl AttackKind {
    pub const fn reaches_back_row(self) -> bool {
        !matches!(self, AttackKind::Melee)
    }

    pub const fn damage_type(self) -> DamageType {
        match self {
            AttackKind::Melee | AttackKind::Ranged => DamageType::Physical,
            AttackKind::Magic => DamageType::Magic,
        }
    }
}

/// Damage reduction per damage type, in percent (0-100).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseTypes {
    pub physical: u32,
    pub magic: u32,
    pub absolute: u32,
}

impl DefenseTypes {
    pub const fn for_type(&self, damage_type: DamageType) -> u32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Magic => self.magic,
            DamageType::Absolute => self.absolute,
        }
    }
}

/// Per-unit damage range, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl DamageRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl Default for DamageRange {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Combat statistics shared by every unit of a squad.
///
/// Chances are integer percentages. `crit_multiplier` is a percentage of the
/// rolled damage (150 = ×1.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub defense: DefenseTypes,
    pub damage: DamageRange,
    pub initiative: i32,
    pub crit_chance: u32,
    pub crit_multiplier: u32,
    pub miss_chance: u32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            defense: DefenseTypes::default(),
            damage: DamageRange::default(),
            initiative: 0,
            crit_chance: 0,
            crit_multiplier: 150,
            miss_chance: 0,
        }
    }
}

impl CombatStats {
    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_damage(mut self, min: u32, max: u32) -> Self {
        self.damage = DamageRange::new(min, max);
        self
    }

    pub fn with_defense(mut self, defense: DefenseTypes) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_crit(mut self, chance: u32, multiplier: u32) -> Self {
        self.crit_chance = chance;
        self.crit_multiplier = multiplier;
        self
    }

    pub fn with_miss_chance(mut self, chance: u32) -> Self {
        self.miss_chance = chance;
        self
    }
}

/// Content definition for a squad type, looked up by `key`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquadDefinition {
    pub key: String,
    pub name: String,
    pub attack: AttackKind,
    /// Health of a single unit. Squad health is `count × unit_health`.
    pub unit_health: u32,
    pub stats: CombatStats,
    pub abilities: Vec<AbilityDefinition>,
}

impl SquadDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>, unit_health: u32) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            attack: AttackKind::Melee,
            unit_health,
            stats: CombatStats::default(),
            abilities: Vec::new(),
        }
    }

    pub fn with_attack(mut self, attack: AttackKind) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_ability(mut self, ability: AbilityDefinition) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn ability(&self, id: crate::abilities::AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.iter().find(|a| a.id == id)
    }
}
