//! Typed stat modifiers keyed by the effect that granted them.
use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::effects::EffectId;
use crate::squad::CombatStats;

use super::{Bonus, BonusStack};

/// Combat stat a modifier can target.
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
pub enum StatKind {
    Initiative,
    PhysicalDefense,
    MagicDefense,
    AbsoluteDefense,
    MinDamage,
    MaxDamage,
    CritChance,
    CritMultiplier,
    MissChance,
}

impl StatKind {
    fn read(self, stats: &CombatStats) -> i32 {
        let value = match self {
            StatKind::Initiative => return stats.initiative,
            StatKind::PhysicalDefense => stats.defense.physical,
            StatKind::MagicDefense => stats.defense.magic,
            StatKind::AbsoluteDefense => stats.defense.absolute,
            StatKind::MinDamage => stats.damage.min,
            StatKind::MaxDamage => stats.damage.max,
            StatKind::CritChance => stats.crit_chance,
            StatKind::CritMultiplier => stats.crit_multiplier,
            StatKind::MissChance => stats.miss_chance,
        };
        value.min(i32::MAX as u32) as i32
    }

    fn write(self, stats: &mut CombatStats, value: i32) {
        let unsigned = value.max(0) as u32;
        match self {
            StatKind::Initiative => stats.initiative = value,
            StatKind::PhysicalDefense => stats.defense.physical = unsigned,
            StatKind::MagicDefense => stats.defense.magic = unsigned,
            StatKind::AbsoluteDefense => stats.defense.absolute = unsigned,
            StatKind::MinDamage => stats.damage.min = unsigned,
            StatKind::MaxDamage => stats.damage.max = unsigned,
            StatKind::CritChance => stats.crit_chance = unsigned,
            StatKind::CritMultiplier => stats.crit_multiplier = unsigned,
            StatKind::MissChance => stats.miss_chance = unsigned,
        }
    }

    /// Valid range of the stat after modifiers.
    fn bounds(self) -> (i32, i32) {
        match self {
            StatKind::Initiative => (i32::MIN, i32::MAX),
            StatKind::PhysicalDefense
            | StatKind::MagicDefense
            | StatKind::AbsoluteDefense
            | StatKind::CritChance
            | StatKind::MissChance => (0, 100),
            StatKind::CritMultiplier => (100, i32::MAX),
            StatKind::MinDamage | StatKind::MaxDamage => (0, i32::MAX),
        }
    }
}

/// One bonus aimed at one stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: StatKind,
    pub bonus: Bonus,
}

impl StatModifier {
    pub const fn new(stat: StatKind, bonus: Bonus) -> Self {
        Self { stat, bonus }
    }
}

/// Active modifiers of a squad, grouped by source effect so that an expiring
/// effect removes exactly what it added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierSet {
    by_source: BTreeMap<EffectId, Vec<StatModifier>>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: EffectId, modifiers: impl IntoIterator<Item = StatModifier>) {
        self.by_source.entry(source).or_default().extend(modifiers);
    }

    /// Drops every modifier granted by `source`. Returns false if none were
    /// registered.
    pub fn remove(&mut self, source: EffectId) -> bool {
        self.by_source.remove(&source).is_some()
    }

    pub fn contains(&self, source: EffectId) -> bool {
        self.by_source.contains_key(&source)
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Number of contributing sources.
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// Returns `base` with every modifier applied and every stat clamped to
    /// its valid range. Minimum damage never exceeds maximum damage.
    pub fn apply(&self, base: &CombatStats) -> CombatStats {
        let mut stats = *base;
        if self.by_source.is_empty() {
            return stats;
        }

        for kind in StatKind::iter() {
            let stack: BonusStack = self
                .by_source
                .values()
                .flatten()
                .filter(|m| m.stat == kind)
                .map(|m| m.bonus)
                .collect();
            if stack.is_empty() {
                continue;
            }
            let (min, max) = kind.bounds();
            kind.write(&mut stats, stack.apply(kind.read(base), min, max));
        }

        if stats.damage.min > stats.damage.max {
            stats.damage.min = stats.damage.max;
        }
        stats
    }
}
