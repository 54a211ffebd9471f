use std::sync::Arc;

use crate::abilities::AbilityBook;
use crate::combat::{self, Damage, DamageOutcome};
use crate::effects::StatusEffects;
use crate::rng::BattleRng;
use crate::stats::ModifierSet;

use super::{CombatStats, Side, SquadDefinition, SquadId};

/// A squad taking part in a battle.
///
/// Health is authoritative; `count` is derived as `ceil(health / unit_health)`
/// after every change. A squad whose count reaches zero is defeated and never
/// comes back: healing is ignored once defeated.
#[derive(Clone, Debug)]
pub struct SquadModel {
    id: SquadId,
    side: Side,
    definition: Arc<SquadDefinition>,
    initial_count: u32,
    count: u32,
    health: u32,
    effects: StatusEffects,
    modifiers: ModifierSet,
    abilities: AbilityBook,
}

impl SquadModel {
    pub fn new(id: SquadId, side: Side, definition: Arc<SquadDefinition>, count: u32) -> Self {
        let health = count.saturating_mul(definition.unit_health);
        let abilities = AbilityBook::from_definitions(&definition.abilities);
        Self {
            id,
            side,
            definition,
            initial_count: count,
            count,
            health,
            effects: StatusEffects::empty(),
            modifiers: ModifierSet::new(),
            abilities,
        }
    }

    pub fn id(&self) -> SquadId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn definition(&self) -> &Arc<SquadDefinition> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn initial_count(&self) -> u32 {
        self.initial_count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.initial_count.saturating_mul(self.definition.unit_health)
    }

    pub fn is_defeated(&self) -> bool {
        self.count == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_defeated()
    }

    /// Base stats with every active modifier applied.
    pub fn stats(&self) -> CombatStats {
        self.modifiers.apply(&self.definition.stats)
    }

    pub fn initiative(&self) -> i32 {
        self.stats().initiative
    }

    pub fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut StatusEffects {
        &mut self.effects
    }

    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierSet {
        &mut self.modifiers
    }

    pub fn abilities(&self) -> &AbilityBook {
        &self.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut AbilityBook {
        &mut self.abilities
    }

    /// Applies incoming damage: dodge check, defense reduction, then health
    /// loss clamped at zero.
    pub fn receive_damage(&mut self, damage: &Damage, rng: &mut BattleRng) -> DamageOutcome {
        if self.is_defeated() {
            return DamageOutcome::Applied {
                damage: 0,
                units_lost: 0,
                defeated: true,
            };
        }

        let stats = self.stats();
        if damage.dodgeable && combat::is_dodged(stats.miss_chance, rng) {
            return DamageOutcome::Dodged;
        }

        let dealt = combat::reduce_by_defense(
            damage.value,
            stats.defense.for_type(damage.damage_type),
        );
        let before = self.count;
        self.health = self.health.saturating_sub(dealt);
        self.sync_count();

        DamageOutcome::Applied {
            damage: dealt,
            units_lost: before - self.count,
            defeated: self.is_defeated(),
        }
    }

    /// Restores health up to the squad's starting total. Returns the amount
    /// actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_defeated() {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health());
        self.sync_count();
        self.health - before
    }

    fn sync_count(&mut self) {
        let unit = self.definition.unit_health.max(1);
        self.count = self.health.div_ceil(unit);
    }
}
