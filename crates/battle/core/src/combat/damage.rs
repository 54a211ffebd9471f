use crate::rng::BattleRng;
use crate::squad::SquadModel;

use super::{Damage, DamageType, hit};

/// Result of rolling an attacker's damage, before the target's defenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackRoll {
    pub damage: Damage,
    pub critical: bool,
}

/// Rolls a squad's outgoing damage.
///
/// Every living unit rolls once in the damage range (a single roll scaled by
/// count), the total is scaled by `multiplier` percent, and a crit multiplies
/// the result by the attacker's crit multiplier.
pub fn roll_attack(
    attacker: &SquadModel,
    multiplier: u32,
    damage_type: DamageType,
    rng: &mut BattleRng,
) -> AttackRoll {
    let stats = attacker.stats();
    let per_unit = rng.range(stats.damage.min, stats.damage.max) as u64;
    let mut total = per_unit * attacker.count() as u64 * multiplier as u64 / 100;

    let critical = hit::is_critical(stats.crit_chance, rng);
    if critical {
        total = total * stats.crit_multiplier as u64 / 100;
    }

    AttackRoll {
        damage: Damage::attack(
            total.min(u32::MAX as u64) as u32,
            damage_type,
            attacker.id(),
        ),
        critical,
    }
}
