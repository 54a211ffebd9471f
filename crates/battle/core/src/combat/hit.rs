use crate::rng::BattleRng;

/// Rolls the target's miss chance.
pub fn is_dodged(miss_chance: u32, rng: &mut BattleRng) -> bool {
    rng.chance(miss_chance.min(100))
}

/// Rolls the attacker's crit chance.
pub fn is_critical(crit_chance: u32, rng: &mut BattleRng) -> bool {
    rng.chance(crit_chance.min(100))
}

/// Reduces `value` by `defense` percent, rounding down. Defense above 100 is
/// treated as full immunity.
pub fn reduce_by_defense(value: u32, defense: u32) -> u32 {
    let kept = 100 - defense.min(100) as u64;
    (value as u64 * kept / 100) as u32
}
