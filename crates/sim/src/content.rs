//! Built-in squads for the demo battle.
use battle_core::{
    AbilityDefinition, AbilityEffect, AbilityId, AbilityTarget, AttackKind, Bonus, CombatStats,
    DamageType, DefenseTypes, EffectDefinition, EffectHook, EffectKind, RosterEntry, Side,
    SquadDefinition, Stacking, StatKind, StatModifier, StaticContent,
};

pub fn demo_content() -> StaticContent {
    StaticContent::new()
        .with_squad(
            SquadDefinition::new("paladins", "Paladins", 30)
                .with_stats(
                    CombatStats::default()
                        .with_initiative(5)
                        .with_damage(4, 7)
                        .with_crit(10, 150)
                        .with_defense(DefenseTypes {
                            physical: 25,
                            magic: 10,
                            absolute: 0,
                        }),
                )
                .with_ability(AbilityDefinition {
                    id: AbilityId(1),
                    name: "Smite".into(),
                    cooldown: 3,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Strike {
                        multiplier: 200,
                        damage_type: DamageType::Magic,
                    },
                }),
        )
        .with_squad(
            SquadDefinition::new("crossbowmen", "Crossbowmen", 12)
                .with_attack(AttackKind::Ranged)
                .with_stats(
                    CombatStats::default()
                        .with_initiative(7)
                        .with_damage(3, 6)
                        .with_crit(15, 200),
                ),
        )
        .with_squad(
            SquadDefinition::new("priests", "Priests", 10)
                .with_attack(AttackKind::Magic)
                .with_stats(CombatStats::default().with_initiative(4).with_damage(1, 3))
                .with_ability(AbilityDefinition {
                    id: AbilityId(2),
                    name: "Mend".into(),
                    cooldown: 2,
                    target: AbilityTarget::Ally,
                    effect: AbilityEffect::Heal { amount: 40 },
                })
                .with_ability(AbilityDefinition {
                    id: AbilityId(3),
                    name: "Blessing".into(),
                    cooldown: 4,
                    target: AbilityTarget::Ally,
                    effect: AbilityEffect::Apply(
                        EffectDefinition::new(
                            "blessing",
                            EffectKind::Modifiers(vec![
                                StatModifier::new(StatKind::MinDamage, Bonus::Increased(25)),
                                StatModifier::new(StatKind::MaxDamage, Bonus::Increased(25)),
                            ]),
                            EffectHook::OnTurnEnd,
                            3,
                        )
                        .with_stacking(Stacking::Refresh),
                    ),
                }),
        )
        .with_squad(
            SquadDefinition::new("goblins", "Goblins", 8).with_stats(
                CombatStats::default()
                    .with_initiative(8)
                    .with_damage(2, 4)
                    .with_miss_chance(15),
            ),
        )
        .with_squad(
            SquadDefinition::new("orc_archers", "Orc Archers", 14)
                .with_attack(AttackKind::Ranged)
                .with_stats(CombatStats::default().with_initiative(6).with_damage(3, 5)),
        )
        .with_squad(
            SquadDefinition::new("shamans", "Shamans", 9)
                .with_attack(AttackKind::Magic)
                .with_stats(CombatStats::default().with_initiative(3).with_damage(2, 4))
                .with_ability(AbilityDefinition {
                    id: AbilityId(4),
                    name: "Plague".into(),
                    cooldown: 3,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Apply(EffectDefinition::new(
                        "plague",
                        EffectKind::Spread {
                            amount: 6,
                            damage_type: DamageType::Magic,
                        },
                        EffectHook::OnTurnEnd,
                        3,
                    )),
                })
                .with_ability(AbilityDefinition {
                    id: AbilityId(5),
                    name: "Hex".into(),
                    cooldown: 5,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Apply(EffectDefinition::new(
                        "hex",
                        EffectKind::Stun,
                        EffectHook::OnTurnStart,
                        1,
                    )),
                }),
        )
}

/// The party plus `enemies` hostile squads, cycling through the enemy kinds.
pub fn demo_roster(enemies: usize) -> Vec<RosterEntry> {
    const ENEMIES: [(&str, u32); 3] = [("goblins", 12), ("orc_archers", 6), ("shamans", 5)];

    let mut roster = vec![
        RosterEntry::new("paladins", Side::Hero, 6),
        RosterEntry::new("crossbowmen", Side::Ally, 8),
        RosterEntry::new("priests", Side::Ally, 4),
    ];
    roster.extend(
        ENEMIES
            .iter()
            .cycle()
            .take(enemies)
            .map(|(key, count)| RosterEntry::new(*key, Side::Enemy, *count)),
    );
    roster
}

#[cfg(test)]
mod tests {
    use battle_core::{BattleConfig, BattleState};

    use super::*;

    #[test]
    fn demo_roster_resolves_against_demo_content() {
        let content = demo_content();
        for enemies in 1..=6 {
            let roster = demo_roster(enemies);
            assert_eq!(roster.len(), 3 + enemies);
            let state = BattleState::from_roster(BattleConfig::default(), &roster, &content)
                .expect("every demo squad should be defined");
            assert_eq!(state.roster().len(), roster.len());
        }
    }
}
