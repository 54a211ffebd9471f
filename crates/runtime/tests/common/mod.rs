#![allow(dead_code)]

use battle_core::{
    AbilityDefinition, AbilityEffect, AbilityId, AbilityTarget, AttackKind, CombatStats,
    DamageType, DefenseTypes, EffectDefinition, EffectHook, EffectKind, StaticContent,
    SquadDefinition,
};
use battle_runtime::{Event, EventBus, RuntimeConfig, Topic};
use tokio::sync::broadcast;

pub const DAZE: AbilityId = AbilityId(1);
pub const HEX: AbilityId = AbilityId(2);

pub fn content() -> StaticContent {
    StaticContent::new()
        .with_squad(
            SquadDefinition::new("knights", "Knights", 20).with_stats(
                CombatStats::default()
                    .with_initiative(5)
                    .with_damage(4, 6)
                    .with_defense(DefenseTypes {
                        physical: 20,
                        magic: 0,
                        absolute: 0,
                    }),
            ),
        )
        .with_squad(
            SquadDefinition::new("archers", "Archers", 10)
                .with_attack(AttackKind::Ranged)
                .with_stats(CombatStats::default().with_initiative(6).with_damage(3, 5)),
        )
        .with_squad(
            SquadDefinition::new("goblins", "Goblins", 8).with_stats(
                CombatStats::default()
                    .with_initiative(8)
                    .with_damage(2, 4)
                    .with_miss_chance(10),
            ),
        )
        .with_squad(
            SquadDefinition::new("shamans", "Shamans", 6)
                .with_attack(AttackKind::Magic)
                .with_stats(CombatStats::default().with_initiative(4).with_damage(2, 3))
                .with_ability(AbilityDefinition {
                    id: HEX,
                    name: "Hex".into(),
                    cooldown: 3,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Apply(EffectDefinition::new(
                        "hex",
                        EffectKind::Damage {
                            amount: 4,
                            damage_type: DamageType::Magic,
                        },
                        EffectHook::OnTurnEnd,
                        3,
                    )),
                }),
        )
        .with_squad(
            SquadDefinition::new("marksmen", "Marksmen", 10)
                .with_attack(AttackKind::Ranged)
                .with_stats(CombatStats::default().with_initiative(10).with_damage(50, 50)),
        )
        .with_squad(
            SquadDefinition::new("warlocks", "Warlocks", 10)
                .with_attack(AttackKind::Magic)
                .with_stats(CombatStats::default().with_initiative(10))
                .with_ability(AbilityDefinition {
                    id: DAZE,
                    name: "Daze".into(),
                    cooldown: 2,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Apply(EffectDefinition::new(
                        "daze",
                        EffectKind::Stun,
                        EffectHook::OnTurnStart,
                        1,
                    )),
                }),
        )
        .with_squad(SquadDefinition::new("dummies", "Dummies", 5))
        .with_squad(SquadDefinition::new("ogres", "Ogres", 100))
        .with_squad(
            SquadDefinition::new("phantoms", "Phantoms", 50)
                .with_stats(CombatStats::default().with_miss_chance(100)),
        )
}

pub fn config(seed: u64) -> RuntimeConfig {
    RuntimeConfig {
        event_buffer_size: 16_384,
        ..RuntimeConfig::default()
    }
    .with_seed(seed)
}

pub fn subscribe_all(bus: &EventBus) -> Vec<broadcast::Receiver<Event>> {
    [Topic::Turn, Topic::Action, Topic::Grid, Topic::Battle]
        .into_iter()
        .map(|topic| bus.subscribe(topic))
        .collect()
}

pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
