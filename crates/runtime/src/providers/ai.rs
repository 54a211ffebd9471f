//! Utility-based AI controller.

use async_trait::async_trait;
use battle_core::combat::reduce_by_defense;
use battle_core::{
    AbilityDefinition, AbilityEffect, BattleState, DamageType, OpposingResolver, SquadId,
    SquadModel, TargetResolver, evaluate_targets, resolver_for_ability,
};
use tracing::debug;

use crate::api::{ActionController, BattleAction, ControllerKind, Result};

/// Bonus added to any option expected to wipe out its target.
const KILL_BONUS: u64 = 1_000;
/// Flat score of attaching a status effect the target does not carry yet.
const EFFECT_SCORE: u64 = 25;

/// Scores every legal option and takes the best one.
///
/// Options are the plain attack and each ready ability against each valid
/// target. Damage options score their expected damage after defense, capped
/// at the target's health, plus [`KILL_BONUS`] when the target would fall.
/// Heals score the health they would restore. When nothing scores above
/// zero the squad defends, or skips if it already defended this round.
///
/// Scoring is deterministic: ties go to the option seen first, and options
/// are visited in ability definition order, then by squad id.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiController;

impl AiController {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Choice {
    score: u64,
    target: SquadId,
    ability: Option<usize>,
}

fn expected_damage(
    attacker: &SquadModel,
    target: &SquadModel,
    multiplier: u32,
    damage_type: DamageType,
) -> u64 {
    let stats = attacker.stats();
    let per_unit = (stats.damage.min as u64 + stats.damage.max as u64) / 2;
    let raw = per_unit * attacker.count() as u64 * multiplier as u64 / 100;
    let defense = target.stats().defense.for_type(damage_type);
    reduce_by_defense(raw.min(u32::MAX as u64) as u32, defense) as u64
}

fn damage_score(damage: u64, target: &SquadModel) -> u64 {
    let health = target.health() as u64;
    let bonus = if damage >= health { KILL_BONUS } else { 0 };
    damage.min(health) + bonus
}

fn ability_score(
    state: &BattleState,
    actor: &SquadModel,
    ability: &AbilityDefinition,
    target: SquadId,
) -> u64 {
    let Some(target) = state.squad(target) else {
        return 0;
    };
    match &ability.effect {
        AbilityEffect::Strike {
            multiplier,
            damage_type,
        } => damage_score(
            expected_damage(actor, target, *multiplier, *damage_type),
            target,
        ),
        AbilityEffect::Heal { amount } => {
            let missing = target.max_health().saturating_sub(target.health());
            missing.min(*amount) as u64
        }
        AbilityEffect::Apply(effect) => {
            if target.effects().has_named(&effect.name) {
                0
            } else {
                EFFECT_SCORE
            }
        }
    }
}

fn valid_targets(state: &BattleState, resolver: &dyn TargetResolver, actor: SquadId) -> Vec<SquadId> {
    evaluate_targets(state, resolver, actor)
        .into_iter()
        .filter_map(|(squad, valid)| valid.then_some(squad))
        .collect()
}

fn consider(best: &mut Option<Choice>, candidate: Choice) {
    if candidate.score == 0 {
        return;
    }
    if best.is_none_or(|b| candidate.score > b.score) {
        *best = Some(candidate);
    }
}

#[async_trait]
impl ActionController for AiController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Ai
    }

    async fn request_action(
        &self,
        state: &BattleState,
        actor: SquadId,
    ) -> Result<Option<BattleAction>> {
        let Some(squad) = state.squad(actor) else {
            return Ok(None);
        };
        let mut best: Option<Choice> = None;

        let abilities = &squad.definition().abilities;
        for (index, ability) in abilities.iter().enumerate() {
            if !squad.abilities().is_ready(ability.id) {
                continue;
            }
            let resolver = resolver_for_ability(ability.target);
            for target in valid_targets(state, resolver.as_ref(), actor) {
                consider(
                    &mut best,
                    Choice {
                        score: ability_score(state, squad, ability, target),
                        target,
                        ability: Some(index),
                    },
                );
            }
        }

        let damage_type = squad.definition().attack.damage_type();
        for target in valid_targets(state, &OpposingResolver, actor) {
            let Some(model) = state.squad(target) else {
                continue;
            };
            consider(
                &mut best,
                Choice {
                    score: damage_score(expected_damage(squad, model, 100, damage_type), model),
                    target,
                    ability: None,
                },
            );
        }

        let action = match best {
            Some(Choice {
                target,
                ability: Some(index),
                ..
            }) => match abilities.get(index) {
                Some(ability) => BattleAction::ability(actor, ability.id, target),
                None => BattleAction::attack(actor, target),
            },
            Some(Choice { target, .. }) => BattleAction::attack(actor, target),
            None if state.has_defended(actor) => BattleAction::skip(actor),
            None => BattleAction::defend(actor),
        };
        debug!(target: "battle::ai", %actor, ?action, score = best.map(|b| b.score), "AI chose action");
        Ok(Some(action))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        AbilityId, AbilityTarget, ActionIntent, BattleConfig, CombatStats, GridSide, Row, Side,
        SlotId, SquadDefinition,
    };

    use super::*;

    fn place(state: &mut BattleState, squad: SquadId, side: GridSide, row: Row, column: u8) {
        state
            .grid_mut()
            .try_attach_to_slot(SlotId::new(side, row, column), squad)
            .unwrap();
    }

    #[tokio::test]
    async fn finishes_off_the_weakest_reachable_squad() {
        let mut state = BattleState::new(BattleConfig::default());
        let knights = Arc::new(
            SquadDefinition::new("knights", "Knights", 10)
                .with_stats(CombatStats::default().with_damage(3, 3)),
        );
        let goblins = Arc::new(SquadDefinition::new("goblins", "Goblins", 5));
        let hero = state.add_squad(Side::Hero, knights, 2);
        let healthy = state.add_squad(Side::Enemy, Arc::clone(&goblins), 10);
        let wounded = state.add_squad(Side::Enemy, goblins, 1);
        place(&mut state, hero, GridSide::Ally, Row::Front, 0);
        place(&mut state, healthy, GridSide::Enemy, Row::Front, 0);
        place(&mut state, wounded, GridSide::Enemy, Row::Front, 1);

        let action = AiController
            .request_action(&state, hero)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(action.intent(), ActionIntent::Attack);
        let mut action = action;
        assert_eq!(
            action.resolve().await.unwrap(),
            crate::api::ActionOutcome::Resolved(battle_core::ActionKind::Attack { target: wounded })
        );
    }

    #[tokio::test]
    async fn prefers_a_ready_strike_over_a_plain_attack() {
        let mut state = BattleState::new(BattleConfig::default());
        let mages = Arc::new(
            SquadDefinition::new("mages", "Mages", 10)
                .with_stats(CombatStats::default().with_damage(2, 2))
                .with_ability(AbilityDefinition {
                    id: AbilityId(9),
                    name: "Fireball".into(),
                    cooldown: 3,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Strike {
                        multiplier: 300,
                        damage_type: DamageType::Magic,
                    },
                }),
        );
        let trolls = Arc::new(SquadDefinition::new("trolls", "Trolls", 100));
        let hero = state.add_squad(Side::Hero, mages, 3);
        let enemy = state.add_squad(Side::Enemy, trolls, 3);
        place(&mut state, hero, GridSide::Ally, Row::Back, 0);
        place(&mut state, enemy, GridSide::Enemy, Row::Front, 0);

        let action = AiController
            .request_action(&state, hero)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(action.intent(), ActionIntent::UseAbility(AbilityId(9)));
    }

    #[tokio::test]
    async fn defends_once_then_skips_without_targets() {
        let mut state = BattleState::new(BattleConfig::default());
        let def = Arc::new(SquadDefinition::new("scouts", "Scouts", 5));
        let hero = state.add_squad(Side::Hero, def, 1);
        place(&mut state, hero, GridSide::Ally, Row::Front, 0);

        let first = AiController.request_action(&state, hero).await.unwrap().unwrap();
        assert_eq!(first.intent(), ActionIntent::Defend);

        state.mark_defended(hero);
        let second = AiController.request_action(&state, hero).await.unwrap().unwrap();
        assert_eq!(second.intent(), ActionIntent::SkipTurn);
    }
}
