//! The closed set of battle actions and how each one resolves.
//!
//! Execution is synchronous and happens once the runtime has a concrete
//! [`ActionKind`]. What happens to the turn afterwards is not decided ad hoc:
//! [`ActionTag::post_resolution`] is an explicit table from action to hooks,
//! turn flow and queue side effects.
use std::sync::Arc;

use tracing::debug;

use crate::abilities::{AbilityEffect, AbilityId, AbilityOutcome, AbilityReport};
use crate::combat::{AttackReport, DamageType, roll_attack};
use crate::effects::{EffectError, EffectHook};
use crate::error::{BattleError, ErrorSeverity};
use crate::rng::BattleRng;
use crate::squad::SquadId;
use crate::state::BattleState;
use crate::targeting::{OpposingResolver, TargetResolver, TargetingError, resolver_for_ability};

/// A fully specified action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Attack { target: SquadId },
    Defend,
    SkipTurn,
    UseAbility { ability: AbilityId, target: SquadId },
}

impl ActionKind {
    pub fn tag(&self) -> ActionTag {
        match self {
            ActionKind::Attack { .. } => ActionTag::Attack,
            ActionKind::Defend => ActionTag::Defend,
            ActionKind::SkipTurn => ActionTag::SkipTurn,
            ActionKind::UseAbility { .. } => ActionTag::UseAbility,
        }
    }

    pub fn target(&self) -> Option<SquadId> {
        match self {
            ActionKind::Attack { target } | ActionKind::UseAbility { target, .. } => Some(*target),
            ActionKind::Defend | ActionKind::SkipTurn => None,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTag {
    Attack,
    Defend,
    SkipTurn,
    UseAbility,
}

/// An action chosen before its target is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionIntent {
    Attack,
    Defend,
    SkipTurn,
    UseAbility(AbilityId),
}

impl ActionIntent {
    pub fn tag(&self) -> ActionTag {
        match self {
            ActionIntent::Attack => ActionTag::Attack,
            ActionIntent::Defend => ActionTag::Defend,
            ActionIntent::SkipTurn => ActionTag::SkipTurn,
            ActionIntent::UseAbility(_) => ActionTag::UseAbility,
        }
    }

    pub fn needs_target(&self) -> bool {
        matches!(self, ActionIntent::Attack | ActionIntent::UseAbility(_))
    }

    /// Completes the intent. Returns `None` if a required target is missing.
    pub fn with_target(self, target: Option<SquadId>) -> Option<ActionKind> {
        match (self, target) {
            (ActionIntent::Attack, Some(target)) => Some(ActionKind::Attack { target }),
            (ActionIntent::UseAbility(ability), Some(target)) => {
                Some(ActionKind::UseAbility { ability, target })
            }
            (ActionIntent::Defend, _) => Some(ActionKind::Defend),
            (ActionIntent::SkipTurn, _) => Some(ActionKind::SkipTurn),
            _ => None,
        }
    }
}

/// Whether the turn proceeds normally or through the skip path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnFlow {
    Done,
    Skip,
}

/// What the turn does after an action resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostResolution {
    /// Fired in order for the actor.
    pub hooks: &'static [EffectHook],
    pub flow: TurnFlow,
    pub mark_defended: bool,
    /// Re-enqueue the actor at the back of the round.
    pub requeue: bool,
}

impl ActionTag {
    pub const fn post_resolution(self) -> PostResolution {
        match self {
            ActionTag::Defend => PostResolution {
                hooks: &[EffectHook::OnDefend],
                flow: TurnFlow::Skip,
                mark_defended: true,
                requeue: true,
            },
            ActionTag::SkipTurn => PostResolution {
                hooks: &[EffectHook::OnSkip],
                flow: TurnFlow::Skip,
                mark_defended: false,
                requeue: false,
            },
            ActionTag::Attack => PostResolution {
                hooks: &[EffectHook::OnAttack, EffectHook::OnAction],
                flow: TurnFlow::Done,
                mark_defended: false,
                requeue: false,
            },
            ActionTag::UseAbility => PostResolution {
                hooks: &[EffectHook::OnAbility, EffectHook::OnAction],
                flow: TurnFlow::Done,
                mark_defended: false,
                requeue: false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("squad {squad} is not part of the battle")]
    UnknownSquad { squad: SquadId },

    #[error("squad {squad} is defeated and cannot act")]
    Defeated { squad: SquadId },

    #[error("squad {target} is not a valid target for squad {actor}")]
    InvalidTarget { actor: SquadId, target: SquadId },

    #[error("squad {actor} has no ability {ability}")]
    UnknownAbility { actor: SquadId, ability: AbilityId },

    #[error("{ability} is on cooldown for {remaining} more round(s)")]
    AbilityNotReady { ability: AbilityId, remaining: u32 },

    #[error(transparent)]
    Targeting(#[from] TargetingError),

    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTarget { .. } | Self::AbilityNotReady { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::UnknownSquad { .. } | Self::Defeated { .. } | Self::UnknownAbility { .. } => {
                ErrorSeverity::Validation
            }
            Self::Targeting(e) => e.severity(),
            Self::Effect(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSquad { .. } => "action_unknown_squad",
            Self::Defeated { .. } => "action_defeated",
            Self::InvalidTarget { .. } => "action_invalid_target",
            Self::UnknownAbility { .. } => "action_unknown_ability",
            Self::AbilityNotReady { .. } => "action_ability_not_ready",
            Self::Targeting(e) => e.error_code(),
            Self::Effect(e) => e.error_code(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionReport {
    Attack(AttackReport),
    Ability(AbilityReport),
    Defend,
    Skip,
}

impl BattleState {
    /// Executes a concrete action for `actor`.
    ///
    /// Targets are validated against the default resolver of the action.
    /// Queue and defend bookkeeping is left to [`BattleState::finish_action`].
    pub fn execute(
        &mut self,
        actor: SquadId,
        kind: &ActionKind,
        rng: &mut BattleRng,
    ) -> Result<ActionReport, ActionError> {
        self.execute_with(actor, kind, None, rng)
    }

    /// Like [`BattleState::execute`], but validates the target with
    /// `resolver` when one is given.
    pub fn execute_with(
        &mut self,
        actor: SquadId,
        kind: &ActionKind,
        resolver: Option<&dyn TargetResolver>,
        rng: &mut BattleRng,
    ) -> Result<ActionReport, ActionError> {
        let squad = self
            .squad(actor)
            .ok_or(ActionError::UnknownSquad { squad: actor })?;
        if squad.is_defeated() {
            return Err(ActionError::Defeated { squad: actor });
        }

        let report = match *kind {
            ActionKind::Attack { target } => {
                self.ensure_target(resolver.unwrap_or(&OpposingResolver), actor, target)?;
                let damage_type = squad.definition().attack.damage_type();
                ActionReport::Attack(self.strike(actor, target, 100, damage_type, rng)?)
            }
            ActionKind::UseAbility { ability, target } => {
                ActionReport::Ability(self.use_ability(actor, ability, target, resolver, rng)?)
            }
            ActionKind::Defend => ActionReport::Defend,
            ActionKind::SkipTurn => ActionReport::Skip,
        };
        debug!(target: "battle::action", %actor, ?report, "Action executed");
        Ok(report)
    }

    /// Applies the queue and defend side effects of a resolved action and
    /// returns its dispatch entry.
    ///
    /// A defending squad is re-enqueued at most once per round, and only if
    /// another entry is still pending behind it.
    pub fn finish_action(&mut self, actor: SquadId, tag: ActionTag) -> PostResolution {
        let post = tag.post_resolution();
        if post.mark_defended {
            let first_defend = self.mark_defended(actor);
            if post.requeue && first_defend && self.queue().len() > 1 {
                self.queue_mut().add_last(actor);
            }
        }
        post
    }

    fn ensure_target(
        &self,
        resolver: &dyn TargetResolver,
        actor: SquadId,
        target: SquadId,
    ) -> Result<(), ActionError> {
        if resolver.resolve_target(self, actor, target)? {
            Ok(())
        } else {
            Err(ActionError::InvalidTarget { actor, target })
        }
    }

    fn strike(
        &mut self,
        actor: SquadId,
        target: SquadId,
        multiplier: u32,
        damage_type: DamageType,
        rng: &mut BattleRng,
    ) -> Result<AttackReport, ActionError> {
        let attacker = self
            .squad(actor)
            .ok_or(ActionError::UnknownSquad { squad: actor })?;
        let roll = roll_attack(attacker, multiplier, damage_type, rng);
        let defender = self
            .squad_mut(target)
            .ok_or(ActionError::UnknownSquad { squad: target })?;
        let outcome = defender.receive_damage(&roll.damage, rng);
        Ok(AttackReport {
            attacker: actor,
            target,
            critical: roll.critical,
            outcome,
        })
    }

    fn use_ability(
        &mut self,
        actor: SquadId,
        ability: AbilityId,
        target: SquadId,
        resolver: Option<&dyn TargetResolver>,
        rng: &mut BattleRng,
    ) -> Result<AbilityReport, ActionError> {
        let squad = self
            .squad(actor)
            .ok_or(ActionError::UnknownSquad { squad: actor })?;
        let definition = squad
            .definition()
            .ability(ability)
            .cloned()
            .ok_or(ActionError::UnknownAbility { actor, ability })?;
        match squad.abilities().remaining_cooldown(ability) {
            Some(0) => {}
            Some(remaining) => return Err(ActionError::AbilityNotReady { ability, remaining }),
            None => return Err(ActionError::UnknownAbility { actor, ability }),
        }
        match resolver {
            Some(resolver) => self.ensure_target(resolver, actor, target)?,
            None => {
                self.ensure_target(resolver_for_ability(definition.target).as_ref(), actor, target)?
            }
        }

        let outcome = match &definition.effect {
            AbilityEffect::Strike {
                multiplier,
                damage_type,
            } => AbilityOutcome::Struck(self.strike(actor, target, *multiplier, *damage_type, rng)?),
            AbilityEffect::Apply(effect) => AbilityOutcome::Applied {
                target,
                outcome: self.attach_effect(target, Arc::new(effect.clone()), Some(actor))?,
            },
            AbilityEffect::Heal { amount } => AbilityOutcome::Healed {
                target,
                amount: self.squad_mut(target).map_or(0, |s| s.heal(*amount)),
            },
        };

        if let Some(squad) = self.squad_mut(actor) {
            squad
                .abilities_mut()
                .start_cooldown(ability, definition.cooldown);
        }
        Ok(AbilityReport {
            actor,
            ability,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::abilities::{AbilityDefinition, AbilityTarget};
    use crate::combat::{DamageOutcome, DamageType};
    use crate::config::BattleConfig;
    use crate::effects::{AttachOutcome, EffectDefinition, EffectKind};
    use crate::grid::{GridSide, Row, SlotId};
    use crate::squad::{CombatStats, Side, SquadDefinition};
    use crate::targeting::SelfResolver;

    fn duel() -> (BattleState, SquadId, SquadId) {
        let mut state = BattleState::new(BattleConfig::default());
        let hero = Arc::new(
            SquadDefinition::new("paladins", "Paladins", 10)
                .with_stats(CombatStats::default().with_damage(4, 4))
                .with_ability(AbilityDefinition {
                    id: AbilityId(1),
                    name: "Smite".into(),
                    cooldown: 2,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Strike {
                        multiplier: 200,
                        damage_type: DamageType::Magic,
                    },
                })
                .with_ability(AbilityDefinition {
                    id: AbilityId(2),
                    name: "Curse".into(),
                    cooldown: 1,
                    target: AbilityTarget::Enemy,
                    effect: AbilityEffect::Apply(EffectDefinition::new(
                        "curse",
                        EffectKind::Damage {
                            amount: 2,
                            damage_type: DamageType::Absolute,
                        },
                        EffectHook::OnTurnEnd,
                        2,
                    )),
                }),
        );
        let enemy = Arc::new(SquadDefinition::new("orcs", "Orcs", 10));
        let h = state.add_squad(Side::Hero, hero, 2);
        let e = state.add_squad(Side::Enemy, enemy, 5);
        let grid = state.grid_mut();
        grid.try_attach_to_slot(SlotId::new(GridSide::Ally, Row::Back, 0), h)
            .unwrap();
        grid.try_attach_to_slot(SlotId::new(GridSide::Enemy, Row::Front, 0), e)
            .unwrap();
        (state, h, e)
    }

    #[test]
    fn dispatch_table_covers_every_action() {
        for tag in ActionTag::iter() {
            let post = tag.post_resolution();
            assert!(!post.hooks.is_empty());
            assert_eq!(post.requeue, tag == ActionTag::Defend);
        }
        assert_eq!(
            ActionTag::Attack.post_resolution().hooks,
            &[EffectHook::OnAttack, EffectHook::OnAction]
        );
        assert_eq!(ActionTag::SkipTurn.post_resolution().flow, TurnFlow::Skip);
    }

    #[test]
    fn attack_applies_rolled_damage() {
        let (mut state, hero, enemy) = duel();
        let report = state
            .execute(hero, &ActionKind::Attack { target: enemy }, &mut BattleRng::new(0))
            .unwrap();

        assert_eq!(
            report,
            ActionReport::Attack(AttackReport {
                attacker: hero,
                target: enemy,
                critical: false,
                outcome: DamageOutcome::Applied {
                    damage: 8,
                    units_lost: 0,
                    defeated: false
                }
            })
        );
        assert_eq!(state.squad(enemy).unwrap().health(), 42);
    }

    #[test]
    fn attacking_own_side_is_rejected() {
        let (mut state, hero, _) = duel();
        assert_eq!(
            state.execute(hero, &ActionKind::Attack { target: hero }, &mut BattleRng::new(0)),
            Err(ActionError::InvalidTarget {
                actor: hero,
                target: hero
            })
        );
    }

    #[test]
    fn resolver_override_decides_target_validity() {
        let (mut state, hero, enemy) = duel();
        let mut rng = BattleRng::new(0);

        assert!(matches!(
            state.execute_with(
                hero,
                &ActionKind::Attack { target: enemy },
                Some(&SelfResolver),
                &mut rng
            ),
            Err(ActionError::InvalidTarget { .. })
        ));
        assert!(matches!(
            state.execute_with(
                hero,
                &ActionKind::Attack { target: hero },
                Some(&SelfResolver),
                &mut rng
            ),
            Ok(ActionReport::Attack(_))
        ));
    }

    #[test]
    fn ability_starts_cooldown_and_blocks_reuse() {
        let (mut state, hero, enemy) = duel();
        let mut rng = BattleRng::new(0);
        let smite = ActionKind::UseAbility {
            ability: AbilityId(1),
            target: enemy,
        };

        state.execute(hero, &smite, &mut rng).unwrap();
        assert_eq!(state.squad(enemy).unwrap().health(), 34);
        assert_eq!(
            state.execute(hero, &smite, &mut rng),
            Err(ActionError::AbilityNotReady {
                ability: AbilityId(1),
                remaining: 2
            })
        );

        state.tick_cooldowns();
        state.tick_cooldowns();
        assert!(state.execute(hero, &smite, &mut rng).is_ok());
    }

    #[test]
    fn apply_ability_attaches_effect_from_actor() {
        let (mut state, hero, enemy) = duel();
        let report = state
            .execute(
                hero,
                &ActionKind::UseAbility {
                    ability: AbilityId(2),
                    target: enemy,
                },
                &mut BattleRng::new(0),
            )
            .unwrap();

        let ActionReport::Ability(AbilityReport {
            outcome: AbilityOutcome::Applied {
                outcome: AttachOutcome::Attached(effect),
                ..
            },
            ..
        }) = report
        else {
            panic!("expected attached effect, got {report:?}");
        };
        let attached = state.squad(enemy).unwrap().effects().get(effect).unwrap();
        assert_eq!(attached.source, Some(hero));
    }

    #[test]
    fn defend_requeues_once_per_round_when_others_wait() {
        let (mut state, hero, enemy) = duel();
        state.begin_round();
        assert_eq!(state.queue().len(), 2);

        let post = state.finish_action(hero, ActionTag::Defend);
        assert_eq!(post.flow, TurnFlow::Skip);
        assert!(state.has_defended(hero));
        assert_eq!(state.queue().count_of(hero), 2);

        state.queue_mut().remove(hero);
        state.finish_action(hero, ActionTag::Defend);
        assert_eq!(state.queue().count_of(hero), 1);
        assert!(state.queue().contains(enemy));
    }

    #[test]
    fn lone_defender_is_not_requeued() {
        let (mut state, hero, enemy) = duel();
        state.begin_round();
        state.queue_mut().remove(enemy);

        state.finish_action(hero, ActionTag::Defend);

        assert_eq!(state.queue().to_vec(), vec![hero]);
    }

    #[test]
    fn intents_need_targets_where_expected() {
        assert_eq!(ActionIntent::Attack.with_target(None), None);
        assert_eq!(
            ActionIntent::Defend.with_target(None),
            Some(ActionKind::Defend)
        );
        assert!(ActionIntent::UseAbility(AbilityId(1)).needs_target());
        assert!(!ActionIntent::SkipTurn.needs_target());
    }
}
