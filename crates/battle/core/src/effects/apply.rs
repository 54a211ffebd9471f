//! Attaching and firing effects against the battle state.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::combat::{Damage, DamageOutcome};
use crate::error::{BattleError, ErrorSeverity};
use crate::rng::BattleRng;
use crate::squad::SquadId;
use crate::state::BattleState;

use super::{AttachOutcome, EffectDefinition, EffectHook, EffectId, EffectKind};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("squad {squad} is not part of the battle")]
    UnknownSquad { squad: SquadId },

    #[error("squad {squad} is defeated")]
    Defeated { squad: SquadId },

    #[error("{effect} is not attached to squad {squad}")]
    NotAttached { squad: SquadId, effect: EffectId },
}

impl BattleError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Defeated { .. } => ErrorSeverity::Recoverable,
            Self::UnknownSquad { .. } => ErrorSeverity::Validation,
            Self::NotAttached { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSquad { .. } => "effect_unknown_squad",
            Self::Defeated { .. } => "effect_defeated",
            Self::NotAttached { .. } => "effect_not_attached",
        }
    }
}

/// What a single activation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectOutcome {
    /// Only the tick was consumed (modifiers, stun).
    Ticked,
    Damaged {
        target: SquadId,
        outcome: DamageOutcome,
    },
    Healed {
        target: SquadId,
        amount: u32,
    },
    /// A spread effect found no other living squad to hit.
    NoTarget,
}

/// Report of one effect activation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectReport {
    pub holder: SquadId,
    pub effect: EffectId,
    pub name: String,
    pub trigger: EffectHook,
    pub outcome: EffectOutcome,
    /// The effect used its last tick and was removed.
    pub expired: bool,
}

impl BattleState {
    /// Attaches an effect to a living squad.
    ///
    /// Modifier effects register their modifiers under the new effect id.
    /// Firing `OnAttach` effects is left to the caller so presentation can
    /// await it.
    pub fn attach_effect(
        &mut self,
        target: SquadId,
        definition: Arc<EffectDefinition>,
        source: Option<SquadId>,
    ) -> Result<AttachOutcome, EffectError> {
        let id = self.peek_effect_id();
        let squad = self
            .squad_mut(target)
            .ok_or(EffectError::UnknownSquad { squad: target })?;
        if squad.is_defeated() {
            return Err(EffectError::Defeated { squad: target });
        }

        let outcome = squad
            .effects_mut()
            .attach(id, Arc::clone(&definition), source);
        match outcome {
            AttachOutcome::Attached(id) => {
                if let EffectKind::Modifiers(modifiers) = &definition.kind {
                    squad.modifiers_mut().add(id, modifiers.iter().copied());
                }
                self.commit_effect_id();
            }
            AttachOutcome::Full => {
                warn!(
                    target: "battle::effects",
                    squad = %target,
                    effect = %definition.name,
                    "Status effect capacity reached, effect dropped"
                );
            }
            AttachOutcome::Refreshed(_) | AttachOutcome::Ignored(_) => {}
        }

        debug!(
            target: "battle::effects",
            squad = %target,
            effect = %definition.name,
            ?outcome,
            "Effect attached"
        );
        Ok(outcome)
    }

    /// Fires one effect on `holder` and consumes one of its ticks.
    pub fn fire_effect(
        &mut self,
        holder: SquadId,
        effect: EffectId,
        rng: &mut BattleRng,
    ) -> Result<EffectReport, EffectError> {
        let squad = self
            .squad(holder)
            .ok_or(EffectError::UnknownSquad { squad: holder })?;
        if squad.is_defeated() {
            return Err(EffectError::Defeated { squad: holder });
        }
        let definition = squad
            .effects()
            .get(effect)
            .map(|e| Arc::clone(&e.definition))
            .ok_or(EffectError::NotAttached {
                squad: holder,
                effect,
            })?;
        let grid_side = squad.side().grid_side();

        let outcome = match &definition.kind {
            EffectKind::Damage {
                amount,
                damage_type,
            } => {
                let damage = Damage::effect(*amount, *damage_type);
                self.damage_squad(holder, &damage, rng)
            }
            EffectKind::Heal { amount } => {
                let healed = self.squad_mut(holder).map_or(0, |s| s.heal(*amount));
                EffectOutcome::Healed {
                    target: holder,
                    amount: healed,
                }
            }
            EffectKind::Modifiers(_) | EffectKind::Stun => EffectOutcome::Ticked,
            EffectKind::Spread {
                amount,
                damage_type,
            } => {
                let candidates: Vec<SquadId> = self
                    .roster()
                    .iter()
                    .filter(|s| {
                        s.id() != holder && s.is_alive() && s.side().grid_side() == grid_side
                    })
                    .map(|s| s.id())
                    .collect();
                match rng.pick_index(candidates.len()) {
                    Some(index) => {
                        let damage = Damage::effect(*amount, *damage_type);
                        self.damage_squad(candidates[index], &damage, rng)
                    }
                    None => EffectOutcome::NoTarget,
                }
            }
        };

        let expired = self.consume_effect_tick(holder, effect);
        Ok(EffectReport {
            holder,
            effect,
            name: definition.name.clone(),
            trigger: definition.trigger,
            outcome,
            expired,
        })
    }

    /// Consumes one stun tick if `squad` is stunned.
    pub fn consume_stun(&mut self, squad: SquadId) -> Option<EffectReport> {
        let model = self.squad(squad)?;
        if model.is_defeated() {
            return None;
        }
        let effect = model.effects().first_stun()?;
        let name = model.effects().get(effect)?.name().to_owned();
        let trigger = model.effects().get(effect)?.definition.trigger;

        let expired = self.consume_effect_tick(squad, effect);
        Some(EffectReport {
            holder: squad,
            effect,
            name,
            trigger,
            outcome: EffectOutcome::Ticked,
            expired,
        })
    }

    /// Every `(holder, effect)` pair listening on `hook`, in roster order.
    pub fn effects_for_hook(&self, hook: EffectHook) -> Vec<(SquadId, EffectId)> {
        self.roster()
            .iter()
            .filter(|s| s.is_alive())
            .flat_map(|s| {
                s.effects()
                    .matching(hook)
                    .into_iter()
                    .map(move |e| (s.id(), e))
            })
            .collect()
    }

    /// Effects on one squad listening on `hook`.
    pub fn effects_for_hook_on(&self, hook: EffectHook, squad: SquadId) -> Vec<EffectId> {
        self.squad(squad)
            .filter(|s| s.is_alive())
            .map(|s| s.effects().matching(hook))
            .unwrap_or_default()
    }

    fn damage_squad(&mut self, target: SquadId, damage: &Damage, rng: &mut BattleRng) -> EffectOutcome {
        match self.squad_mut(target) {
            Some(squad) => EffectOutcome::Damaged {
                target,
                outcome: squad.receive_damage(damage, rng),
            },
            None => EffectOutcome::NoTarget,
        }
    }

    /// Returns true if the effect ran out and was removed with its modifiers.
    fn consume_effect_tick(&mut self, holder: SquadId, effect: EffectId) -> bool {
        let Some(squad) = self.squad_mut(holder) else {
            return false;
        };
        if squad.effects_mut().consume_tick(effect) != Some(true) {
            return false;
        }
        squad.effects_mut().remove(effect);
        squad.modifiers_mut().remove(effect);
        debug!(target: "battle::effects", squad = %holder, %effect, "Effect expired");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;
    use crate::config::BattleConfig;
    use crate::squad::{CombatStats, Side, SquadDefinition};
    use crate::stats::{Bonus, StatKind, StatModifier};

    fn state_with(squads: &[(Side, u32)]) -> (BattleState, Vec<SquadId>) {
        let mut state = BattleState::new(BattleConfig::default());
        let definition = Arc::new(
            SquadDefinition::new("militia", "Militia", 10)
                .with_stats(CombatStats::default().with_initiative(4)),
        );
        let ids = squads
            .iter()
            .map(|(side, count)| state.add_squad(*side, Arc::clone(&definition), *count))
            .collect();
        (state, ids)
    }

    fn burn(ticks: u32) -> Arc<EffectDefinition> {
        Arc::new(EffectDefinition::new(
            "burn",
            EffectKind::Damage {
                amount: 5,
                damage_type: DamageType::Magic,
            },
            EffectHook::OnTurnStart,
            ticks,
        ))
    }

    #[test]
    fn each_activation_consumes_a_tick_until_expiry() {
        let (mut state, ids) = state_with(&[(Side::Hero, 3)]);
        let mut rng = BattleRng::new(0);
        let AttachOutcome::Attached(effect) = state.attach_effect(ids[0], burn(2), None).unwrap()
        else {
            panic!("expected attach");
        };

        let first = state.fire_effect(ids[0], effect, &mut rng).unwrap();
        assert!(!first.expired);
        let second = state.fire_effect(ids[0], effect, &mut rng).unwrap();
        assert!(second.expired);

        assert_eq!(state.squad(ids[0]).unwrap().health(), 20);
        assert!(state.squad(ids[0]).unwrap().effects().is_empty());
        assert_eq!(
            state.fire_effect(ids[0], effect, &mut rng),
            Err(EffectError::NotAttached {
                squad: ids[0],
                effect
            })
        );
    }

    #[test]
    fn modifiers_are_removed_with_their_effect() {
        let (mut state, ids) = state_with(&[(Side::Ally, 2)]);
        let mut rng = BattleRng::new(0);
        let haste = Arc::new(EffectDefinition::new(
            "haste",
            EffectKind::Modifiers(vec![StatModifier::new(
                StatKind::Initiative,
                Bonus::Flat(6),
            )]),
            EffectHook::OnRoundEnd,
            1,
        ));

        let AttachOutcome::Attached(effect) = state.attach_effect(ids[0], haste, None).unwrap()
        else {
            panic!("expected attach");
        };
        assert_eq!(state.squad(ids[0]).unwrap().initiative(), 10);

        let report = state.fire_effect(ids[0], effect, &mut rng).unwrap();
        assert_eq!(report.outcome, EffectOutcome::Ticked);
        assert!(report.expired);
        assert_eq!(state.squad(ids[0]).unwrap().initiative(), 4);
    }

    #[test]
    fn spread_hits_another_squad_on_the_same_side() {
        let (mut state, ids) = state_with(&[(Side::Enemy, 2), (Side::Enemy, 2), (Side::Hero, 2)]);
        let mut rng = BattleRng::new(17);
        let plague = Arc::new(EffectDefinition::new(
            "plague",
            EffectKind::Spread {
                amount: 4,
                damage_type: DamageType::Absolute,
            },
            EffectHook::OnRoundStart,
            3,
        ));
        let AttachOutcome::Attached(effect) = state.attach_effect(ids[0], plague, None).unwrap()
        else {
            panic!("expected attach");
        };

        let report = state.fire_effect(ids[0], effect, &mut rng).unwrap();

        assert!(matches!(
            report.outcome,
            EffectOutcome::Damaged { target, .. } if target == ids[1]
        ));
        assert_eq!(state.squad(ids[1]).unwrap().health(), 16);
        assert_eq!(state.squad(ids[0]).unwrap().health(), 20);
        assert_eq!(state.squad(ids[2]).unwrap().health(), 20);
    }

    #[test]
    fn spread_without_neighbours_finds_no_target() {
        let (mut state, ids) = state_with(&[(Side::Enemy, 2), (Side::Hero, 1)]);
        let mut rng = BattleRng::new(0);
        let plague = Arc::new(EffectDefinition::new(
            "plague",
            EffectKind::Spread {
                amount: 4,
                damage_type: DamageType::Absolute,
            },
            EffectHook::OnRoundStart,
            3,
        ));
        state.attach_effect(ids[0], plague, None).unwrap();

        let pairs = state.effects_for_hook(EffectHook::OnRoundStart);
        let report = state.fire_effect(pairs[0].0, pairs[0].1, &mut rng).unwrap();
        assert_eq!(report.outcome, EffectOutcome::NoTarget);
    }

    #[test]
    fn hook_lookup_follows_roster_order_and_skips_defeated() {
        let (mut state, ids) = state_with(&[(Side::Hero, 1), (Side::Enemy, 1), (Side::Ally, 1)]);
        let mut rng = BattleRng::new(0);
        for id in [ids[2], ids[0], ids[1]] {
            state.attach_effect(id, burn(3), None).unwrap();
        }
        state
            .squad_mut(ids[1])
            .unwrap()
            .receive_damage(&Damage::effect(100, DamageType::Absolute), &mut rng);

        let holders: Vec<SquadId> = state
            .effects_for_hook(EffectHook::OnTurnStart)
            .into_iter()
            .map(|(holder, _)| holder)
            .collect();
        assert_eq!(holders, vec![ids[0], ids[2]]);
        assert!(state.effects_for_hook_on(EffectHook::OnTurnStart, ids[1]).is_empty());
    }

    #[test]
    fn stun_ticks_are_consumed_per_lost_turn() {
        let (mut state, ids) = state_with(&[(Side::Enemy, 1)]);
        let stun = Arc::new(EffectDefinition::new(
            "daze",
            EffectKind::Stun,
            EffectHook::OnTurnStart,
            2,
        ));
        state.attach_effect(ids[0], stun, None).unwrap();

        assert!(!state.consume_stun(ids[0]).unwrap().expired);
        assert!(state.consume_stun(ids[0]).unwrap().expired);
        assert!(state.consume_stun(ids[0]).is_none());
    }

    #[test]
    fn attaching_to_defeated_squad_fails() {
        let (mut state, ids) = state_with(&[(Side::Enemy, 1)]);
        let mut rng = BattleRng::new(0);
        state
            .squad_mut(ids[0])
            .unwrap()
            .receive_damage(&Damage::effect(100, DamageType::Absolute), &mut rng);

        assert_eq!(
            state.attach_effect(ids[0], burn(1), None),
            Err(EffectError::Defeated { squad: ids[0] })
        );
        assert_eq!(
            state.attach_effect(SquadId(77), burn(1), None),
            Err(EffectError::UnknownSquad {
                squad: SquadId(77)
            })
        );
    }
}
