use std::sync::Arc;

use battle_core::{
    BattleError, BattleRng, BattleState, EffectHook, EffectId, EffectOutcome, EffectReport,
    ErrorSeverity, SquadId,
};
use tracing::{debug, warn};

use crate::events::{ActionEvent, EventBus};
use crate::presentation::PresentationSink;

/// Fires status effects for hooks.
///
/// A sweep collects matching effects up front, then fires them one at a time
/// in roster order, awaiting presentation after each. An effect whose holder
/// died earlier in the sweep is skipped. Failures are logged and never stop
/// the sweep.
#[derive(Clone)]
pub struct EffectsManager {
    bus: EventBus,
    presentation: Arc<dyn PresentationSink>,
}

impl EffectsManager {
    pub fn new(bus: EventBus, presentation: Arc<dyn PresentationSink>) -> Self {
        Self { bus, presentation }
    }

    /// Fires every effect on the field listening on `hook`.
    pub async fn trigger(
        &self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        hook: EffectHook,
    ) -> Vec<EffectReport> {
        let pending = state.effects_for_hook(hook);
        let mut reports = Vec::with_capacity(pending.len());
        for (holder, effect) in pending {
            if let Some(report) = self.fire(state, rng, holder, effect).await {
                reports.push(report);
            }
        }
        reports
    }

    /// Fires the effects of one squad listening on `hook`.
    pub async fn trigger_for(
        &self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        hook: EffectHook,
        squad: SquadId,
    ) -> Vec<EffectReport> {
        let pending = state.effects_for_hook_on(hook, squad);
        let mut reports = Vec::with_capacity(pending.len());
        for effect in pending {
            if let Some(report) = self.fire(state, rng, squad, effect).await {
                reports.push(report);
            }
        }
        reports
    }

    /// Fires a freshly attached effect if it listens on `OnAttach`.
    pub async fn fire_attached(
        &self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        holder: SquadId,
        effect: EffectId,
    ) -> Option<EffectReport> {
        let on_attach = state
            .squad(holder)
            .and_then(|s| s.effects().get(effect))
            .is_some_and(|e| e.definition.trigger == EffectHook::OnAttach && !e.definition.is_stun());
        if !on_attach {
            return None;
        }
        self.fire(state, rng, holder, effect).await
    }

    /// Publishes a stun tick consumed outside a sweep.
    pub async fn report(&self, report: &EffectReport) {
        self.bus.publish(ActionEvent::EffectTriggered(report.clone()));
        self.presentation.effect_applied(report).await;
    }

    async fn fire(
        &self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        holder: SquadId,
        effect: EffectId,
    ) -> Option<EffectReport> {
        let report = match state.fire_effect(holder, effect, rng) {
            Ok(report) => report,
            Err(error) => {
                if error.severity() == ErrorSeverity::Recoverable {
                    debug!(
                        target: "battle::effects",
                        squad = %holder,
                        %effect,
                        code = error.error_code(),
                        "Effect skipped"
                    );
                } else {
                    warn!(
                        target: "battle::effects",
                        squad = %holder,
                        %effect,
                        code = error.error_code(),
                        %error,
                        "Effect failed to fire"
                    );
                }
                return None;
            }
        };

        debug!(
            target: "battle::effects",
            squad = %holder,
            effect = %report.name,
            trigger = %report.trigger,
            expired = report.expired,
            "Effect fired"
        );
        if let EffectOutcome::Damaged { target, outcome } = report.outcome {
            self.bus
                .publish(ActionEvent::DamageApplied { target, outcome });
            self.presentation.damage_applied(target, &outcome).await;
        }
        self.report(&report).await;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{
        BattleConfig, DamageType, EffectDefinition, EffectKind, Side, SquadDefinition,
    };

    use super::*;
    use crate::events::{Event, Topic};
    use crate::presentation::NullPresentation;

    fn burn(trigger: EffectHook, ticks: u32) -> Arc<EffectDefinition> {
        Arc::new(EffectDefinition::new(
            "burn",
            EffectKind::Damage {
                amount: 3,
                damage_type: DamageType::Absolute,
            },
            trigger,
            ticks,
        ))
    }

    fn setup() -> (BattleState, SquadId, SquadId) {
        let mut state = BattleState::new(BattleConfig::default());
        let def = Arc::new(SquadDefinition::new("imps", "Imps", 10));
        let first = state.add_squad(Side::Enemy, Arc::clone(&def), 2);
        let second = state.add_squad(Side::Hero, def, 2);
        (state, first, second)
    }

    #[tokio::test]
    async fn sweep_fires_in_roster_order_and_expires() {
        let (mut state, first, second) = setup();
        state
            .attach_effect(second, burn(EffectHook::OnRoundEnd, 1), None)
            .unwrap();
        state
            .attach_effect(first, burn(EffectHook::OnRoundEnd, 2), None)
            .unwrap();
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Topic::Action);
        let manager = EffectsManager::new(bus, Arc::new(NullPresentation));
        let mut rng = BattleRng::new(1);

        let reports = manager
            .trigger(&mut state, &mut rng, EffectHook::OnRoundEnd)
            .await;

        let holders: Vec<SquadId> = reports.iter().map(|r| r.holder).collect();
        assert_eq!(holders, vec![first, second]);
        assert!(reports[1].expired);
        assert!(state.squad(second).unwrap().effects().is_empty());
        assert_eq!(state.squad(first).unwrap().health(), 17);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::Action(ActionEvent::DamageApplied { .. })
        ));
    }

    #[tokio::test]
    async fn trigger_for_only_touches_one_squad() {
        let (mut state, first, second) = setup();
        state
            .attach_effect(first, burn(EffectHook::OnTurnStart, 3), None)
            .unwrap();
        state
            .attach_effect(second, burn(EffectHook::OnTurnStart, 3), None)
            .unwrap();
        let manager = EffectsManager::new(EventBus::new(), Arc::new(NullPresentation));

        let reports = manager
            .trigger_for(
                &mut state,
                &mut BattleRng::new(1),
                EffectHook::OnTurnStart,
                second,
            )
            .await;

        assert_eq!(reports.len(), 1);
        assert_eq!(state.squad(first).unwrap().health(), 20);
        assert_eq!(state.squad(second).unwrap().health(), 17);
    }

    #[tokio::test]
    async fn on_attach_fires_only_matching_effects() {
        let (mut state, first, _) = setup();
        let manager = EffectsManager::new(EventBus::new(), Arc::new(NullPresentation));
        let mut rng = BattleRng::new(1);
        let instant = match state
            .attach_effect(first, burn(EffectHook::OnAttach, 1), None)
            .unwrap()
        {
            battle_core::AttachOutcome::Attached(id) => id,
            other => panic!("unexpected {other:?}"),
        };

        assert!(manager
            .fire_attached(&mut state, &mut rng, first, instant)
            .await
            .is_some());
        assert_eq!(state.squad(first).unwrap().health(), 17);
        assert!(manager
            .fire_attached(&mut state, &mut rng, first, instant)
            .await
            .is_none());
    }
}
