//! Round and turn state machine.
//!
//! ```text
//! RoundInit ─▶ TurnInit ─┬─▶ TurnStart ─▶ TurnWaitAction ─┬─▶ TurnEnd ─▶ TurnInit …
//!                        │                                └─▶ TurnSkip ─▶ TurnEnd
//!                        ├─▶ TurnSkip (defeated or stunned front squad)
//!                        └─▶ RoundEnd ─▶ RoundInit
//! ```
//!
//! Every phase that awaits (controllers, action resolution, effect sweeps)
//! does so sequentially inside [`BattleContext::step`], so the battle has a
//! single resumption point and never runs two suspensions at once.
use std::sync::Arc;

use battle_core::{
    AbilityOutcome, AbilityReport, ActionError, ActionIntent, ActionKind, ActionReport, ActionTag,
    AttachOutcome, AttackReport, BattleResult, EffectHook, Highlight, OpposingResolver, SlotId,
    SquadId, TargetResolver, TurnFlow, evaluate_targets, resolver_for_ability,
};
use tracing::{debug, info, trace, warn};

use crate::api::{ActionOutcome, BattleAction, ControllerKind, RuntimeError};
use crate::context::BattleContext;
use crate::events::{ActionEvent, BattleEvent, GridEvent, SkipReason, TurnEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    RoundInit,
    TurnInit,
    TurnStart,
    TurnWaitAction,
    TurnSkip,
    TurnEnd,
    RoundEnd,
    Finished,
}

impl BattleContext {
    /// Drives the battle to completion.
    ///
    /// Turn-level failures are absorbed as skips and an undecided battle
    /// ends at `max_rounds`, so a built battle always yields a result.
    pub async fn run(&mut self) -> BattleResult {
        while self.phase != BattlePhase::Finished {
            self.step().await;
        }
        self.result
            .clone()
            .unwrap_or_else(|| self.state.battle_result())
    }

    /// Runs the current phase and returns the phase entered next.
    pub async fn step(&mut self) -> BattlePhase {
        let next = match self.phase {
            BattlePhase::RoundInit => self.round_init().await,
            BattlePhase::TurnInit => self.turn_init().await,
            BattlePhase::TurnStart => self.turn_start().await,
            BattlePhase::TurnWaitAction => self.turn_wait_action().await,
            BattlePhase::TurnSkip => self.turn_skip(),
            BattlePhase::TurnEnd => self.turn_end().await,
            BattlePhase::RoundEnd => self.round_end().await,
            BattlePhase::Finished => BattlePhase::Finished,
        };
        trace!(target: "battle::machine", from = ?self.phase, to = ?next, "Phase transition");
        self.phase = next;
        next
    }

    async fn round_init(&mut self) -> BattlePhase {
        if self.state.round() == 0 {
            self.bus.publish(BattleEvent::Started {
                squads: self.state.roster().len(),
                seed: self.config.seed,
            });
        }
        if self.state.is_battle_finished() {
            return self.finish();
        }
        if self.state.round() >= self.config.max_rounds {
            warn!(
                target: "battle::machine",
                limit = self.config.max_rounds,
                "Round limit reached; ending battle"
            );
            self.state.time_out();
            self.bus.publish(BattleEvent::TimedOut {
                rounds: self.state.round(),
            });
            return self.finish();
        }

        let round = self.state.begin_round();
        self.abilities.on_tick(&mut self.state);
        info!(
            target: "battle::machine",
            round,
            queued = self.state.queue().len(),
            "Round started"
        );
        self.bus.publish(TurnEvent::RoundStarted { round });
        self.effects
            .trigger(&mut self.state, &mut self.rng, EffectHook::OnRoundStart)
            .await;
        self.publish_queue();
        BattlePhase::TurnInit
    }

    async fn turn_init(&mut self) -> BattlePhase {
        if self.flee.is_requested() {
            return self.flee();
        }
        let Some(squad) = self.state.queue().peek() else {
            return BattlePhase::RoundEnd;
        };
        if !self.state.is_alive(squad) {
            return self.skip(squad, SkipReason::Defeated);
        }
        if let Some(report) = self.state.consume_stun(squad) {
            debug!(target: "battle::machine", %squad, expired = report.expired, "Squad is stunned");
            self.effects.report(&report).await;
            return self.skip(squad, SkipReason::Stunned);
        }
        BattlePhase::TurnStart
    }

    async fn turn_start(&mut self) -> BattlePhase {
        let Some(squad) = self.state.queue().peek() else {
            return BattlePhase::RoundEnd;
        };
        self.state.set_active(Some(squad));
        self.bus
            .publish(TurnEvent::ActiveUnitChanged { squad: Some(squad) });
        if let Some(slot) = self.state.grid().slot_of(squad) {
            self.highlight(slot, Highlight::Active);
        }

        self.effects
            .trigger_for(&mut self.state, &mut self.rng, EffectHook::OnTurnStart, squad)
            .await;
        if !self.state.is_alive(squad) {
            return self.skip(squad, SkipReason::Defeated);
        }

        let abilities = self.abilities.abilities_of(&self.state, squad);
        self.bus
            .publish(TurnEvent::AbilitiesPublished { squad, abilities });
        BattlePhase::TurnWaitAction
    }

    async fn turn_wait_action(&mut self) -> BattlePhase {
        let Some(actor) = self.state.active() else {
            return BattlePhase::TurnEnd;
        };
        let Some(side) = self.state.squad(actor).map(|s| s.side()) else {
            return self.skip(actor, SkipReason::Defeated);
        };
        let controller = match self.controllers.get(side) {
            Ok(controller) => controller,
            Err(error) => {
                self.fail(actor, &error);
                return self.skip(actor, SkipReason::Failed);
            }
        };

        loop {
            let action = match controller.request_action(&self.state, actor).await {
                Ok(Some(action)) => action,
                Ok(None) => return self.skip(actor, SkipReason::NoAction),
                Err(error) => {
                    self.fail(actor, &error);
                    return self.skip(actor, SkipReason::Failed);
                }
            };
            if action.actor() != actor {
                let error = RuntimeError::ActorMismatch {
                    expected: actor,
                    provided: action.actor(),
                };
                self.fail(actor, &error);
                return self.skip(actor, SkipReason::Failed);
            }

            self.attach_action(action);
            let resolved = match self.current_action.as_mut() {
                Some(action) => action.resolve().await,
                None => Err(RuntimeError::AlreadyResolved),
            };

            match resolved {
                Ok(ActionOutcome::Resolved(kind)) => return self.perform(actor, kind).await,
                Ok(ActionOutcome::Cancelled) => {
                    self.detach_action();
                    self.bus.publish(ActionEvent::Cancelled { actor });
                    debug!(
                        target: "battle::machine",
                        %actor,
                        controller = %controller.kind(),
                        "Action cancelled"
                    );
                    if controller.kind() != ControllerKind::Human {
                        return self.skip(actor, SkipReason::Cancelled);
                    }
                }
                Err(error) => {
                    self.detach_action();
                    self.fail(actor, &error);
                    return self.skip(actor, SkipReason::Failed);
                }
            }
        }
    }

    fn turn_skip(&mut self) -> BattlePhase {
        if let Some((squad, reason)) = self.pending_skip.take() {
            debug!(target: "battle::machine", %squad, ?reason, "Turn skipped");
            self.bus.publish(TurnEvent::TurnSkipped { squad, reason });
        }
        BattlePhase::TurnEnd
    }

    async fn turn_end(&mut self) -> BattlePhase {
        self.detach_action();
        self.state.grid_mut().reset_highlights();
        self.bus.publish(GridEvent::HighlightsReset);

        if let Some(actor) = self.state.active() {
            self.effects
                .trigger_for(&mut self.state, &mut self.rng, EffectHook::OnTurnEnd, actor)
                .await;
        }
        self.state.queue_mut().next_turn();
        if self.state.active().is_some() {
            self.state.set_active(None);
            self.bus
                .publish(TurnEvent::ActiveUnitChanged { squad: None });
        }
        self.remove_defeated();

        if self.flee.is_requested() {
            return self.flee();
        }
        if self.state.is_battle_finished() {
            return self.finish();
        }
        BattlePhase::TurnInit
    }

    async fn round_end(&mut self) -> BattlePhase {
        if self.state.is_battle_finished() {
            return self.finish();
        }
        self.effects
            .trigger(&mut self.state, &mut self.rng, EffectHook::OnRoundEnd)
            .await;
        self.remove_defeated();

        if self.flee.is_requested() {
            return self.flee();
        }
        if self.state.is_battle_finished() {
            return self.finish();
        }
        BattlePhase::RoundInit
    }

    /// Executes a resolved action and dispatches its post-resolution entry.
    async fn perform(&mut self, actor: SquadId, kind: ActionKind) -> BattlePhase {
        if let Some(target) = kind.target()
            && !self.target_validity.get(&target).copied().unwrap_or(false)
        {
            self.detach_action();
            let error = RuntimeError::Action(ActionError::InvalidTarget { actor, target });
            self.fail(actor, &error);
            return self.skip(actor, SkipReason::Failed);
        }
        let resolver = self
            .current_action
            .as_ref()
            .and_then(|action| action.resolver().cloned());
        self.detach_action();

        let report = match self.state.execute_with(
            actor,
            &kind,
            resolver.as_deref(),
            &mut self.rng,
        ) {
            Ok(report) => report,
            Err(error) => {
                self.fail(actor, &RuntimeError::Action(error));
                return self.skip(actor, SkipReason::Failed);
            }
        };
        info!(target: "battle::machine", %actor, action = %kind.tag(), "Action resolved");
        self.bus.publish(ActionEvent::Resolved { actor, report });

        match report {
            ActionReport::Attack(attack)
            | ActionReport::Ability(AbilityReport {
                outcome: AbilityOutcome::Struck(attack),
                ..
            }) => self.after_strike(attack).await,
            ActionReport::Ability(AbilityReport {
                outcome:
                    AbilityOutcome::Applied {
                        target,
                        outcome: AttachOutcome::Attached(effect),
                    },
                ..
            }) => {
                self.effects
                    .fire_attached(&mut self.state, &mut self.rng, target, effect)
                    .await;
            }
            _ => {}
        }

        let tag = kind.tag();
        let post = self.state.finish_action(actor, tag);
        if post.mark_defended {
            self.publish_queue();
        }
        for hook in post.hooks {
            self.effects
                .trigger_for(&mut self.state, &mut self.rng, *hook, actor)
                .await;
        }

        match post.flow {
            TurnFlow::Done => BattlePhase::TurnEnd,
            TurnFlow::Skip if tag == ActionTag::Defend => self.skip(actor, SkipReason::Defended),
            TurnFlow::Skip => self.skip(actor, SkipReason::Skipped),
        }
    }

    async fn after_strike(&mut self, attack: AttackReport) {
        if !attack.outcome.landed() {
            debug!(target: "battle::machine", attacker = %attack.attacker, target = %attack.target, "Attack dodged");
            return;
        }
        self.bus.publish(ActionEvent::DamageApplied {
            target: attack.target,
            outcome: attack.outcome,
        });
        self.presentation
            .damage_applied(attack.target, &attack.outcome)
            .await;
        self.effects
            .trigger_for(
                &mut self.state,
                &mut self.rng,
                EffectHook::OnApplyDamage,
                attack.target,
            )
            .await;
        self.effects
            .trigger_for(
                &mut self.state,
                &mut self.rng,
                EffectHook::OnDealDamage,
                attack.attacker,
            )
            .await;
    }

    /// Replaces the live action and recomputes target validity.
    fn attach_action(&mut self, action: BattleAction) {
        self.detach_action();
        let actor = action.actor();
        let intent = action.intent();

        if intent.needs_target() {
            let resolver = action
                .resolver()
                .cloned()
                .unwrap_or_else(|| self.default_resolver(actor, intent));
            self.target_validity = evaluate_targets(&self.state, resolver.as_ref(), actor);

            let updates: Vec<(SlotId, Highlight)> = self
                .target_validity
                .iter()
                .filter(|(squad, _)| **squad != actor)
                .filter_map(|(squad, valid)| {
                    let slot = self.state.grid().slot_of(*squad)?;
                    let highlight = if *valid {
                        Highlight::Available
                    } else {
                        Highlight::Unavailable
                    };
                    Some((slot, highlight))
                })
                .collect();
            for (slot, highlight) in updates {
                self.highlight(slot, highlight);
            }
        }

        debug!(target: "battle::machine", %actor, ?intent, "Action attached");
        self.bus.publish(ActionEvent::Attached { actor, intent });
        self.current_action = Some(action);
    }

    /// Drops the live action, its validity and its highlights.
    fn detach_action(&mut self) {
        if self.current_action.take().is_none() && self.target_validity.is_empty() {
            return;
        }
        self.target_validity.clear();
        self.state.grid_mut().reset_highlights();
        self.bus.publish(GridEvent::HighlightsReset);
        if let Some(active) = self.state.active()
            && let Some(slot) = self.state.grid().slot_of(active)
        {
            self.highlight(slot, Highlight::Active);
        }
    }

    fn default_resolver(&self, actor: SquadId, intent: ActionIntent) -> Arc<dyn TargetResolver> {
        match intent {
            ActionIntent::UseAbility(ability) => self
                .state
                .squad(actor)
                .and_then(|s| s.definition().ability(ability))
                .map(|a| resolver_for_ability(a.target))
                .unwrap_or_else(|| Arc::new(OpposingResolver)),
            _ => Arc::new(OpposingResolver),
        }
    }

    fn highlight(&mut self, slot: SlotId, highlight: Highlight) {
        if self.state.grid_mut().set_highlight(slot, highlight) {
            self.bus
                .publish(GridEvent::HighlightChanged { slot, highlight });
        }
    }

    fn remove_defeated(&mut self) {
        let removed = self.state.remove_defeated();
        if removed.is_empty() {
            return;
        }
        for (squad, slot) in removed {
            info!(target: "battle::machine", %squad, "Squad defeated");
            self.bus.publish(GridEvent::SquadRemoved { squad, slot });
        }
        self.publish_queue();
    }

    fn publish_queue(&self) {
        self.bus.publish(TurnEvent::QueueChanged {
            queue: self.state.queue().to_vec(),
        });
    }

    fn skip(&mut self, squad: SquadId, reason: SkipReason) -> BattlePhase {
        self.pending_skip = Some((squad, reason));
        BattlePhase::TurnSkip
    }

    fn fail(&self, actor: SquadId, error: &RuntimeError) {
        warn!(
            target: "battle::machine",
            %actor,
            code = error.error_code(),
            %error,
            "Action failed; skipping turn"
        );
        self.bus.publish(ActionEvent::Failed {
            actor,
            error: error.to_string(),
        });
    }

    fn flee(&mut self) -> BattlePhase {
        info!(target: "battle::machine", round = self.state.round(), "Flee requested");
        self.state.request_flee();
        self.bus.publish(BattleEvent::FleeRequested);
        self.finish()
    }

    fn finish(&mut self) -> BattlePhase {
        self.detach_action();
        self.state.mark_finished();
        let result = self.state.battle_result();
        info!(
            target: "battle::machine",
            status = %result.status,
            rounds = result.rounds,
            experience = result.experience,
            "Battle finished"
        );
        self.bus.publish(BattleEvent::Finished(result.clone()));
        self.scope.dispose();
        self.result = Some(result);
        BattlePhase::Finished
    }
}
