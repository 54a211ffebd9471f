//! Pluggable target validity rules.
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::abilities::AbilityTarget;
use crate::error::{BattleError, ErrorSeverity};
use crate::grid::Row;
use crate::squad::{SquadId, SquadModel};
use crate::state::BattleState;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetingError {
    #[error("squad {squad} is not part of the battle")]
    UnknownSquad { squad: SquadId },

    #[error("squad {squad} is not placed on the grid")]
    NotPlaced { squad: SquadId },
}

impl BattleError for TargetingError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownSquad { .. } => ErrorSeverity::Validation,
            Self::NotPlaced { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSquad { .. } => "targeting_unknown_squad",
            Self::NotPlaced { .. } => "targeting_not_placed",
        }
    }
}

/// Decides whether `actor` may target `candidate` in the current state.
pub trait TargetResolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve_target(
        &self,
        state: &BattleState,
        actor: SquadId,
        candidate: SquadId,
    ) -> Result<bool, TargetingError>;
}

/// Looks up both squads. A fallen candidate resolves to `Ok(None)`.
fn lookup<'a>(
    state: &'a BattleState,
    actor: SquadId,
    candidate: SquadId,
) -> Result<Option<(&'a SquadModel, &'a SquadModel)>, TargetingError> {
    let actor = state
        .squad(actor)
        .ok_or(TargetingError::UnknownSquad { squad: actor })?;
    match state.squad(candidate) {
        Some(target) if target.is_alive() => Ok(Some((actor, target))),
        Some(_) => Ok(None),
        None if state.is_fallen(candidate) => Ok(None),
        None => Err(TargetingError::UnknownSquad { squad: candidate }),
    }
}

/// Default attack rule.
///
/// The candidate must stand on the opposing side. Ranged and magic attackers
/// reach any slot; melee attackers reach the front row, and the back row only
/// once the opposing front row holds no living squad.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpposingResolver;

impl TargetResolver for OpposingResolver {
    fn name(&self) -> &'static str {
        "opposing"
    }

    fn resolve_target(
        &self,
        state: &BattleState,
        actor: SquadId,
        candidate: SquadId,
    ) -> Result<bool, TargetingError> {
        let Some((attacker, target)) = lookup(state, actor, candidate)? else {
            return Ok(false);
        };
        let target_side = target.side().grid_side();
        if attacker.side().grid_side() == target_side {
            return Ok(false);
        }
        if attacker.definition().attack.reaches_back_row() {
            return Ok(true);
        }

        let slot = state
            .grid()
            .slot_of(candidate)
            .ok_or(TargetingError::NotPlaced { squad: candidate })?;
        Ok(slot.row == Row::Front || !state.has_live_front_row(target_side))
    }
}

/// Living squads on the actor's own side, the actor included.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlliedResolver;

impl TargetResolver for AlliedResolver {
    fn name(&self) -> &'static str {
        "allied"
    }

    fn resolve_target(
        &self,
        state: &BattleState,
        actor: SquadId,
        candidate: SquadId,
    ) -> Result<bool, TargetingError> {
        let Some((actor, target)) = lookup(state, actor, candidate)? else {
            return Ok(false);
        };
        Ok(actor.side().grid_side() == target.side().grid_side())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SelfResolver;

impl TargetResolver for SelfResolver {
    fn name(&self) -> &'static str {
        "self"
    }

    fn resolve_target(
        &self,
        state: &BattleState,
        actor: SquadId,
        candidate: SquadId,
    ) -> Result<bool, TargetingError> {
        Ok(lookup(state, actor, candidate)?.is_some() && actor == candidate)
    }
}

pub fn resolver_for_ability(target: AbilityTarget) -> Arc<dyn TargetResolver> {
    match target {
        AbilityTarget::Enemy => Arc::new(OpposingResolver),
        AbilityTarget::Ally => Arc::new(AlliedResolver),
        AbilityTarget::SelfOnly => Arc::new(SelfResolver),
    }
}

/// Validity of every squad on the field as a target for `actor`.
///
/// Resolver errors are logged and the candidate counts as invalid.
pub fn evaluate_targets(
    state: &BattleState,
    resolver: &dyn TargetResolver,
    actor: SquadId,
) -> BTreeMap<SquadId, bool> {
    state
        .roster()
        .iter()
        .map(|candidate| {
            let id = candidate.id();
            let valid = resolver
                .resolve_target(state, actor, id)
                .unwrap_or_else(|error| {
                    warn!(
                        target: "battle::targeting",
                        resolver = resolver.name(),
                        %actor,
                        candidate = %id,
                        %error,
                        "Target resolution failed; treating candidate as invalid"
                    );
                    false
                });
            (id, valid)
        })
        .collect()
}
