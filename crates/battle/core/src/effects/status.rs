use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::squad::SquadId;

use super::{EffectDefinition, EffectHook, EffectId, Stacking};

/// One effect instance attached to a squad.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEffect {
    pub id: EffectId,
    pub definition: Arc<EffectDefinition>,
    pub remaining_ticks: u32,
    pub source: Option<SquadId>,
}

impl StatusEffect {
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// Result of attaching an effect under its stacking policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachOutcome {
    Attached(EffectId),
    Refreshed(EffectId),
    Ignored(EffectId),
    /// No room left on the squad.
    Full,
}

/// Active status effects on a squad, in attach order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn get(&self, id: EffectId) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name() == name)
    }

    pub fn is_stunned(&self) -> bool {
        self.effects.iter().any(|e| e.definition.is_stun())
    }

    /// Attaches `definition` under `id`, honoring its stacking policy.
    ///
    /// `id` is only consumed when the outcome is `Attached`.
    pub fn attach(
        &mut self,
        id: EffectId,
        definition: Arc<EffectDefinition>,
        source: Option<SquadId>,
    ) -> AttachOutcome {
        let ticks = definition.max_ticks.max(1);

        if definition.stacking != Stacking::Stack
            && let Some(existing) = self
                .effects
                .iter_mut()
                .find(|e| e.definition.name == definition.name)
        {
            return match definition.stacking {
                Stacking::Refresh => {
                    existing.remaining_ticks = ticks;
                    existing.source = source;
                    AttachOutcome::Refreshed(existing.id)
                }
                _ => AttachOutcome::Ignored(existing.id),
            };
        }

        if self.effects.is_full() {
            return AttachOutcome::Full;
        }
        self.effects.push(StatusEffect {
            id,
            definition,
            remaining_ticks: ticks,
            source,
        });
        AttachOutcome::Attached(id)
    }

    pub fn remove(&mut self, id: EffectId) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }

    /// Ids of hook-driven effects listening on `hook`, in attach order.
    ///
    /// Stuns are excluded: they are consumed by turn skipping, not by hooks.
    pub fn matching(&self, hook: EffectHook) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|e| e.definition.trigger == hook && !e.definition.is_stun())
            .map(|e| e.id)
            .collect()
    }

    /// Consumes one tick of `id`. Returns true once the budget is exhausted.
    pub(crate) fn consume_tick(&mut self, id: EffectId) -> Option<bool> {
        let effect = self.effects.iter_mut().find(|e| e.id == id)?;
        effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
        Some(effect.remaining_ticks == 0)
    }

    /// First stun in attach order.
    pub(crate) fn first_stun(&self) -> Option<EffectId> {
        self.effects
            .iter()
            .find(|e| e.definition.is_stun())
            .map(|e| e.id)
    }
}
