//! Hooks for a presentation layer to pace the simulation.
use async_trait::async_trait;
use battle_core::{DamageOutcome, EffectReport, SquadId};

/// Awaited by the machine after each visible change so animations can finish
/// before the battle moves on. Both methods complete immediately by default.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn effect_applied(&self, _report: &EffectReport) {}

    async fn damage_applied(&self, _target: SquadId, _outcome: &DamageOutcome) {}
}

/// Presentation that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresentation;

impl PresentationSink for NullPresentation {}
