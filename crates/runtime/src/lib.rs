//! Async orchestration for squad battles.
//!
//! This crate drives a [`battle_core::BattleState`] through rounds and turns,
//! asks per-side controllers for actions, fires status effects through their
//! hooks and publishes everything that happens on a topic-based event bus.
//! Consumers build a [`BattleContext`] and call [`BattleContext::run`].
//!
//! Modules are organized by responsibility:
//! - [`context`] hosts the battle aggregate and its builder
//! - [`machine`] implements the round/turn state machine
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus and battle-scoped listeners
//! - [`managers`] wrap effect and ability bookkeeping with events
//! - [`providers`] ships ready-made controllers (AI, scripted, interactive)
pub mod api;
pub mod config;
pub mod context;
pub mod events;
pub mod machine;
pub mod managers;
pub mod presentation;
pub mod providers;

pub use api::{
    ActionController, ActionOutcome, BattleAction, ControllerKind, ControllerRegistry, Result,
    RuntimeError, TargetChoice, TargetPicker,
};
pub use config::RuntimeConfig;
pub use context::{BattleContext, BattleContextBuilder, FleeSignal};
pub use events::{
    ActionEvent, BattleEvent, Event, EventBus, GridEvent, SkipReason, SubscriptionScope, Topic,
    TurnEvent,
};
pub use machine::BattlePhase;
pub use managers::{AbilitiesManager, EffectsManager};
pub use presentation::{NullPresentation, PresentationSink};
pub use providers::{
    AiController, InteractiveController, InteractiveHandle, ScriptedController, ScriptedStep,
    SkipController, TurnPrompt,
};
