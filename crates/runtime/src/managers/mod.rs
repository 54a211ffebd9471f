//! Async-facing managers that wrap core state operations with events and
//! presentation.
mod abilities;
mod effects;

pub use abilities::AbilitiesManager;
pub use effects::EffectsManager;
