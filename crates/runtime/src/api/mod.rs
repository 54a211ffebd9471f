//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the machine and managers can stay focused on orchestration.

pub mod action;
pub mod controllers;
pub mod errors;
pub mod registry;

pub use action::{ActionOutcome, BattleAction, TargetChoice, TargetPicker};
pub use controllers::ActionController;
pub use errors::{ControllerKind, Result, RuntimeError};
pub use registry::ControllerRegistry;
