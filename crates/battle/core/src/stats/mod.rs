//! Stat adjustment: bonus arithmetic and per-source modifier sets.
pub mod bonus;
pub mod modifiers;

pub use bonus::{Bonus, BonusStack};
pub use modifiers::{ModifierSet, StatKind, StatModifier};
