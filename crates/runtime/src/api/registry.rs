//! Per-side controller bindings.
use std::collections::HashMap;
use std::sync::Arc;

use battle_core::Side;

use super::{ActionController, Result, RuntimeError};

/// Maps each [`Side`] to the controller that acts for its squads.
///
/// Controllers are shared through `Arc` so the machine can clone one out and
/// await it while still holding the battle state.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<Side, Arc<dyn ActionController>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `controller` to `side`, replacing any previous binding.
    pub fn bind(&mut self, side: Side, controller: Arc<dyn ActionController>) {
        self.controllers.insert(side, controller);
    }

    /// Binds the hero and ally sides.
    pub fn bind_friendly(&mut self, controller: Arc<dyn ActionController>) {
        self.bind(Side::Hero, Arc::clone(&controller));
        self.bind(Side::Ally, controller);
    }

    /// Binds the enemy and neutral sides.
    pub fn bind_hostile(&mut self, controller: Arc<dyn ActionController>) {
        self.bind(Side::Enemy, Arc::clone(&controller));
        self.bind(Side::Neutral, controller);
    }

    pub fn unbind(&mut self, side: Side) -> Option<Arc<dyn ActionController>> {
        self.controllers.remove(&side)
    }

    pub fn is_bound(&self, side: Side) -> bool {
        self.controllers.contains_key(&side)
    }

    pub fn get(&self, side: Side) -> Result<Arc<dyn ActionController>> {
        self.controllers
            .get(&side)
            .cloned()
            .ok_or(RuntimeError::ControllerNotSet { side })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SkipController;

    #[test]
    fn friendly_binding_covers_hero_and_ally_only() {
        let mut registry = ControllerRegistry::new();
        registry.bind_friendly(Arc::new(SkipController));

        assert!(registry.get(Side::Hero).is_ok());
        assert!(registry.get(Side::Ally).is_ok());
        assert!(matches!(
            registry.get(Side::Enemy),
            Err(RuntimeError::ControllerNotSet { side: Side::Enemy })
        ));
    }

    #[test]
    fn unbind_reverts_to_missing() {
        let mut registry = ControllerRegistry::new();
        registry.bind_hostile(Arc::new(SkipController));
        assert!(registry.unbind(Side::Neutral).is_some());
        assert!(!registry.is_bound(Side::Neutral));
        assert!(registry.is_bound(Side::Enemy));
    }
}
