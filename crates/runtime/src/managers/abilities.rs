use battle_core::{AbilityId, AbilityView, BattleState, SquadId};

/// Read side of squad abilities plus the round tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbilitiesManager;

impl AbilitiesManager {
    pub fn new() -> Self {
        Self
    }

    /// Advances every cooldown by one round.
    pub fn on_tick(&self, state: &mut BattleState) {
        state.tick_cooldowns();
    }

    pub fn is_ability_ready(&self, state: &BattleState, squad: SquadId, ability: AbilityId) -> bool {
        state
            .squad(squad)
            .is_some_and(|s| s.abilities().is_ready(ability))
    }

    pub fn remaining_cooldown(
        &self,
        state: &BattleState,
        squad: SquadId,
        ability: AbilityId,
    ) -> Option<u32> {
        state
            .squad(squad)
            .and_then(|s| s.abilities().remaining_cooldown(ability))
    }

    /// Abilities of `squad` in definition order, for UI listing.
    pub fn abilities_of(&self, state: &BattleState, squad: SquadId) -> Vec<AbilityView> {
        let Some(model) = state.squad(squad) else {
            return Vec::new();
        };
        model
            .definition()
            .abilities
            .iter()
            .filter_map(|ability| {
                let remaining = model.abilities().remaining_cooldown(ability.id)?;
                Some(AbilityView {
                    id: ability.id,
                    name: ability.name.clone(),
                    target: ability.target,
                    ready: remaining == 0,
                    remaining_cooldown: remaining,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use battle_core::{
        AbilityDefinition, AbilityEffect, AbilityTarget, ActionKind, BattleConfig, BattleRng,
        GridSide, Row, Side, SlotId, SquadDefinition,
    };

    use super::*;

    #[test]
    fn cooldown_is_visible_and_ticks_down() {
        let mut state = BattleState::new(BattleConfig::default());
        let healers = Arc::new(
            SquadDefinition::new("clerics", "Clerics", 10).with_ability(AbilityDefinition {
                id: AbilityId(3),
                name: "Mend".into(),
                cooldown: 2,
                target: AbilityTarget::SelfOnly,
                effect: AbilityEffect::Heal { amount: 5 },
            }),
        );
        let squad = state.add_squad(Side::Hero, healers, 3);
        state
            .grid_mut()
            .try_attach_to_slot(SlotId::new(GridSide::Ally, Row::Back, 0), squad)
            .unwrap();
        let manager = AbilitiesManager::new();

        assert!(manager.is_ability_ready(&state, squad, AbilityId(3)));
        state
            .execute(
                squad,
                &ActionKind::UseAbility {
                    ability: AbilityId(3),
                    target: squad,
                },
                &mut BattleRng::new(0),
            )
            .unwrap();

        let views = manager.abilities_of(&state, squad);
        assert_eq!(views.len(), 1);
        assert!(!views[0].ready);
        assert_eq!(views[0].remaining_cooldown, 2);

        manager.on_tick(&mut state);
        assert_eq!(manager.remaining_cooldown(&state, squad, AbilityId(3)), Some(1));
        manager.on_tick(&mut state);
        assert!(manager.is_ability_ready(&state, squad, AbilityId(3)));
        assert_eq!(manager.remaining_cooldown(&state, SquadId(42), AbilityId(3)), None);
    }
}
