//! The mutable aggregate of one battle.
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::BattleConfig;
use crate::content::{ContentSource, RosterEntry, SetupError};
use crate::effects::EffectId;
use crate::grid::{GridAllocator, GridError, GridSide, Row, SlotId};
use crate::queue::InitiativeQueue;
use crate::rng::BattleRng;
use crate::squad::{Side, SquadDefinition, SquadId, SquadModel};

/// Authoritative battle state.
///
/// The roster keeps living squads in insertion order, which is also the order
/// effect sweeps visit them. Squads whose count reaches zero move to `fallen`
/// when [`BattleState::remove_defeated`] runs, leaving queue and grid in the
/// same step.
#[derive(Clone, Debug)]
pub struct BattleState {
    config: BattleConfig,
    roster: Vec<SquadModel>,
    fallen: Vec<SquadModel>,
    grid: GridAllocator,
    queue: InitiativeQueue,
    defended: BTreeSet<SquadId>,
    round: u32,
    active: Option<SquadId>,
    finished: bool,
    flee_requested: bool,
    timed_out: bool,
    next_squad_id: u32,
    next_effect_id: u32,
}

impl BattleState {
    pub fn new(config: BattleConfig) -> Self {
        let grid = GridAllocator::new(&config);
        Self {
            config,
            roster: Vec::new(),
            fallen: Vec::new(),
            grid,
            queue: InitiativeQueue::new(),
            defended: BTreeSet::new(),
            round: 0,
            active: None,
            finished: false,
            flee_requested: false,
            timed_out: false,
            next_squad_id: 1,
            next_effect_id: 1,
        }
    }

    /// Resolves every roster entry against `content` and adds the squads.
    /// Squads are not placed yet; see [`BattleState::place_roster`].
    pub fn from_roster(
        config: BattleConfig,
        entries: &[RosterEntry],
        content: &dyn ContentSource,
    ) -> Result<Self, SetupError> {
        let capacity = 2 * config.slots_per_side();
        if entries.len() > capacity {
            return Err(SetupError::RosterTooLarge {
                requested: entries.len(),
                capacity,
            });
        }

        let mut state = Self::new(config);
        for entry in entries {
            let definition = content.squad(&entry.key).ok_or_else(|| SetupError::UnknownSquad {
                key: entry.key.clone(),
            })?;
            if entry.count == 0 {
                return Err(SetupError::EmptySquad {
                    key: entry.key.clone(),
                });
            }
            state.add_squad(entry.side, definition, entry.count);
        }
        Ok(state)
    }

    pub fn add_squad(&mut self, side: Side, definition: Arc<SquadDefinition>, count: u32) -> SquadId {
        let id = SquadId(self.next_squad_id);
        self.next_squad_id += 1;
        debug!(
            target: "battle::state",
            squad = %id,
            %side,
            key = %definition.key,
            count,
            "Squad joined the battle"
        );
        self.roster
            .push(SquadModel::new(id, side, definition, count));
        id
    }

    /// Places every unplaced squad of the roster. All-or-nothing.
    pub fn place_roster(&mut self, rng: &mut BattleRng) -> Result<(), GridError> {
        let pending: Vec<(SquadId, Side)> = self
            .roster
            .iter()
            .filter(|s| self.grid.slot_of(s.id()).is_none())
            .map(|s| (s.id(), s.side()))
            .collect();
        self.grid.try_place_units(&pending, rng)
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Squads still on the field, in insertion order.
    pub fn roster(&self) -> &[SquadModel] {
        &self.roster
    }

    /// Squads removed after being defeated, in removal order.
    pub fn fallen(&self) -> &[SquadModel] {
        &self.fallen
    }

    /// Every squad that took part, on the field or fallen.
    pub fn all_squads(&self) -> impl Iterator<Item = &SquadModel> {
        self.roster.iter().chain(self.fallen.iter())
    }

    pub fn squad(&self, id: SquadId) -> Option<&SquadModel> {
        self.roster.iter().find(|s| s.id() == id)
    }

    pub fn squad_mut(&mut self, id: SquadId) -> Option<&mut SquadModel> {
        self.roster.iter_mut().find(|s| s.id() == id)
    }

    pub fn is_fallen(&self, id: SquadId) -> bool {
        self.fallen.iter().any(|s| s.id() == id)
    }

    pub fn is_alive(&self, id: SquadId) -> bool {
        self.squad(id).is_some_and(|s| s.is_alive())
    }

    pub fn grid(&self) -> &GridAllocator {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridAllocator {
        &mut self.grid
    }

    pub fn queue(&self) -> &InitiativeQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut InitiativeQueue {
        &mut self.queue
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn active(&self) -> Option<SquadId> {
        self.active
    }

    pub fn set_active(&mut self, squad: Option<SquadId>) {
        self.active = squad;
    }

    pub fn has_defended(&self, squad: SquadId) -> bool {
        self.defended.contains(&squad)
    }

    /// Records a defend for this round. Returns false if already recorded.
    pub fn mark_defended(&mut self, squad: SquadId) -> bool {
        self.defended.insert(squad)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn flee_requested(&self) -> bool {
        self.flee_requested
    }

    /// Ends the battle with a flee outcome.
    pub fn request_flee(&mut self) {
        self.flee_requested = true;
        self.finished = true;
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Ends an undecided battle at the round limit. Counts as a defeat.
    pub fn time_out(&mut self) {
        self.timed_out = true;
        self.finished = true;
    }

    /// Starts a new round: clears per-round defends and rebuilds the queue
    /// from the living squads.
    pub fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.defended.clear();
        self.queue.build(&self.roster);
        debug!(
            target: "battle::state",
            round = self.round,
            queued = self.queue.len(),
            "Round started"
        );
        self.round
    }

    pub fn tick_cooldowns(&mut self) {
        for squad in &mut self.roster {
            squad.abilities_mut().tick_all();
        }
    }

    /// Moves count-0 squads out of the roster, the queue and the grid.
    /// Returns the removed squads with the slot each one held.
    pub fn remove_defeated(&mut self) -> Vec<(SquadId, Option<SlotId>)> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.roster.len() {
            if self.roster[index].is_alive() {
                index += 1;
                continue;
            }
            let squad = self.roster.remove(index);
            let id = squad.id();

            let dropped = self.queue.remove_all(id);
            if dropped > 1 {
                warn!(
                    target: "battle::state",
                    squad = %id,
                    dropped,
                    "Defeated squad had duplicate queue entries"
                );
            }
            let slot = self.grid.detach(id);
            if slot.is_none() {
                warn!(target: "battle::state", squad = %id, "Defeated squad had no grid slot");
            }
            if self.active == Some(id) {
                self.active = None;
            }

            debug!(target: "battle::state", squad = %id, ?slot, "Defeated squad removed");
            self.fallen.push(squad);
            removed.push((id, slot));
        }
        removed
    }

    /// Returns true if a living squad stands in the front row of `side`.
    pub fn has_live_front_row(&self, side: GridSide) -> bool {
        self.grid
            .occupants(side)
            .into_iter()
            .any(|(slot, squad)| slot.row == Row::Front && self.is_alive(squad))
    }

    pub fn hero_alive(&self) -> bool {
        self.roster
            .iter()
            .any(|s| s.side() == Side::Hero && s.is_alive())
    }

    pub fn friendly_alive(&self) -> bool {
        self.roster
            .iter()
            .any(|s| s.side().is_friendly() && s.is_alive())
    }

    pub fn enemy_alive(&self) -> bool {
        self.roster
            .iter()
            .any(|s| s.side().is_enemy() && s.is_alive())
    }

    pub(crate) fn peek_effect_id(&self) -> EffectId {
        EffectId(self.next_effect_id)
    }

    pub(crate) fn commit_effect_id(&mut self) {
        self.next_effect_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Damage, DamageType};
    use crate::content::StaticContent;
    use crate::squad::CombatStats;

    fn content() -> StaticContent {
        StaticContent::new()
            .with_squad(
                SquadDefinition::new("knights", "Knights", 20)
                    .with_stats(CombatStats::default().with_initiative(5)),
            )
            .with_squad(
                SquadDefinition::new("goblins", "Goblins", 5)
                    .with_stats(CombatStats::default().with_initiative(8)),
            )
    }

    fn kill(state: &mut BattleState, id: SquadId) {
        let mut rng = BattleRng::new(0);
        state
            .squad_mut(id)
            .unwrap()
            .receive_damage(&Damage::effect(10_000, DamageType::Absolute), &mut rng);
    }

    #[test]
    fn roster_setup_rejects_unknown_keys() {
        let entries = [RosterEntry::new("dragons", Side::Enemy, 1)];
        let error = BattleState::from_roster(BattleConfig::default(), &entries, &content())
            .unwrap_err();
        assert_eq!(
            error,
            SetupError::UnknownSquad {
                key: "dragons".into()
            }
        );
    }

    #[test]
    fn roster_setup_rejects_empty_squads() {
        let entries = [RosterEntry::new("goblins", Side::Enemy, 0)];
        assert!(matches!(
            BattleState::from_roster(BattleConfig::default(), &entries, &content()),
            Err(SetupError::EmptySquad { .. })
        ));
    }

    #[test]
    fn defeated_squad_leaves_queue_and_grid_together() {
        let entries = [
            RosterEntry::new("knights", Side::Hero, 3),
            RosterEntry::new("goblins", Side::Enemy, 6),
            RosterEntry::new("goblins", Side::Enemy, 2),
        ];
        let mut state =
            BattleState::from_roster(BattleConfig::default(), &entries, &content()).unwrap();
        let mut rng = BattleRng::new(21);
        state.place_roster(&mut rng).unwrap();
        state.begin_round();

        let victim = SquadId(3);
        let slot = state.grid().slot_of(victim);
        kill(&mut state, victim);
        let removed = state.remove_defeated();

        assert_eq!(removed, vec![(victim, slot)]);
        assert!(!state.queue().contains(victim));
        assert_eq!(state.grid().slot_of(victim), None);
        assert!(state.is_fallen(victim));
        assert_eq!(state.roster().len(), 2);

        state.begin_round();
        assert!(!state.queue().contains(victim));
    }

    #[test]
    fn removal_drops_duplicate_queue_entries() {
        let entries = [
            RosterEntry::new("knights", Side::Hero, 1),
            RosterEntry::new("goblins", Side::Enemy, 1),
        ];
        let mut state =
            BattleState::from_roster(BattleConfig::default(), &entries, &content()).unwrap();
        state.place_roster(&mut BattleRng::new(2)).unwrap();
        state.begin_round();
        state.queue_mut().add_last(SquadId(2));

        kill(&mut state, SquadId(2));
        state.remove_defeated();

        assert_eq!(state.queue().count_of(SquadId(2)), 0);
    }

    #[test]
    fn begin_round_clears_defends() {
        let mut state = BattleState::new(BattleConfig::default());
        assert!(state.mark_defended(SquadId(1)));
        assert!(!state.mark_defended(SquadId(1)));

        assert_eq!(state.begin_round(), 1);
        assert!(!state.has_defended(SquadId(1)));
    }

    #[test]
    fn front_row_liveness_tracks_defeats() {
        let mut state = BattleState::new(BattleConfig::default());
        let goblins = content().squad("goblins").unwrap();
        let front = state.add_squad(Side::Enemy, Arc::clone(&goblins), 1);
        let back = state.add_squad(Side::Enemy, goblins, 1);
        let grid = state.grid_mut();
        grid.try_attach_to_slot(SlotId::new(GridSide::Enemy, Row::Front, 0), front)
            .unwrap();
        grid.try_attach_to_slot(SlotId::new(GridSide::Enemy, Row::Back, 0), back)
            .unwrap();

        assert!(state.has_live_front_row(GridSide::Enemy));
        kill(&mut state, front);
        assert!(!state.has_live_front_row(GridSide::Enemy));
        assert!(!state.has_live_front_row(GridSide::Ally));
    }
}
