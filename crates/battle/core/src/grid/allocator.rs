use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};
use crate::rng::BattleRng;
use crate::squad::{Side, SquadId};

use super::occupancy::{Occupancy, Repair};
use super::{GridSide, Highlight, Row, SlotId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("slot {slot} does not exist on this grid")]
    UnknownSlot { slot: SlotId },

    #[error("slot {slot} is already occupied by squad {occupant}")]
    SlotOccupied { slot: SlotId, occupant: SquadId },

    #[error("squad {squad} is not placed on the grid")]
    NotPlaced { squad: SquadId },

    #[error("no free slot available for squad {squad} ({side})")]
    NoAvailableSlot { squad: SquadId, side: Side },
}

impl BattleError for GridError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SlotOccupied { .. } => ErrorSeverity::Recoverable,
            Self::UnknownSlot { .. } | Self::NotPlaced { .. } => ErrorSeverity::Validation,
            Self::NoAvailableSlot { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSlot { .. } => "grid_unknown_slot",
            Self::SlotOccupied { .. } => "grid_slot_occupied",
            Self::NotPlaced { .. } => "grid_not_placed",
            Self::NoAvailableSlot { .. } => "grid_no_available_slot",
        }
    }
}

/// Candidate slot groups used by initial placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pool {
    AllyFront,
    AllyBack,
    AllyAny,
    EnemyAny,
}

impl Pool {
    /// Pools tried in order; the first with a free slot wins.
    fn priority(side: Side) -> &'static [Pool] {
        match side {
            Side::Hero => &[Pool::AllyBack, Pool::AllyAny],
            Side::Ally => &[Pool::AllyFront, Pool::AllyBack, Pool::AllyAny],
            Side::Enemy | Side::Neutral => &[Pool::EnemyAny],
        }
    }

    fn contains(self, slot: SlotId) -> bool {
        match self {
            Pool::AllyFront => slot.side == GridSide::Ally && slot.row == Row::Front,
            Pool::AllyBack => slot.side == GridSide::Ally && slot.row == Row::Back,
            Pool::AllyAny => slot.side == GridSide::Ally,
            Pool::EnemyAny => slot.side == GridSide::Enemy,
        }
    }
}

/// Fixed set of positional slots and who stands in them.
///
/// Each slot holds at most one squad and each squad stands in at most one
/// slot. Multi-step operations snapshot the occupancy and roll back on any
/// failure, so callers never observe a half-applied placement or swap.
#[derive(Clone, Debug)]
pub struct GridAllocator {
    slots: ArrayVec<SlotId, { BattleConfig::MAX_SLOTS }>,
    occupancy: Occupancy,
    highlights: BTreeMap<SlotId, Highlight>,
}

impl GridAllocator {
    pub fn new(config: &BattleConfig) -> Self {
        let columns = config
            .columns_per_row
            .clamp(1, BattleConfig::MAX_COLUMNS as u8);
        let mut slots = ArrayVec::new();
        for side in GridSide::iter() {
            for row in Row::iter() {
                for column in 0..columns {
                    slots.push(SlotId::new(side, row, column));
                }
            }
        }
        Self {
            slots,
            occupancy: Occupancy::default(),
            highlights: BTreeMap::new(),
        }
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.slots.contains(&slot)
    }

    pub fn slot_of(&self, squad: SquadId) -> Option<SlotId> {
        self.occupancy.slot_of(squad)
    }

    pub fn occupant(&self, slot: SlotId) -> Option<SquadId> {
        self.occupancy.occupant(slot)
    }

    /// Placed squads on `side`, in slot order.
    pub fn occupants(&self, side: GridSide) -> Vec<(SlotId, SquadId)> {
        let mut placed: Vec<(SlotId, SquadId)> = self
            .occupancy
            .iter()
            .filter(|(_, slot)| slot.side == side)
            .map(|(squad, slot)| (slot, squad))
            .collect();
        placed.sort();
        placed
    }

    /// Returns true if nobody stands in `slot`.
    ///
    /// Validates the slot cache against the squad index first and repairs any
    /// stale or missing entry.
    pub fn is_slot_empty(&mut self, slot: SlotId) -> bool {
        match self.occupancy.repair(slot) {
            Repair::Consistent => {}
            Repair::DroppedStale(squad) => warn!(
                target: "battle::grid",
                %slot,
                %squad,
                "Slot cache listed a squad standing elsewhere; repaired"
            ),
            Repair::Restored(squad) => warn!(
                target: "battle::grid",
                %slot,
                %squad,
                "Slot cache was missing its occupant; repaired"
            ),
        }
        self.occupancy.occupant(slot).is_none()
    }

    /// Moves `squad` into an empty `slot`, releasing its previous slot.
    pub fn try_attach_to_slot(&mut self, slot: SlotId, squad: SquadId) -> Result<(), GridError> {
        if !self.contains(slot) {
            return Err(GridError::UnknownSlot { slot });
        }
        if !self.is_slot_empty(slot) {
            if let Some(occupant) = self.occupancy.occupant(slot)
                && occupant != squad
            {
                return Err(GridError::SlotOccupied { slot, occupant });
            }
            return Ok(());
        }
        self.occupancy.link(slot, squad);
        debug!(target: "battle::grid", %slot, %squad, "Squad attached to slot");
        Ok(())
    }

    /// Removes `squad` from the grid, returning the slot it held.
    pub fn detach(&mut self, squad: SquadId) -> Option<SlotId> {
        let slot = self.occupancy.unlink(squad)?;
        self.highlights.remove(&slot);
        Some(slot)
    }

    /// Places a batch of squads in random slots chosen by side priority.
    ///
    /// All-or-nothing: if any squad cannot be placed, the grid is restored to
    /// its state before the call.
    pub fn try_place_units(
        &mut self,
        squads: &[(SquadId, Side)],
        rng: &mut BattleRng,
    ) -> Result<(), GridError> {
        let snapshot = self.occupancy.clone();
        for &(squad, side) in squads {
            if let Err(error) = self.place_one(squad, side, rng) {
                self.occupancy = snapshot;
                warn!(target: "battle::grid", %squad, %error, "Batch placement rolled back");
                return Err(error);
            }
        }
        Ok(())
    }

    fn place_one(&mut self, squad: SquadId, side: Side, rng: &mut BattleRng) -> Result<(), GridError> {
        for pool in Pool::priority(side) {
            let free: Vec<SlotId> = self
                .slots
                .clone()
                .into_iter()
                .filter(|slot| pool.contains(*slot))
                .filter(|slot| self.is_slot_empty(*slot))
                .collect();
            if let Some(index) = rng.pick_index(free.len()) {
                return self.try_attach_to_slot(free[index], squad);
            }
        }
        Err(GridError::NoAvailableSlot { squad, side })
    }

    /// Moves `squad` into `slot`, exchanging places with the occupant if any.
    ///
    /// Atomic: a failure in either half restores the previous occupancy.
    pub fn try_swap_with_occupant(&mut self, squad: SquadId, slot: SlotId) -> Result<(), GridError> {
        if !self.contains(slot) {
            return Err(GridError::UnknownSlot { slot });
        }
        let occupant = if self.is_slot_empty(slot) {
            None
        } else {
            self.occupancy.occupant(slot)
        };
        let Some(origin) = self.slot_of(squad) else {
            return match occupant {
                None => self.try_attach_to_slot(slot, squad),
                Some(_) => Err(GridError::NotPlaced { squad }),
            };
        };
        if origin == slot {
            return Ok(());
        }

        let snapshot = self.occupancy.clone();
        let result = self.exchange(squad, slot, origin, occupant);
        if let Err(error) = &result {
            warn!(target: "battle::grid", %squad, %slot, %error, "Swap rolled back");
            self.occupancy = snapshot;
        }
        result
    }

    fn exchange(
        &mut self,
        squad: SquadId,
        slot: SlotId,
        origin: SlotId,
        occupant: Option<SquadId>,
    ) -> Result<(), GridError> {
        let Some(other) = occupant else {
            return self.try_attach_to_slot(slot, squad);
        };
        self.occupancy.unlink(other);
        self.try_attach_to_slot(slot, squad)?;
        self.try_attach_to_slot(origin, other)
    }

    pub fn highlight(&self, slot: SlotId) -> Highlight {
        self.highlights.get(&slot).copied().unwrap_or_default()
    }

    /// Sets a slot's highlight. Returns false for unknown slots.
    pub fn set_highlight(&mut self, slot: SlotId, highlight: Highlight) -> bool {
        if !self.contains(slot) {
            return false;
        }
        if highlight == Highlight::Idle {
            self.highlights.remove(&slot);
        } else {
            self.highlights.insert(slot, highlight);
        }
        true
    }

    pub fn reset_highlight(&mut self, slot: SlotId) {
        self.highlights.remove(&slot);
    }

    pub fn reset_highlights(&mut self) {
        self.highlights.clear();
    }

    /// Slots with a non-idle highlight.
    pub fn highlights(&self) -> impl Iterator<Item = (SlotId, Highlight)> + '_ {
        self.highlights.iter().map(|(slot, h)| (*slot, *h))
    }
}
