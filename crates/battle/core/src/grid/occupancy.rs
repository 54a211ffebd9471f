//! Bidirectional slot ↔ squad index.
use std::collections::BTreeMap;

use crate::squad::SquadId;

use super::SlotId;

/// Result of validating one slot's cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Repair {
    Consistent,
    /// The slot listed a squad that lives elsewhere (or nowhere).
    DroppedStale(SquadId),
    /// The slot was missing a squad that reports it as home.
    Restored(SquadId),
}

/// `by_squad` is authoritative; `by_slot` is a cache validated lazily.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Occupancy {
    by_slot: BTreeMap<SlotId, SquadId>,
    by_squad: BTreeMap<SquadId, SlotId>,
}

impl Occupancy {
    pub(crate) fn slot_of(&self, squad: SquadId) -> Option<SlotId> {
        self.by_squad.get(&squad).copied()
    }

    /// Occupant according to the authoritative index.
    pub(crate) fn occupant(&self, slot: SlotId) -> Option<SquadId> {
        self.by_slot
            .get(&slot)
            .copied()
            .filter(|squad| self.by_squad.get(squad) == Some(&slot))
            .or_else(|| {
                self.by_squad
                    .iter()
                    .find(|(_, s)| **s == slot)
                    .map(|(squad, _)| *squad)
            })
    }

    /// Moves `squad` into `slot`, releasing whatever slot it held before.
    pub(crate) fn link(&mut self, slot: SlotId, squad: SquadId) {
        if let Some(previous) = self.by_squad.insert(squad, slot)
            && previous != slot
        {
            self.by_slot.remove(&previous);
        }
        self.by_slot.insert(slot, squad);
    }

    pub(crate) fn unlink(&mut self, squad: SquadId) -> Option<SlotId> {
        let slot = self.by_squad.remove(&squad)?;
        if self.by_slot.get(&slot) == Some(&squad) {
            self.by_slot.remove(&slot);
        }
        Some(slot)
    }

    /// Rewrites the cache entry for `slot` from the authoritative index.
    pub(crate) fn repair(&mut self, slot: SlotId) -> Repair {
        let owner = self
            .by_squad
            .iter()
            .find(|(_, s)| **s == slot)
            .map(|(squad, _)| *squad);

        match (self.by_slot.get(&slot).copied(), owner) {
            (Some(cached), Some(owner)) if cached == owner => Repair::Consistent,
            (None, None) => Repair::Consistent,
            (Some(cached), owner) => {
                match owner {
                    Some(owner) => self.by_slot.insert(slot, owner),
                    None => self.by_slot.remove(&slot),
                };
                Repair::DroppedStale(cached)
            }
            (None, Some(owner)) => {
                self.by_slot.insert(slot, owner);
                Repair::Restored(owner)
            }
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SquadId, SlotId)> + '_ {
        self.by_squad.iter().map(|(squad, slot)| (*squad, *slot))
    }

    #[cfg(test)]
    pub(crate) fn corrupt_slot(&mut self, slot: SlotId, squad: Option<SquadId>) {
        match squad {
            Some(squad) => self.by_slot.insert(slot, squad),
            None => self.by_slot.remove(&slot),
        };
    }
}
