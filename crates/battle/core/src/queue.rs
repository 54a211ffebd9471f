//! Initiative order for one round.
use std::collections::VecDeque;

use crate::squad::{SquadId, SquadModel};

/// FIFO of squads waiting to act this round.
///
/// Rebuilt at every round start; between rebuilds the relative order of
/// entries only changes through explicit `add_last`/`remove` calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitiativeQueue {
    entries: VecDeque<SquadId>,
}

impl InitiativeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue with the living squads ordered by effective
    /// initiative (descending), ties broken by friendliness (descending).
    /// Remaining ties keep the input order.
    pub fn build<'a>(&mut self, squads: impl IntoIterator<Item = &'a SquadModel>) {
        let mut ranked: Vec<(i32, i8, SquadId)> = squads
            .into_iter()
            .filter(|s| s.is_alive())
            .map(|s| (s.initiative(), s.side().friendliness(), s.id()))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        self.entries = ranked.into_iter().map(|(_, _, id)| id).collect();
    }

    /// Dequeues the squad at the front.
    pub fn next_turn(&mut self) -> Option<SquadId> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<SquadId> {
        self.entries.front().copied()
    }

    pub fn add_last(&mut self, squad: SquadId) {
        self.entries.push_back(squad);
    }

    /// Removes the first entry for `squad`.
    pub fn remove(&mut self, squad: SquadId) -> bool {
        match self.entries.iter().position(|&id| id == squad) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every entry for `squad`, returning how many were dropped.
    pub fn remove_all(&mut self, squad: SquadId) -> usize {
        let mut removed = 0;
        while self.remove(squad) {
            removed += 1;
        }
        removed
    }

    pub fn contains(&self, squad: SquadId) -> bool {
        self.entries.contains(&squad)
    }

    #[cfg(test)]
    pub(crate) fn count_of(&self, squad: SquadId) -> usize {
        self.entries.iter().filter(|&&id| id == squad).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SquadId> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<SquadId> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::combat::{Damage, DamageType};
    use crate::rng::BattleRng;
    use crate::squad::{CombatStats, Side, SquadDefinition};

    fn squad(id: u32, side: Side, initiative: i32) -> SquadModel {
        let definition = SquadDefinition::new("unit", "Unit", 10)
            .with_stats(CombatStats::default().with_initiative(initiative));
        SquadModel::new(SquadId(id), side, Arc::new(definition), 3)
    }

    #[test]
    fn faster_enemy_acts_before_slower_friends() {
        let roster = [
            squad(1, Side::Hero, 5),
            squad(2, Side::Ally, 5),
            squad(3, Side::Enemy, 8),
        ];
        let mut queue = InitiativeQueue::new();
        queue.build(&roster);

        assert_eq!(queue.next_turn(), Some(SquadId(3)));
        assert_eq!(queue.next_turn(), Some(SquadId(1)));
        assert_eq!(queue.next_turn(), Some(SquadId(2)));
        assert_eq!(queue.next_turn(), None);
    }

    #[test]
    fn ties_favor_friendly_then_neutral_then_enemy() {
        let roster = [
            squad(1, Side::Enemy, 4),
            squad(2, Side::Neutral, 4),
            squad(3, Side::Ally, 4),
            squad(4, Side::Enemy, 9),
        ];
        let mut queue = InitiativeQueue::new();
        queue.build(&roster);

        assert_eq!(
            queue.to_vec(),
            vec![SquadId(4), SquadId(3), SquadId(2), SquadId(1)]
        );
    }

    #[test]
    fn drain_order_is_non_increasing_initiative() {
        let sides = [Side::Hero, Side::Ally, Side::Enemy, Side::Neutral];
        let roster: Vec<SquadModel> = (0..12)
            .map(|n| squad(n, sides[n as usize % 4], ((n * 7) % 5) as i32))
            .collect();
        let mut queue = InitiativeQueue::new();
        queue.build(&roster);

        let order: Vec<(i32, i8)> = queue
            .iter()
            .map(|id| {
                let s = roster.iter().find(|s| s.id() == id).unwrap();
                (s.initiative(), s.side().friendliness())
            })
            .collect();
        for pair in order.windows(2) {
            assert!(pair[0].0 > pair[1].0 || (pair[0].0 == pair[1].0 && pair[0].1 >= pair[1].1));
        }
    }

    #[test]
    fn defeated_squads_are_not_queued() {
        let mut fallen = squad(2, Side::Enemy, 9);
        fallen.receive_damage(
            &Damage::effect(100, DamageType::Absolute),
            &mut BattleRng::new(0),
        );
        let roster = [squad(1, Side::Hero, 1), fallen];
        let mut queue = InitiativeQueue::new();
        queue.build(&roster);

        assert_eq!(queue.to_vec(), vec![SquadId(1)]);
    }

    #[test]
    fn remove_drops_first_instance_only() {
        let mut queue = InitiativeQueue::new();
        queue.add_last(SquadId(1));
        queue.add_last(SquadId(2));
        queue.add_last(SquadId(1));

        assert!(queue.remove(SquadId(1)));
        assert_eq!(queue.to_vec(), vec![SquadId(2), SquadId(1)]);
        assert!(!queue.remove(SquadId(9)));
    }

    #[test]
    fn remove_all_clears_duplicates() {
        let mut queue = InitiativeQueue::new();
        for id in [1, 2, 1, 3, 1] {
            queue.add_last(SquadId(id));
        }

        assert_eq!(queue.count_of(SquadId(1)), 3);
        assert_eq!(queue.remove_all(SquadId(1)), 3);
        assert!(!queue.contains(SquadId(1)));
        assert_eq!(queue.to_vec(), vec![SquadId(2), SquadId(3)]);
        assert_eq!(queue.remove_all(SquadId(1)), 0);
    }
}
