//! Battle completion and outcome.
use crate::squad::{Side, SquadId, SquadModel};
use crate::state::BattleState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleStatus {
    Victory,
    Defeat,
    Flee,
}

/// Unit counts of one squad at start and end of the battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquadDelta {
    pub squad: SquadId,
    pub key: String,
    pub side: Side,
    pub initial_count: u32,
    pub final_count: u32,
}

/// Immutable battle outcome, computed once when the battle ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub status: BattleStatus,
    pub rounds: u32,
    pub squads: Vec<SquadDelta>,
    pub experience: u32,
}

impl BattleResult {
    pub fn delta(&self, squad: SquadId) -> Option<&SquadDelta> {
        self.squads.iter().find(|d| d.squad == squad)
    }
}

/// Experience granted for one enemy squad: `initial_count × health / divisor`,
/// zero once its health is gone or when it started without units.
pub fn experience_for(squad: &SquadModel, divisor: u32) -> u32 {
    let health = squad.health();
    if health == 0 || squad.initial_count() == 0 {
        return 0;
    }
    let total = squad.initial_count() as u64 * health as u64;
    (total / divisor.max(1) as u64).min(u32::MAX as u64) as u32
}

impl BattleState {
    /// Returns true once the battle cannot continue.
    ///
    /// The battle is over when it was already marked finished, when the
    /// roster is empty, when no hero squad remains on the field, or when
    /// exactly one of the friendly and enemy sides still has a living squad.
    pub fn is_battle_finished(&self) -> bool {
        if self.is_finished() || self.roster().is_empty() {
            return true;
        }
        if !self.roster().iter().any(|s| s.side() == Side::Hero) {
            return true;
        }
        self.friendly_alive() != self.enemy_alive()
    }

    pub fn battle_status(&self) -> BattleStatus {
        if self.flee_requested() {
            BattleStatus::Flee
        } else if self.timed_out() || !self.hero_alive() {
            BattleStatus::Defeat
        } else if self.friendly_alive() {
            BattleStatus::Victory
        } else {
            BattleStatus::Defeat
        }
    }

    /// Snapshot of the outcome. Experience is summed over every enemy squad
    /// that took part; fallen ones contribute nothing.
    pub fn battle_result(&self) -> BattleResult {
        let divisor = self.config().experience_divisor;
        let mut squads: Vec<SquadDelta> = self
            .all_squads()
            .map(|s| SquadDelta {
                squad: s.id(),
                key: s.definition().key.clone(),
                side: s.side(),
                initial_count: s.initial_count(),
                final_count: s.count(),
            })
            .collect();
        squads.sort_by_key(|d| d.squad);

        let experience = self
            .all_squads()
            .filter(|s| s.side().is_enemy())
            .map(|s| experience_for(s, divisor))
            .fold(0u32, u32::saturating_add);

        BattleResult {
            status: self.battle_status(),
            rounds: self.round(),
            squads,
            experience,
        }
    }
}
