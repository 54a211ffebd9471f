use crate::squad::SquadId;

/// What happened when damage reached a squad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageOutcome {
    Dodged,
    Applied {
        /// Health removed after defenses.
        damage: u32,
        units_lost: u32,
        defeated: bool,
    },
}

impl DamageOutcome {
    /// Returns true if damage landed (even if it was reduced to zero).
    pub fn landed(&self) -> bool {
        matches!(self, DamageOutcome::Applied { .. })
    }

    pub fn defeated(&self) -> bool {
        matches!(self, DamageOutcome::Applied { defeated: true, .. })
    }
}

/// Summary of one attack or strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub attacker: SquadId,
    pub target: SquadId,
    pub critical: bool,
    pub outcome: DamageOutcome,
}
