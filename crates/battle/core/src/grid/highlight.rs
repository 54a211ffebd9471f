/// Visual state of a slot. Has no effect on rules.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Highlight {
    #[default]
    Idle,
    /// Valid target for the attached action.
    Available,
    Unavailable,
    /// Slot of the acting squad.
    Active,
}
