/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Slots per row on each side of the grid.
    pub columns_per_row: u8,
    /// Experience reward divisor applied to an enemy squad's total health.
    pub experience_divisor: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_COLUMNS: usize = 4;
    /// Two sides with two rows each.
    pub const MAX_SLOTS: usize = 4 * Self::MAX_COLUMNS;
    pub const MAX_STATUS_EFFECTS: usize = 16;
    pub const MAX_ABILITIES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COLUMNS_PER_ROW: u8 = 3;
    pub const DEFAULT_EXPERIENCE_DIVISOR: u32 = 10;

    pub fn new() -> Self {
        Self {
            columns_per_row: Self::DEFAULT_COLUMNS_PER_ROW,
            experience_divisor: Self::DEFAULT_EXPERIENCE_DIVISOR,
        }
    }

    /// Overrides the column count, clamped to `1..=MAX_COLUMNS`.
    pub fn with_columns(mut self, columns: u8) -> Self {
        self.columns_per_row = columns.clamp(1, Self::MAX_COLUMNS as u8);
        self
    }

    /// Overrides the experience divisor. Zero is treated as one.
    pub fn with_experience_divisor(mut self, divisor: u32) -> Self {
        self.experience_divisor = divisor.max(1);
        self
    }

    /// Number of slots a side offers (front and back rows).
    pub fn slots_per_side(&self) -> usize {
        2 * self.columns_per_row as usize
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
