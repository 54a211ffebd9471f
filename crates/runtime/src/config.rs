//! Runtime configuration with environment overrides.
use std::env;
use std::str::FromStr;

use battle_core::BattleConfig;

/// Runtime configuration shared by the context builder and the machine.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    pub event_buffer_size: usize,
    /// Seed of the battle RNG; equal seeds replay equal battles.
    pub seed: u64,
    /// Rounds after which an undecided battle ends as a defeat.
    pub max_rounds: u32,
}

impl RuntimeConfig {
    pub const DEFAULT_EVENT_BUFFER: usize = 256;
    pub const DEFAULT_MAX_ROUNDS: u32 = 1_000;

    /// Defaults overridden by `BATTLE_SEED`, `BATTLE_EVENT_BUFFER`,
    /// `BATTLE_GRID_COLUMNS`, `BATTLE_EXPERIENCE_DIVISOR` and
    /// `BATTLE_MAX_ROUNDS`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(seed) = read_env("BATTLE_SEED") {
            config.seed = seed;
        }
        if let Some(size) = read_env("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = size;
        }
        if let Some(columns) = read_env("BATTLE_GRID_COLUMNS") {
            config.battle = config.battle.with_columns(columns);
        }
        if let Some(divisor) = read_env("BATTLE_EXPERIENCE_DIVISOR") {
            config.battle = config.battle.with_experience_divisor(divisor);
        }
        if let Some(rounds) = read_env("BATTLE_MAX_ROUNDS") {
            config.max_rounds = rounds;
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER,
            seed: 0,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
