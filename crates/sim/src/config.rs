//! Simulation binary configuration.
use std::env;

/// Settings of the headless simulation, on top of `RuntimeConfig`.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Enemy squads fielded against the party.
    pub roster_size: usize,
    /// Log every action event while the battle runs.
    pub print_events: bool,
}

impl SimConfig {
    pub const MAX_ENEMIES: usize = 6;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SIM_ROSTER_SIZE` - Enemy squads, 1 to 6 (default: 3)
    /// - `SIM_PRINT_EVENTS` - Log action events (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = read_env::<usize>("SIM_ROSTER_SIZE") {
            config.roster_size = size.clamp(1, Self::MAX_ENEMIES);
        }

        if let Some(enable) = read_env::<bool>("SIM_PRINT_EVENTS") {
            config.print_events = enable;
        } else if env::var("SIM_PRINT_EVENTS").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.print_events = true;
        }

        config
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            roster_size: 3,
            print_events: false,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
