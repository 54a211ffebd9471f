//! Read-only content lookup used to assemble a battle roster.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BattleError, ErrorSeverity};
use crate::grid::GridError;
use crate::squad::{Side, SquadDefinition};

/// Source of squad definitions, keyed by content key.
pub trait ContentSource: Send + Sync {
    fn squad(&self, key: &str) -> Option<Arc<SquadDefinition>>;
}

/// In-memory content table.
#[derive(Clone, Debug, Default)]
pub struct StaticContent {
    squads: HashMap<String, Arc<SquadDefinition>>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: SquadDefinition) {
        self.squads
            .insert(definition.key.clone(), Arc::new(definition));
    }

    pub fn with_squad(mut self, definition: SquadDefinition) -> Self {
        self.insert(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }
}

impl ContentSource for StaticContent {
    fn squad(&self, key: &str) -> Option<Arc<SquadDefinition>> {
        self.squads.get(key).cloned()
    }
}

/// One squad to field: which definition, on which side, how many units.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterEntry {
    pub key: String,
    pub side: Side,
    pub count: u32,
}

impl RosterEntry {
    pub fn new(key: impl Into<String>, side: Side, count: u32) -> Self {
        Self {
            key: key.into(),
            side,
            count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("unknown squad definition '{key}'")]
    UnknownSquad { key: String },

    #[error("squad '{key}' fielded with zero units")]
    EmptySquad { key: String },

    #[error("roster of {requested} squads exceeds grid capacity of {capacity}")]
    RosterTooLarge { requested: usize, capacity: usize },

    #[error("initial placement failed")]
    Placement(#[from] GridError),
}

impl BattleError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSquad { .. } => "setup_unknown_squad",
            Self::EmptySquad { .. } => "setup_empty_squad",
            Self::RosterTooLarge { .. } => "setup_roster_too_large",
            Self::Placement(_) => "setup_placement",
        }
    }
}
