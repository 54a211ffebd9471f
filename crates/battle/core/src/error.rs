//! Common error infrastructure for battle-core.
//!
//! Domain errors (`GridError`, `TargetingError`, `ActionError`, ...) live next
//! to the operations they guard. This module holds the classification they
//! share so the runtime can decide whether to skip a turn, log, or abort setup.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the turn can continue with another choice
/// - **Validation**: the request was invalid and must change before retrying
/// - **Internal**: cached state disagreed with authoritative state
/// - **Fatal**: the battle cannot be built or continued
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// All error enums derive `thiserror::Error` and implement this trait so
/// callers can classify failures uniformly.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static identifier for this error variant.
    ///
    /// Defaults to the type name; implementors usually return a
    /// `snake_case` code per variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
