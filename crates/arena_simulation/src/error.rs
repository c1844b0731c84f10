//! Setup-time errors.
//!
//! Denied state requests are *not* errors: they stay plain `bool` results.
//! Everything here is a configuration/integration mistake caught while
//! building fighters or loading config.

use thiserror::Error;

use crate::fighter::FighterId;

#[derive(Debug, Error)]
pub enum CombatError {
    /// Two states with the same name in one fighter catalog.
    #[error("state `{0}` is already registered")]
    DuplicateState(String),

    /// An action declared a state that never made it into the catalog.
    #[error("state `{0}` is not registered")]
    UnknownState(String),

    #[error("a fighter can equip at most {max} actions, got {got}")]
    TooManyActions { max: usize, got: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown fighter {0:?}")]
    UnknownFighter(FighterId),
}
