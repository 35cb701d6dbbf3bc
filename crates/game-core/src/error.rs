use std::path::PathBuf;

use contracts::GamePhase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no valid scenarios after normalization")]
    NoValidScenarios,

    #[error("character pool is empty")]
    EmptyRosterPool,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("unknown character id: {0}")]
    UnknownCharacter(String),

    #[error("roster needs at least {required} players, only {available} available")]
    RosterTooSmall { required: usize, available: usize },

    #[error("{operation} is not allowed while {actual} (expected {expected})")]
    PhaseConflict {
        operation: &'static str,
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("{input} was already submitted for round {round}")]
    AlreadySubmitted { input: &'static str, round: u32 },

    #[error("invalid option label: {0:?}")]
    InvalidOption(String),

    #[error("invalid vote target {target_id}: {reason}")]
    InvalidVoteTarget {
        target_id: String,
        reason: &'static str,
    },
}
