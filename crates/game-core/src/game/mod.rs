//! The round controller: owns the state, the RNG, and the event log.

use std::collections::BTreeMap;

use contracts::{
    ActionRecord, Difficulty, DifficultyProfile, EliminationReason, EliminationRecord, EventType,
    GameConfig, GameEvent, GameOutcome, GamePhase, GameResult, ScenarioDefinition, VoteResolution,
    SCHEMA_VERSION_V1,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::actions::{ActionAllocator, ActionLibrary};
use crate::elimination::EliminationResolver;
use crate::error::GameError;
use crate::rng::GameRng;
use crate::scenario::ScenarioEngine;
use crate::state::GameState;
use crate::suspicion::SuspicionModel;
use crate::voting::VotePlanner;

mod events;
mod init;
mod phases;
mod snapshot;


/// Which human input has already resolved in the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PhaseLatch {
    answer_submitted: bool,
    vote_submitted: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    profile: DifficultyProfile,
    state: GameState,
    rng: GameRng,
    scenarios: ScenarioEngine,
    library: ActionLibrary,
    elimination_messages: BTreeMap<String, String>,
    phase: GamePhase,
    latch: PhaseLatch,
    current_scenario: Option<ScenarioDefinition>,
    last_actions: Vec<ActionRecord>,
    last_vote: Option<VoteResolution>,
    eliminations: Vec<EliminationRecord>,
    result: Option<GameResult>,
    event_log: Vec<GameEvent>,
    sequence_in_round: u64,
    replay_hash: u64,
}

impl Game {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.state.round()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Every elimination so far, in order.
    pub fn eliminations(&self) -> &[EliminationRecord] {
        &self.eliminations
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    fn ensure_phase(
        &self,
        operation: &'static str,
        expected: GamePhase,
        submitted: Option<(&'static str, bool)>,
    ) -> Result<(), GameError> {
        if self.phase == expected {
            return Ok(());
        }
        if let Some((input, true)) = submitted {
            return Err(GameError::AlreadySubmitted {
                input,
                round: self.state.round(),
            });
        }
        Err(GameError::PhaseConflict {
            operation,
            expected,
            actual: self.phase,
        })
    }
}

/// Folds one event into the rolling hash: id, position, and rendered content.
fn mix_replay_hash(current: u64, event_id: &str, round: u32, sequence: u64, content: &str) -> u64 {
    let mut hash = current ^ u64::from(round).wrapping_mul(0xA24B_1C62_5B93_2D47);
    hash ^= sequence.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for byte in event_id.bytes().chain(content.bytes()) {
        hash = hash.rotate_left(7) ^ u64::from(byte);
        hash = hash.wrapping_mul(0x517C_C1B7_2722_0A95);
    }
    hash
}
