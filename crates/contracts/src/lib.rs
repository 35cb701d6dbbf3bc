//! v1 cross-boundary contracts for the round engine, API, and front ends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod catalog;
mod round;
pub mod serde_u32_string;

pub use catalog::{
    ActionBucket, ActionDefinition, Character, OptionLabel, ScenarioDefinition, ScenarioOption,
    ScenarioPrompt,
};
pub use round::{
    ActionRecord, AnswerOutcome, BehaviorProfile, EliminationReason, EliminationRecord,
    GameOutcome, GameResult, GameSnapshot, PlayerStatus, PlayerView, Role, TallyEntry, VoteCast,
    VoteOutcome, VoteResolution,
};

pub const SCHEMA_VERSION_V1: &str = "1.0";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                innocent_error_rate: 0.04,
                traitor_rate: 0.50,
                influence_scale: 0.70,
                vote_noise: 0.05,
                pattern_clarity: 1.0,
            },
            Self::Medium => DifficultyProfile {
                innocent_error_rate: 0.12,
                traitor_rate: 0.40,
                influence_scale: 0.50,
                vote_noise: 0.12,
                pattern_clarity: 0.70,
            },
            Self::Hard => DifficultyProfile {
                innocent_error_rate: 0.20,
                traitor_rate: 0.30,
                influence_scale: 0.30,
                vote_noise: 0.18,
                pattern_clarity: 0.50,
            },
        }
    }

    /// Easy and Medium guarantee exactly one traitor votes the human each round.
    pub fn hint_mode(self) -> bool {
        matches!(self, Self::Easy | Self::Medium)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("unknown difficulty: {raw}")),
        }
    }
}

/// Probabilities and multipliers tuning bot behaviour; all values in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DifficultyProfile {
    pub innocent_error_rate: f64,
    pub traitor_rate: f64,
    pub influence_scale: f64,
    pub vote_noise: f64,
    pub pattern_clarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub schema_version: String,
    pub game_id: String,
    #[serde(with = "serde_u32_string")]
    pub seed: u32,
    pub human_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_num_traitors")]
    pub num_traitors: usize,
    #[serde(default = "default_analysis_mode")]
    pub analysis_mode: bool,
}

fn default_num_traitors() -> usize {
    3
}

fn default_analysis_mode() -> bool {
    true
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: "game_local_001".to_string(),
            seed: 42,
            human_id: String::new(),
            difficulty: Difficulty::default(),
            num_traitors: default_num_traitors(),
            analysis_mode: default_analysis_mode(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    AwaitingScenarioAnswer,
    AwaitingVote,
    RoundComplete,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AwaitingScenarioAnswer => "awaiting_scenario_answer",
            Self::AwaitingVote => "awaiting_vote",
            Self::RoundComplete => "round_complete",
            Self::GameOver => "game_over",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStatus {
    pub schema_version: String,
    pub game_id: String,
    pub round: u32,
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub alive_count: usize,
    pub event_count: usize,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game_id={} round={} phase={} difficulty={} alive={} events={}",
            self.game_id,
            self.round,
            self.phase,
            self.difficulty,
            self.alive_count,
            self.event_count
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    GameStarted,
    DataWarning,
    RoundStarted,
    ScenarioPresented,
    ScenarioAnswered,
    AnalysisNote,
    ActionPerformed,
    VoteCast,
    VoteResolved,
    PlayerEliminated,
    RoundCompleted,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEvent {
    pub schema_version: String,
    pub game_id: String,
    pub round: u32,
    pub event_id: String,
    pub sequence_in_round: u64,
    pub event_type: EventType,
    #[serde(default)]
    pub actors: Vec<String>,
    /// Human-readable log line, as shown in the game log.
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    SubmitAnswer { option: String },
    SubmitVote { target_id: String },
    NextRound,
}

impl CommandPayload {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitAnswer { .. } => "submit_answer",
            Self::SubmitVote { .. } => "submit_vote",
            Self::NextRound => "next_round",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Command {
    pub schema_version: String,
    pub command_id: String,
    pub game_id: String,
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(
        command_id: impl Into<String>,
        game_id: impl Into<String>,
        payload: CommandPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command_id.into(),
            game_id: game_id.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    GameNotFound,
    InvalidCommand,
    InvalidQuery,
    InvalidConfig,
    PhaseConflict,
    ContractVersionUnsupported,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResult {
    pub schema_version: String,
    pub command_id: String,
    pub game_id: String,
    pub accepted: bool,
    pub error: Option<ApiError>,
}

impl CommandResult {
    pub fn accepted(command: &Command) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            game_id: command.game_id.clone(),
            accepted: true,
            error: None,
        }
    }

    pub fn rejected(command: &Command, error: ApiError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            game_id: command.game_id.clone(),
            accepted: false,
            error: Some(error),
        }
    }
}
