//! Per-round records handed to the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ActionBucket, GamePhase, ScenarioPrompt};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Innocent,
    Traitor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Alive,
    Eliminated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    VotedOut,
    NightStrike,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BehaviorProfile {
    pub safe: f64,
    pub risky: f64,
    pub decoy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub player_id: String,
    pub player_name: String,
    pub action_id: String,
    pub description: String,
    pub risk_level: u32,
    pub is_suspicious: bool,
    pub bucket_used: ActionBucket,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteCast {
    pub voter_id: String,
    pub target_id: String,
    /// Set for the hint-mode traitor whose vote was pre-committed.
    #[serde(default)]
    pub forced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TallyEntry {
    pub candidate_id: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResolution {
    pub round: u32,
    /// Human first, forced traitor next, remaining voters in roster order.
    pub reveal: Vec<VoteCast>,
    /// Candidates in order of their first vote.
    pub tally: Vec<TallyEntry>,
    pub eliminated_id: String,
    pub tie_broken: bool,
}

impl VoteResolution {
    pub fn votes_for(&self, candidate_id: &str) -> u32 {
        self.tally
            .iter()
            .find(|entry| entry.candidate_id == candidate_id)
            .map(|entry| entry.votes)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EliminationRecord {
    pub round: u32,
    pub player_id: String,
    pub name: String,
    pub role: Role,
    pub reason: EliminationReason,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    HumanEliminated,
    TraitorsCleared,
    TraitorsControl,
}

impl GameOutcome {
    pub fn human_wins(self) -> bool {
        matches!(self, Self::TraitorsCleared)
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::HumanEliminated => "You were eliminated. Traitors win.",
            Self::TraitorsCleared => "All traitors eliminated. You win!",
            Self::TraitorsControl => "Traitors took control. You lose.",
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub round: u32,
    pub traitor_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub round: u32,
    pub correct: bool,
    pub rationale: String,
    /// Empty when the answer was wrong: nobody acts that round.
    pub actions: Vec<ActionRecord>,
    pub elimination: Option<EliminationRecord>,
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOutcome {
    pub resolution: VoteResolution,
    pub eliminations: Vec<EliminationRecord>,
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub department: String,
    pub is_human: bool,
    pub status: PlayerStatus,
    pub elimination_reason: Option<EliminationReason>,
    /// Revealed once the player is out or the game is over.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub schema_version: String,
    pub game_id: String,
    pub round: u32,
    pub phase: GamePhase,
    pub alive_count: usize,
    pub players: Vec<PlayerView>,
    pub scenario: Option<ScenarioPrompt>,
    pub last_actions: Vec<ActionRecord>,
    pub last_vote: Option<VoteResolution>,
    pub result: Option<GameResult>,
    pub replay_hash: String,
}
