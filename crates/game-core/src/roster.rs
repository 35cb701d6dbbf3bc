//! Roster selection and secret role assignment.

use contracts::{BehaviorProfile, Character, PlayerStatus, Role};
use tracing::{debug, warn};

use crate::error::GameError;
use crate::rng::GameRng;
use crate::state::{GameState, Player};

pub const ROSTER_SIZE: usize = 10;
pub const MIN_ROSTER_SIZE: usize = 3;

const DEFAULT_INFLUENCE: f64 = 0.55;

pub fn default_influence(department: &str) -> f64 {
    match department.trim() {
        "CEO" => 0.75,
        "CFO" => 0.68,
        "Exec Assistant" => 0.65,
        "Project Management" => 0.62,
        "Consultant" => 0.60,
        "IT" => 0.58,
        "Finance" | "HR" | "Legal" => 0.56,
        "Ops" | "Marketing" | "Business Development" => 0.54,
        "Design" | "Content" | "Motion" => 0.52,
        _ => DEFAULT_INFLUENCE,
    }
}

pub fn default_behavior(department: &str) -> BehaviorProfile {
    let (safe, risky, decoy) = match department.trim() {
        "Finance" => (0.60, 0.30, 0.10),
        "Design" | "Content" | "Motion" => (0.65, 0.20, 0.15),
        "Project Management" => (0.62, 0.25, 0.13),
        _ => (0.70, 0.20, 0.10),
    };
    BehaviorProfile { safe, risky, decoy }
}

/// At least one traitor, and always at least two non-traitors (the human and
/// one bot). The split can still be decided at setup; see
/// [`split_is_decided`].
pub fn clamp_traitor_count(requested: usize, roster_size: usize) -> usize {
    requested.max(1).min(roster_size.saturating_sub(2))
}

/// True when traitors already match or outnumber everyone else, which ends
/// the game before round 1.
pub fn split_is_decided(traitors: usize, roster_size: usize) -> bool {
    traitors >= roster_size.saturating_sub(traitors)
}

pub struct RosterBuilder;

impl RosterBuilder {
    /// Draw order: one shuffle over the pool minus the human, then one shuffle
    /// over the non-human roster ids.
    pub fn build(
        pool: &[Character],
        human_id: &str,
        num_traitors: usize,
        seed: u32,
        rng: &mut GameRng,
    ) -> Result<GameState, GameError> {
        let human = pool
            .iter()
            .find(|character| character.id == human_id)
            .ok_or_else(|| GameError::UnknownCharacter(human_id.to_string()))?;

        let mut others = pool
            .iter()
            .filter(|character| character.id != human_id)
            .collect::<Vec<_>>();
        rng.shuffle(&mut others);
        others.truncate(ROSTER_SIZE - 1);

        let roster = std::iter::once(human).chain(others).collect::<Vec<_>>();
        if roster.len() < MIN_ROSTER_SIZE {
            return Err(GameError::RosterTooSmall {
                required: MIN_ROSTER_SIZE,
                available: roster.len(),
            });
        }

        let mut bot_ids = roster
            .iter()
            .skip(1)
            .map(|character| character.id.as_str())
            .collect::<Vec<_>>();
        rng.shuffle(&mut bot_ids);
        let traitor_count = clamp_traitor_count(num_traitors, roster.len());
        let traitors = &bot_ids[..traitor_count];

        let players = roster
            .iter()
            .map(|character| Player {
                id: character.id.clone(),
                name: character.name.clone(),
                department: character.department.clone(),
                influence: default_influence(&character.department),
                behavior: default_behavior(&character.department),
                role: if traitors.contains(&character.id.as_str()) {
                    Role::Traitor
                } else {
                    Role::Innocent
                },
                status: PlayerStatus::Alive,
                elimination_reason: None,
                is_human: character.id == human_id,
            })
            .collect::<Vec<_>>();

        debug!(
            roster = players.len(),
            requested_traitors = num_traitors,
            traitors = traitor_count,
            "roster built"
        );
        if split_is_decided(traitor_count, players.len()) {
            warn!(
                roster = players.len(),
                requested_traitors = num_traitors,
                traitors = traitor_count,
                "traitors already control the roster; the game ends at setup"
            );
        }
        Ok(GameState::new(seed, human_id.to_string(), players))
    }
}
