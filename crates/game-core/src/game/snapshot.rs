use super::*;

use contracts::{GameSnapshot, GameStatus, PlayerView, ScenarioPrompt};

impl Game {
    pub fn status(&self) -> GameStatus {
        GameStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: self.config.game_id.clone(),
            round: self.state.round(),
            phase: self.phase,
            difficulty: self.config.difficulty,
            alive_count: self.state.alive_count(),
            event_count: self.event_log.len(),
        }
    }

    /// The prompt awaiting an answer; `None` outside that phase.
    pub fn current_prompt(&self) -> Option<ScenarioPrompt> {
        if self.phase != GamePhase::AwaitingScenarioAnswer {
            return None;
        }
        self.current_scenario
            .as_ref()
            .map(|scenario| scenario.prompt_for_round(self.state.round()))
    }

    pub fn last_actions(&self) -> &[ActionRecord] {
        &self.last_actions
    }

    pub fn last_vote(&self) -> Option<&VoteResolution> {
        self.last_vote.as_ref()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.event_log
    }

    pub fn events_since(&self, cursor: usize, page_size: usize) -> &[GameEvent] {
        let start = cursor.min(self.event_log.len());
        let end = start.saturating_add(page_size).min(self.event_log.len());
        &self.event_log[start..end]
    }

    pub fn replay_hash(&self) -> String {
        format!("{:016x}", self.replay_hash)
    }

    /// Roles stay hidden until a player is out or the game is over; the
    /// human always sees their own.
    pub fn player_views(&self) -> Vec<PlayerView> {
        let reveal_all = self.is_over();
        self.state
            .players()
            .iter()
            .map(|player| PlayerView {
                id: player.id.clone(),
                name: player.name.clone(),
                department: player.department.clone(),
                is_human: player.is_human,
                status: player.status,
                elimination_reason: player.elimination_reason,
                role: (reveal_all || player.is_human || !player.is_alive()).then_some(player.role),
            })
            .collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: self.config.game_id.clone(),
            round: self.state.round(),
            phase: self.phase,
            alive_count: self.state.alive_count(),
            players: self.player_views(),
            scenario: self.current_prompt(),
            last_actions: self.last_actions.clone(),
            last_vote: self.last_vote.clone(),
            result: self.result.clone(),
            replay_hash: self.replay_hash(),
        }
    }
}
