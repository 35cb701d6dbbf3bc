//! In-process API facade with command validation and a command audit trail.

mod server;

use contracts::{
    AnswerOutcome, ApiError, Command, CommandPayload, CommandResult, ErrorCode, GameConfig,
    GameEvent, GameSnapshot, GameStatus, ScenarioPrompt, VoteOutcome, SCHEMA_VERSION_V1,
};
use game_core::{Catalog, Game, GameError};
use serde::Serialize;
use tracing::{debug, warn};

pub use server::{router, serve, AppState, ServerError};

/// What an accepted command did.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Answer(AnswerOutcome),
    Vote(VoteOutcome),
    RoundAdvanced { round: u32 },
}

#[derive(Debug)]
pub struct GameApi {
    game: Game,
    command_audit: Vec<CommandResult>,
}

impl GameApi {
    pub fn from_config(config: GameConfig, catalog: &Catalog) -> Result<Self, GameError> {
        Ok(Self {
            game: Game::new(config, catalog)?,
            command_audit: Vec::new(),
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game.config().game_id
    }

    pub fn config(&self) -> &GameConfig {
        self.game.config()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    pub fn current_prompt(&self) -> Option<ScenarioPrompt> {
        self.game.current_prompt()
    }

    pub fn events(&self) -> &[GameEvent] {
        self.game.events()
    }

    pub fn command_audit(&self) -> &[CommandResult] {
        &self.command_audit
    }

    /// Validates and applies one command. Accepted and rejected commands both
    /// land in the audit; a rejected command leaves the game untouched.
    pub fn apply_command(&mut self, command: Command) -> Result<CommandOutcome, ApiError> {
        let applied = match self.validate_command(&command) {
            Some(error) => Err(error),
            None => self.dispatch(&command.payload).map_err(|err| api_error(&err)),
        };

        let result = match &applied {
            Ok(_) => CommandResult::accepted(&command),
            Err(error) => {
                warn!(
                    command_id = %command.command_id,
                    command = command.payload.name(),
                    error_code = ?error.error_code,
                    "command rejected: {}",
                    error.message
                );
                CommandResult::rejected(&command, error.clone())
            }
        };
        debug!(
            command_id = %command.command_id,
            command = command.payload.name(),
            accepted = result.accepted,
            "command applied"
        );
        self.command_audit.push(result);
        applied
    }

    fn dispatch(&mut self, payload: &CommandPayload) -> Result<CommandOutcome, GameError> {
        match payload {
            CommandPayload::SubmitAnswer { option } => {
                self.game.submit_answer(option).map(CommandOutcome::Answer)
            }
            CommandPayload::SubmitVote { target_id } => {
                self.game.submit_vote(target_id).map(CommandOutcome::Vote)
            }
            CommandPayload::NextRound => {
                self.game.next_round()?;
                Ok(CommandOutcome::RoundAdvanced {
                    round: self.game.round(),
                })
            }
        }
    }

    fn validate_command(&self, command: &Command) -> Option<ApiError> {
        if command.schema_version != SCHEMA_VERSION_V1 {
            return Some(ApiError::new(
                ErrorCode::ContractVersionUnsupported,
                "Unsupported schema_version",
                Some(format!(
                    "got={} expected={}",
                    command.schema_version, SCHEMA_VERSION_V1
                )),
            ));
        }

        if command.game_id != self.game_id() {
            return Some(ApiError::new(
                ErrorCode::GameNotFound,
                "command.game_id does not match the active game",
                Some(format!(
                    "requested_game_id={} active_game_id={}",
                    command.game_id,
                    self.game_id()
                )),
            ));
        }

        if command.command_id.trim().is_empty() {
            return Some(ApiError::new(
                ErrorCode::InvalidCommand,
                "command_id must not be empty",
                None,
            ));
        }

        match &command.payload {
            CommandPayload::SubmitAnswer { option } if option.trim().is_empty() => {
                Some(ApiError::new(
                    ErrorCode::InvalidCommand,
                    "submit_answer requires an option label",
                    None,
                ))
            }
            CommandPayload::SubmitVote { target_id } if target_id.trim().is_empty() => {
                Some(ApiError::new(
                    ErrorCode::InvalidCommand,
                    "submit_vote requires a target_id",
                    None,
                ))
            }
            _ => None,
        }
    }
}

/// Maps engine errors onto the wire error codes.
pub fn api_error(err: &GameError) -> ApiError {
    let code = match err {
        GameError::Catalog(_)
        | GameError::UnknownCharacter(_)
        | GameError::RosterTooSmall { .. } => ErrorCode::InvalidConfig,
        GameError::PhaseConflict { .. } | GameError::AlreadySubmitted { .. } => {
            ErrorCode::PhaseConflict
        }
        GameError::InvalidOption(_) | GameError::InvalidVoteTarget { .. } => {
            ErrorCode::InvalidCommand
        }
    };
    ApiError::new(code, err.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Character, Difficulty, OptionLabel, ScenarioDefinition};
    use std::collections::BTreeMap;

    fn test_catalog() -> Catalog {
        let characters = (1..=10)
            .map(|n| Character {
                id: format!("emp_{n:02}"),
                name: format!("Employee {n}"),
                department: if n % 2 == 0 { "IT" } else { "HR" }.to_string(),
            })
            .collect();
        let scenarios = vec![ScenarioDefinition {
            scenario_id: "sc_only".to_string(),
            prompt: "A stranger asks for your badge.".to_string(),
            options: [
                "Lend it".to_string(),
                "Refuse and report".to_string(),
                "Ignore".to_string(),
            ],
            correct_option: OptionLabel::B,
            rationale_correct: "Good call.".to_string(),
            rationale_wrong: "Badges are personal.".to_string(),
        }];
        Catalog::new(characters, Vec::new(), scenarios, BTreeMap::new()).expect("catalog")
    }

    fn test_config() -> GameConfig {
        GameConfig {
            game_id: "game_api_test".to_string(),
            human_id: "emp_01".to_string(),
            difficulty: Difficulty::Easy,
            ..GameConfig::default()
        }
    }

    fn answer(option: &str) -> Command {
        Command::new(
            "cmd_answer",
            "game_api_test",
            CommandPayload::SubmitAnswer {
                option: option.to_string(),
            },
        )
    }

    #[test]
    fn accepts_correct_answer_and_audits_it() {
        let mut api = GameApi::from_config(test_config(), &test_catalog()).expect("api");
        let outcome = api.apply_command(answer("b")).expect("accepted");
        match outcome {
            CommandOutcome::Answer(answer) => {
                assert!(answer.correct);
                assert_eq!(answer.actions.len(), 9);
                assert!(answer
                    .actions
                    .iter()
                    .all(|record| record.action_id == game_core::STUB_ACTION_ID));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(api.command_audit().len(), 1);
        assert!(api.command_audit()[0].accepted);
    }

    #[test]
    fn rejects_foreign_game_and_schema() {
        let mut api = GameApi::from_config(test_config(), &test_catalog()).expect("api");

        let mut foreign = answer("b");
        foreign.game_id = "someone_else".to_string();
        let error = api.apply_command(foreign).expect_err("rejected");
        assert_eq!(error.error_code, ErrorCode::GameNotFound);

        let mut stale = answer("b");
        stale.schema_version = "0.9".to_string();
        let error = api.apply_command(stale).expect_err("rejected");
        assert_eq!(error.error_code, ErrorCode::ContractVersionUnsupported);

        assert_eq!(api.command_audit().len(), 2);
        assert!(api.command_audit().iter().all(|result| !result.accepted));
        assert_eq!(api.status().round, 1);
    }

    #[test]
    fn phase_errors_map_to_phase_conflict() {
        let mut api = GameApi::from_config(test_config(), &test_catalog()).expect("api");
        let next = Command::new("cmd_next", "game_api_test", CommandPayload::NextRound);
        let error = api.apply_command(next).expect_err("rejected");
        assert_eq!(error.error_code, ErrorCode::PhaseConflict);

        let error = api.apply_command(answer("z")).expect_err("rejected");
        assert_eq!(error.error_code, ErrorCode::InvalidCommand);

        api.apply_command(answer("B")).expect("accepted");
        let error = api.apply_command(answer("B")).expect_err("rejected");
        assert_eq!(error.error_code, ErrorCode::PhaseConflict);
    }

    #[test]
    fn vote_and_next_round_flow() {
        let mut api = GameApi::from_config(test_config(), &test_catalog()).expect("api");
        api.apply_command(answer("B")).expect("answer");
        let vote = Command::new(
            "cmd_vote",
            "game_api_test",
            CommandPayload::SubmitVote {
                target_id: "emp_02".to_string(),
            },
        );
        let outcome = api.apply_command(vote).expect("vote");
        let CommandOutcome::Vote(vote) = outcome else {
            panic!("expected a vote outcome");
        };
        if vote.result.is_none() {
            let next = Command::new("cmd_next", "game_api_test", CommandPayload::NextRound);
            let outcome = api.apply_command(next).expect("next");
            assert_eq!(outcome, CommandOutcome::RoundAdvanced { round: 2 });
        }
    }
}
