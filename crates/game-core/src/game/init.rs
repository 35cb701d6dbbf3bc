use super::*;

use crate::catalog::Catalog;
use crate::roster::{split_is_decided, RosterBuilder};

impl Game {
    /// Builds the roster, assigns roles, and presents round 1.
    ///
    /// RNG draw order: roster shuffle, traitor shuffle, then the first
    /// scenario pick (skipped when the clamped setup is already decided).
    pub fn new(config: GameConfig, catalog: &Catalog) -> Result<Self, GameError> {
        let scenarios = ScenarioEngine::new(catalog.scenarios().to_vec())?;
        let mut rng = GameRng::new(config.seed);
        let state = RosterBuilder::build(
            catalog.characters(),
            &config.human_id,
            config.num_traitors,
            config.seed,
            &mut rng,
        )?;

        let mut game = Self {
            profile: config.difficulty.profile(),
            state,
            rng,
            scenarios,
            library: ActionLibrary::new(catalog.actions()),
            elimination_messages: catalog.elimination_messages().clone(),
            phase: GamePhase::AwaitingScenarioAnswer,
            latch: PhaseLatch::default(),
            current_scenario: None,
            last_actions: Vec::new(),
            last_vote: None,
            eliminations: Vec::new(),
            result: None,
            event_log: Vec::new(),
            sequence_in_round: 0,
            replay_hash: 0,
            config,
        };

        let roster = game
            .state
            .players()
            .iter()
            .map(|player| player.id.clone())
            .collect::<Vec<_>>();
        game.push_event(
            EventType::GameStarted,
            roster.clone(),
            format!(
                "Game started. Traitors assigned. Difficulty: {}.",
                game.config.difficulty
            ),
            Some(json!({
                "seed": game.config.seed.to_string(),
                "human_id": game.config.human_id,
                "roster": roster,
                "traitor_count": game.state.traitor_ids().len(),
                "analysis_mode": game.config.analysis_mode,
            })),
        );
        for warning in catalog.warnings() {
            game.push_event(
                EventType::DataWarning,
                Vec::new(),
                format!("Data warning: {warning}"),
                None,
            );
        }
        let traitors = game.state.traitor_ids().len();
        let roster_size = game.state.players().len();
        if split_is_decided(traitors, roster_size) {
            game.push_event(
                EventType::DataWarning,
                Vec::new(),
                format!(
                    "Setup warning: {traitors} traitors against {} others decides the game before round 1.",
                    roster_size - traitors
                ),
                Some(json!({
                    "requested_traitors": game.config.num_traitors,
                    "traitors": traitors,
                    "roster": roster_size,
                })),
            );
        }
        info!(
            game_id = %game.config.game_id,
            seed = game.config.seed,
            difficulty = %game.config.difficulty,
            players = game.state.players().len(),
            traitors = game.state.traitor_ids().len(),
            "game created"
        );

        game.begin_round();
        Ok(game)
    }
}
