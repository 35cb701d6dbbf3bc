use super::*;

use contracts::{AnswerOutcome, VoteOutcome};

impl Game {
    /// Resumes the scenario phase with the human's label.
    ///
    /// An unreadable label is rejected and the phase stays open. Any
    /// readable label resolves the phase: correct unlocks actions and the
    /// vote, wrong eliminates the human on the spot.
    pub fn submit_answer(&mut self, raw_option: &str) -> Result<AnswerOutcome, GameError> {
        self.ensure_phase(
            "submit_answer",
            GamePhase::AwaitingScenarioAnswer,
            Some(("answer", self.latch.answer_submitted)),
        )?;
        let Some(scenario) = self.current_scenario.clone() else {
            return Err(GameError::PhaseConflict {
                operation: "submit_answer",
                expected: GamePhase::AwaitingScenarioAnswer,
                actual: self.phase,
            });
        };
        let judgement = ScenarioEngine::judge(&scenario, raw_option)?;
        self.latch.answer_submitted = true;

        let human_id = self.state.human_id().to_string();
        let message = if judgement.correct {
            "Scenario answered correctly.".to_string()
        } else {
            format!("Scenario wrong: You picked {}.", judgement.picked)
        };
        self.push_event(
            EventType::ScenarioAnswered,
            vec![human_id.clone()],
            message,
            Some(json!({
                "scenario_id": scenario.scenario_id,
                "picked": judgement.picked,
                "correct": judgement.correct,
            })),
        );
        if self.config.analysis_mode {
            self.push_event(
                EventType::AnalysisNote,
                Vec::new(),
                format!("Analysis: {}", judgement.rationale),
                None,
            );
        }

        let round = self.state.round();
        if !judgement.correct {
            let elimination = EliminationResolver::eliminate(
                &mut self.state,
                &human_id,
                EliminationReason::VotedOut,
                &self.elimination_messages,
            );
            if let Some(record) = &elimination {
                self.emit_elimination_event(record);
                self.eliminations.push(record.clone());
            }
            self.last_actions.clear();
            self.end_check_after_resolution();
            return Ok(AnswerOutcome {
                round,
                correct: false,
                rationale: judgement.rationale,
                actions: Vec::new(),
                elimination,
                result: self.result.clone(),
            });
        }

        let actions = ActionAllocator::allocate_round(
            &self.library,
            &mut self.state,
            &self.profile,
            &mut self.rng,
        );
        SuspicionModel::accumulate(&mut self.state, &actions, self.profile.pattern_clarity);
        self.emit_action_events(&actions);
        self.last_actions = actions.clone();
        self.phase = GamePhase::AwaitingVote;
        debug!(round, actions = actions.len(), "actions resolved, awaiting vote");

        Ok(AnswerOutcome {
            round,
            correct: true,
            rationale: judgement.rationale,
            actions,
            elimination: None,
            result: None,
        })
    }

    /// Resumes the vote phase with the human's target, then resolves every
    /// bot vote, the elimination, and any night strike in one step.
    pub fn submit_vote(&mut self, target_id: &str) -> Result<VoteOutcome, GameError> {
        self.ensure_phase(
            "submit_vote",
            GamePhase::AwaitingVote,
            Some(("vote", self.latch.vote_submitted)),
        )?;
        let resolution =
            VotePlanner::run(&self.state, target_id, self.config.difficulty, &mut self.rng)?;
        self.latch.vote_submitted = true;
        self.emit_vote_events(&resolution);

        let eliminations = EliminationResolver::resolve_vote_out(
            &mut self.state,
            &resolution,
            &self.elimination_messages,
        );
        for record in &eliminations {
            self.emit_elimination_event(record);
        }
        self.eliminations.extend(eliminations.iter().cloned());
        self.last_vote = Some(resolution.clone());
        self.end_check_after_resolution();

        Ok(VoteOutcome {
            resolution,
            eliminations,
            result: self.result.clone(),
        })
    }

    /// Moves a completed round on to the next scenario.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.ensure_phase("next_round", GamePhase::RoundComplete, None)?;
        self.state.advance_round();
        self.sequence_in_round = 0;
        self.begin_round();
        Ok(())
    }

    /// Decays suspicion, clears the per-round used set, and presents a
    /// scenario, unless the game is already decided.
    pub(super) fn begin_round(&mut self) {
        self.latch = PhaseLatch::default();
        self.last_actions.clear();
        self.last_vote = None;
        if let Some(outcome) = EliminationResolver::evaluate_end(&self.state) {
            self.finish_game(outcome);
            return;
        }

        SuspicionModel::decay(&mut self.state);
        self.state.clear_used_actions();
        let scenario = self.scenarios.select(&mut self.rng).clone();
        let round = self.state.round();

        self.push_event(
            EventType::RoundStarted,
            Vec::new(),
            format!("Round {round}."),
            Some(json!({ "alive_count": self.state.alive_count() })),
        );
        let prompt = scenario.prompt_for_round(round);
        self.push_event(
            EventType::ScenarioPresented,
            Vec::new(),
            scenario.prompt.clone(),
            serde_json::to_value(&prompt).ok(),
        );
        self.current_scenario = Some(scenario);
        self.phase = GamePhase::AwaitingScenarioAnswer;
        debug!(round, "round started, awaiting scenario answer");
    }

    fn end_check_after_resolution(&mut self) {
        match EliminationResolver::evaluate_end(&self.state) {
            Some(outcome) => self.finish_game(outcome),
            None => {
                self.phase = GamePhase::RoundComplete;
                let round = self.state.round();
                self.push_event(
                    EventType::RoundCompleted,
                    Vec::new(),
                    format!("Round {round} complete."),
                    Some(json!({ "alive_count": self.state.alive_count() })),
                );
            }
        }
    }

    fn finish_game(&mut self, outcome: GameOutcome) {
        let traitor_ids = self.state.traitor_ids_in_roster_order();
        let names = traitor_ids
            .iter()
            .map(|id| self.state.name_of(id).to_string())
            .collect::<Vec<_>>();
        let result = GameResult {
            outcome,
            round: self.state.round(),
            traitor_ids: traitor_ids.clone(),
        };
        self.phase = GamePhase::GameOver;
        self.current_scenario = None;
        self.push_event(
            EventType::GameOver,
            traitor_ids,
            format!("{} The traitors were: {}.", outcome.headline(), names.join(", ")),
            Some(json!({
                "outcome": outcome,
                "human_wins": outcome.human_wins(),
            })),
        );
        info!(
            game_id = %self.config.game_id,
            round = result.round,
            ?outcome,
            "game over"
        );
        self.result = Some(result);
    }
}
