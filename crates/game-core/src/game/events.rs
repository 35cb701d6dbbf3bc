use super::*;

impl Game {
    pub(super) fn push_event(
        &mut self,
        event_type: EventType,
        actors: Vec<String>,
        message: String,
        details: Option<Value>,
    ) -> String {
        let round = self.state.round();
        self.sequence_in_round = self.sequence_in_round.saturating_add(1);
        let event_id = format!("evt_{round:03}_{:04}", self.sequence_in_round);
        debug!(%event_id, ?event_type, "{message}");
        let content = match &details {
            Some(details) => format!("{message}{details}"),
            None => message.clone(),
        };
        self.event_log.push(GameEvent {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            game_id: self.config.game_id.clone(),
            round,
            event_id: event_id.clone(),
            sequence_in_round: self.sequence_in_round,
            event_type,
            actors,
            message,
            details,
        });
        self.replay_hash = mix_replay_hash(
            self.replay_hash,
            &event_id,
            round,
            self.sequence_in_round,
            &content,
        );
        event_id
    }

    pub(super) fn emit_action_events(&mut self, records: &[ActionRecord]) {
        for record in records {
            let mut details = json!({
                "action_id": record.action_id,
                "risk_level": record.risk_level,
                "is_suspicious": record.is_suspicious,
                "bucket_used": record.bucket_used,
                "used_fallback": record.used_fallback,
            });
            if self.config.analysis_mode {
                details["hint"] = Value::String(action_hint(record));
            }
            self.push_event(
                EventType::ActionPerformed,
                vec![record.player_id.clone()],
                format!("{}: {}", record.player_name, record.description),
                Some(details),
            );
        }
    }

    pub(super) fn emit_vote_events(&mut self, resolution: &VoteResolution) {
        let human_id = self.state.human_id().to_string();
        for vote in &resolution.reveal {
            let voter = if vote.voter_id == human_id {
                "You".to_string()
            } else {
                self.state.name_of(&vote.voter_id).to_string()
            };
            let message = format!("{voter} voted {}", self.state.name_of(&vote.target_id));
            self.push_event(
                EventType::VoteCast,
                vec![vote.voter_id.clone(), vote.target_id.clone()],
                message,
                Some(json!({ "forced": vote.forced })),
            );
        }

        let eliminated_name = self.state.name_of(&resolution.eliminated_id).to_string();
        let message = if resolution.tie_broken {
            format!("a deciding vote chose {eliminated_name}.")
        } else {
            format!(
                "{eliminated_name} received the most votes ({}).",
                resolution.votes_for(&resolution.eliminated_id)
            )
        };
        self.push_event(
            EventType::VoteResolved,
            vec![resolution.eliminated_id.clone()],
            message,
            Some(json!({
                "tally": resolution.tally,
                "tie_broken": resolution.tie_broken,
            })),
        );
    }

    pub(super) fn emit_elimination_event(&mut self, record: &EliminationRecord) {
        let message = match record.reason {
            EliminationReason::VotedOut => record.message.clone(),
            EliminationReason::NightStrike => {
                format!("Night strike: {} was eliminated by traitors.", record.name)
            }
        };
        self.push_event(
            EventType::PlayerEliminated,
            vec![record.player_id.clone()],
            message,
            Some(json!({
                "role": record.role,
                "reason": record.reason,
                "narrative": record.message,
            })),
        );
    }
}

/// The one-line read an analyst would give on an action.
fn action_hint(record: &ActionRecord) -> String {
    let read = if record.is_suspicious {
        "Looks truly risky."
    } else if record.risk_level > 0 {
        "May look risky but could be benign."
    } else {
        "Safe."
    };
    if record.used_fallback {
        format!("{read} (pool fallback used)")
    } else {
        read.to_string()
    }
}
