use std::collections::BTreeMap;

use contracts::{EliminationReason, EliminationRecord, GameOutcome, Role, VoteResolution};
use tracing::info;

use crate::state::GameState;

const UNKNOWN_DEPARTMENT: &str = "A team";

pub struct EliminationResolver;

impl EliminationResolver {
    /// No-op for ids that are not alive.
    pub fn eliminate(
        state: &mut GameState,
        id: &str,
        reason: EliminationReason,
        messages: &BTreeMap<String, String>,
    ) -> Option<EliminationRecord> {
        if !state.mark_eliminated(id, reason) {
            return None;
        }
        let player = state.player(id)?;
        let record = EliminationRecord {
            round: state.round(),
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            reason,
            message: Self::message_for(&player.name, &player.department, player.role, reason, messages),
        };
        info!(
            round = record.round,
            player_id = %record.player_id,
            role = ?record.role,
            reason = ?record.reason,
            "player eliminated"
        );
        Some(record)
    }

    pub fn message_for(
        name: &str,
        department: &str,
        role: Role,
        reason: EliminationReason,
        messages: &BTreeMap<String, String>,
    ) -> String {
        match reason {
            EliminationReason::VotedOut => {
                let role = match role {
                    Role::Traitor => "Traitor",
                    Role::Innocent => "Innocent",
                };
                format!("Eliminated: {name} ({role}).")
            }
            EliminationReason::NightStrike => messages
                .get(department)
                .cloned()
                .unwrap_or_else(|| {
                    let department = if department.trim().is_empty() {
                        UNKNOWN_DEPARTMENT
                    } else {
                        department
                    };
                    format!("{department} in turmoil.")
                }),
        }
    }

    /// Most influential alive innocent bot; among equals the least suspected,
    /// then roster order.
    pub fn night_strike_target(state: &GameState) -> Option<String> {
        let mut innocents = state
            .alive_bots()
            .filter(|player| !player.is_traitor())
            .collect::<Vec<_>>();
        innocents.sort_by(|a, b| {
            b.influence.total_cmp(&a.influence).then_with(|| {
                state
                    .suspicion_of(&a.id)
                    .total_cmp(&state.suspicion_of(&b.id))
            })
        });
        innocents.first().map(|player| player.id.clone())
    }

    /// The vote-out, then one night strike if the voted-out player was innocent.
    pub fn resolve_vote_out(
        state: &mut GameState,
        resolution: &VoteResolution,
        messages: &BTreeMap<String, String>,
    ) -> Vec<EliminationRecord> {
        let mut records = Vec::new();
        let Some(voted_out) = Self::eliminate(
            state,
            &resolution.eliminated_id,
            EliminationReason::VotedOut,
            messages,
        ) else {
            return records;
        };
        let innocent = voted_out.role == Role::Innocent;
        records.push(voted_out);
        if innocent {
            if let Some(target) = Self::night_strike_target(state) {
                if let Some(struck) =
                    Self::eliminate(state, &target, EliminationReason::NightStrike, messages)
                {
                    records.push(struck);
                }
            }
        }
        records
    }

    pub fn evaluate_end(state: &GameState) -> Option<GameOutcome> {
        if !state.human_alive() {
            return Some(GameOutcome::HumanEliminated);
        }
        let traitors = state.alive_traitor_count();
        if traitors == 0 {
            return Some(GameOutcome::TraitorsCleared);
        }
        if traitors >= state.alive_count().saturating_sub(traitors) {
            return Some(GameOutcome::TraitorsControl);
        }
        None
    }
}
