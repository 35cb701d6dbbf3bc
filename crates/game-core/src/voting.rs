//! Simulated bot votes around the human's pick.
//!
//! All votes are planned and the tally is decided before anything is
//! revealed; reveal pacing belongs to the front end.

use contracts::{Difficulty, TallyEntry, VoteCast, VoteResolution};
use tracing::debug;

use crate::error::GameError;
use crate::rng::GameRng;
use crate::state::GameState;

pub struct VotePlanner;

impl VotePlanner {
    pub fn validate_target(state: &GameState, target_id: &str) -> Result<(), GameError> {
        let reason = match state.player(target_id) {
            None => "unknown player",
            Some(player) if player.is_human => "cannot vote for yourself",
            Some(player) if !player.is_alive() => "player already eliminated",
            Some(_) => return Ok(()),
        };
        Err(GameError::InvalidVoteTarget {
            target_id: target_id.to_string(),
            reason,
        })
    }

    /// Other alive players, human included, by descending suspicion; equal
    /// scores keep roster order.
    pub fn ranked_candidates(state: &GameState, voter_id: &str) -> Vec<String> {
        let mut ranked = state
            .alive_players()
            .filter(|player| player.id != voter_id)
            .map(|player| (player.id.clone(), state.suspicion_of(&player.id)))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    /// Returns votes in reveal order: human, forced traitor, then the other
    /// alive bots in roster order.
    pub fn plan(
        state: &GameState,
        human_target: &str,
        difficulty: Difficulty,
        rng: &mut GameRng,
    ) -> Vec<VoteCast> {
        let profile = difficulty.profile();
        let human_id = state.human_id().to_string();
        let mut votes = vec![VoteCast {
            voter_id: human_id.clone(),
            target_id: human_target.to_string(),
            forced: false,
        }];

        let voters = state.alive_bots().collect::<Vec<_>>();

        let mut forced_traitor = None;
        if difficulty.hint_mode() {
            let traitors = voters
                .iter()
                .filter(|player| player.is_traitor())
                .collect::<Vec<_>>();
            if let Some(traitor) = rng.pick(&traitors) {
                forced_traitor = Some(traitor.id.clone());
                votes.push(VoteCast {
                    voter_id: traitor.id.clone(),
                    target_id: human_id.clone(),
                    forced: true,
                });
            }
        }

        for voter in voters {
            if forced_traitor.as_deref() == Some(voter.id.as_str()) {
                continue;
            }
            let ranked = Self::ranked_candidates(state, &voter.id);
            let base = ranked
                .first()
                .cloned()
                .unwrap_or_else(|| human_target.to_string());

            let follows = rng.chance(voter.influence * profile.influence_scale);
            let mut target = if follows {
                human_target.to_string()
            } else if rng.chance(profile.vote_noise) {
                let idx = rng.index(ranked.len().max(1));
                ranked.get(idx).cloned().unwrap_or_else(|| base.clone())
            } else {
                base.clone()
            };

            if difficulty.hint_mode() && target == human_id {
                target = ranked
                    .iter()
                    .find(|id| **id != human_id)
                    .cloned()
                    .unwrap_or_else(|| human_target.to_string());
            }

            votes.push(VoteCast {
                voter_id: voter.id.clone(),
                target_id: target,
                forced: false,
            });
        }
        votes
    }

    /// Candidates in the order they first received a vote.
    pub fn tally(votes: &[VoteCast]) -> Vec<TallyEntry> {
        let mut tally = Vec::<TallyEntry>::new();
        for vote in votes {
            match tally
                .iter_mut()
                .find(|entry| entry.candidate_id == vote.target_id)
            {
                Some(entry) => entry.votes = entry.votes.saturating_add(1),
                None => tally.push(TallyEntry {
                    candidate_id: vote.target_id.clone(),
                    votes: 1,
                }),
            }
        }
        tally
    }

    /// Most votes wins; a tie goes to strictly higher suspicion, then to the
    /// candidate voted for first.
    pub fn resolve(state: &GameState, round: u32, votes: Vec<VoteCast>) -> VoteResolution {
        let tally = Self::tally(&votes);
        let mut leader: Option<&TallyEntry> = None;
        for entry in &tally {
            leader = match leader {
                None => Some(entry),
                Some(current) if entry.votes > current.votes => Some(entry),
                Some(current)
                    if entry.votes == current.votes
                        && state.suspicion_of(&entry.candidate_id)
                            > state.suspicion_of(&current.candidate_id) =>
                {
                    Some(entry)
                }
                keep => keep,
            };
        }
        let top = leader.map(|entry| entry.votes).unwrap_or(0);
        let tie_broken = tally.iter().filter(|entry| entry.votes == top).count() > 1;
        let eliminated_id = leader
            .map(|entry| entry.candidate_id.clone())
            .unwrap_or_default();
        debug!(round, %eliminated_id, tie_broken, "vote resolved");
        VoteResolution {
            round,
            reveal: votes,
            tally,
            eliminated_id,
            tie_broken,
        }
    }

    pub fn run(
        state: &GameState,
        human_target: &str,
        difficulty: Difficulty,
        rng: &mut GameRng,
    ) -> Result<VoteResolution, GameError> {
        Self::validate_target(state, human_target)?;
        let votes = Self::plan(state, human_target, difficulty, rng);
        Ok(Self::resolve(state, state.round(), votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterBuilder;
    use crate::test_support;
    use contracts::ActionRecord;

    fn cast(voter: &str, target: &str) -> VoteCast {
        VoteCast {
            voter_id: voter.to_string(),
            target_id: target.to_string(),
            forced: false,
        }
    }

    fn state(seed: u32) -> GameState {
        let pool = test_support::characters(12);
        let mut rng = GameRng::new(seed);
        RosterBuilder::build(&pool, "emp_01", 3, seed, &mut rng).expect("roster")
    }

    fn bump(state: &mut GameState, id: &str, risk_level: u32) {
        crate::suspicion::SuspicionModel::accumulate(
            state,
            &[ActionRecord {
                player_id: id.to_string(),
                player_name: id.to_string(),
                action_id: "x".to_string(),
                description: "x".to_string(),
                risk_level,
                is_suspicious: false,
                bucket_used: contracts::ActionBucket::RiskyInnocent,
                used_fallback: false,
            }],
            1.0,
        );
    }

    #[test]
    fn target_validation() {
        let mut state = state(4);
        let bot = state.players()[3].id.clone();
        assert!(VotePlanner::validate_target(&state, &bot).is_ok());
        assert!(VotePlanner::validate_target(&state, "emp_01").is_err());
        assert!(VotePlanner::validate_target(&state, "ghost").is_err());
        state.mark_eliminated(&bot, contracts::EliminationReason::VotedOut);
        assert!(VotePlanner::validate_target(&state, &bot).is_err());
    }

    #[test]
    fn ranking_is_stable_by_roster_order() {
        let mut state = state(8);
        let ids = state
            .players()
            .iter()
            .map(|p| p.id.clone())
            .collect::<Vec<_>>();
        bump(&mut state, &ids[5], 3);
        bump(&mut state, &ids[2], 1);

        let ranked = VotePlanner::ranked_candidates(&state, &ids[9]);
        assert_eq!(ranked[0], ids[5]);
        assert_eq!(ranked[1], ids[2]);
        let rest = ranked[2..].to_vec();
        let expected = ids
            .iter()
            .filter(|id| **id != ids[5] && **id != ids[2] && **id != ids[9])
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(rest, expected);
        assert!(ranked.contains(&"emp_01".to_string()));
    }

    #[test]
    fn tie_prefers_suspicion_then_first_vote() {
        let mut state = state(6);
        let ids = state
            .players()
            .iter()
            .map(|p| p.id.clone())
            .collect::<Vec<_>>();

        let votes = vec![cast("emp_01", &ids[1]), cast(&ids[3], &ids[2])];
        let resolution = VotePlanner::resolve(&state, 1, votes.clone());
        assert!(resolution.tie_broken);
        assert_eq!(resolution.eliminated_id, ids[1]);

        bump(&mut state, &ids[2], 1);
        let resolution = VotePlanner::resolve(&state, 1, votes);
        assert!(resolution.tie_broken);
        assert_eq!(resolution.eliminated_id, ids[2]);

        let clear = vec![
            cast("emp_01", &ids[1]),
            cast(&ids[3], &ids[2]),
            cast(&ids[4], &ids[2]),
        ];
        let resolution = VotePlanner::resolve(&state, 1, clear);
        assert!(!resolution.tie_broken);
        assert_eq!(resolution.votes_for(&ids[2]), 2);
    }

    #[test]
    fn hint_mode_has_exactly_one_vote_on_the_human() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            for seed in 0..60_u32 {
                let state = state(seed);
                let target = state
                    .alive_bots()
                    .map(|p| p.id.clone())
                    .nth(seed as usize % 9)
                    .expect("bot");
                let mut rng = GameRng::new(seed.wrapping_mul(31));
                let votes = VotePlanner::plan(&state, &target, difficulty, &mut rng);
                let on_human = votes
                    .iter()
                    .filter(|vote| vote.target_id == "emp_01")
                    .collect::<Vec<_>>();
                assert_eq!(on_human.len(), 1, "{difficulty} seed {seed}");
                assert!(on_human[0].forced);
                assert!(state.is_traitor(&on_human[0].voter_id));
                assert_eq!(votes[0].voter_id, "emp_01");
                assert_eq!(votes[1].voter_id, on_human[0].voter_id);
                assert_eq!(votes.len(), state.alive_count());
            }
        }
    }

    #[test]
    fn targeted_bot_follows_the_human_onto_itself() {
        let mut hits = 0;
        for seed in 0..200_u32 {
            let mut state = state(seed);
            let bots = state.alive_bots().map(|p| p.id.clone()).collect::<Vec<_>>();
            let target = bots[seed as usize % bots.len()].clone();
            for other in bots.iter().filter(|id| **id != target) {
                state.mark_eliminated(other, contracts::EliminationReason::NightStrike);
            }
            let influence = state.player(&target).map(|p| p.influence).expect("target");

            let mut rng = GameRng::new(seed.wrapping_mul(7919));
            let follows = rng
                .clone()
                .chance(influence * Difficulty::Hard.profile().influence_scale);
            let votes = VotePlanner::plan(&state, &target, Difficulty::Hard, &mut rng);
            let own = votes
                .iter()
                .find(|vote| vote.voter_id == target)
                .expect("target votes");
            if follows {
                hits += 1;
                assert_eq!(own.target_id, target, "seed {seed}");
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn bots_only_vote_for_themselves_by_following_the_human() {
        for seed in 0..60_u32 {
            let mut state = state(seed);
            let ids = state
                .players()
                .iter()
                .map(|p| p.id.clone())
                .collect::<Vec<_>>();
            bump(&mut state, &ids[1 + seed as usize % 9], 2);
            let target = ids[1 + (seed as usize * 7) % 9].clone();
            for difficulty in [Difficulty::Easy, Difficulty::Hard] {
                let mut rng = GameRng::new(seed);
                let resolution =
                    VotePlanner::run(&state, &target, difficulty, &mut rng).expect("vote");
                for vote in resolution.reveal.iter().skip(1) {
                    if vote.voter_id == vote.target_id {
                        assert_eq!(vote.target_id, target);
                    }
                    assert!(state.is_alive(&vote.target_id));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_votes() {
        let state = state(42);
        let target = state.players()[4].id.clone();
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        assert_eq!(
            VotePlanner::run(&state, &target, Difficulty::Hard, &mut a).expect("vote"),
            VotePlanner::run(&state, &target, Difficulty::Hard, &mut b).expect("vote"),
        );
    }
}
