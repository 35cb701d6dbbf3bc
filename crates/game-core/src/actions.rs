//! Per-round bot activity with anti-repetition.
//!
//! Each alive bot gets a primary bucket from its role and the difficulty,
//! then walks a fixed fallback order until some bucket has a fresh action.
//! Fresh means not yet used this round and, when possible, not among the
//! player's last few actions.

use std::collections::BTreeMap;

use contracts::{ActionBucket, ActionDefinition, ActionRecord, DifficultyProfile, Role};

use crate::rng::GameRng;
use crate::state::{GameState, Player};

pub const STUB_ACTION_ID: &str = "_stub";
pub const STUB_DESCRIPTION: &str = "…did some uneventful work.";

const TRAITOR_FALLBACK: [ActionBucket; 5] = [
    ActionBucket::TraitorSabotage,
    ActionBucket::Decoy,
    ActionBucket::Safe,
    ActionBucket::RiskyInnocent,
    ActionBucket::RedHerring,
];

const INNOCENT_FALLBACK: [ActionBucket; 4] = [
    ActionBucket::Safe,
    ActionBucket::Decoy,
    ActionBucket::RiskyInnocent,
    ActionBucket::RedHerring,
];

const BASE_WEIGHT: f64 = 1.0;
const DEPARTMENT_BONUS: f64 = 1.25;
const ZERO_RISK_SAFE_BONUS: f64 = 0.2;

#[derive(Debug, Clone, Default)]
pub struct ActionLibrary {
    by_bucket: BTreeMap<ActionBucket, Vec<ActionDefinition>>,
}

impl ActionLibrary {
    pub fn new(actions: &[ActionDefinition]) -> Self {
        let mut by_bucket = BTreeMap::<ActionBucket, Vec<ActionDefinition>>::new();
        for action in actions {
            by_bucket
                .entry(action.bucket)
                .or_default()
                .push(action.clone());
        }
        Self { by_bucket }
    }

    /// Catalog order within the bucket.
    pub fn bucket(&self, bucket: ActionBucket) -> &[ActionDefinition] {
        self.by_bucket
            .get(&bucket)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// One bot's pick for the round, before it is written into state.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedAction {
    pub action: ActionDefinition,
    pub bucket_used: ActionBucket,
    pub used_fallback: bool,
    pub is_stub: bool,
}

impl AllocatedAction {
    fn stub() -> Self {
        Self {
            action: ActionDefinition {
                action_id: STUB_ACTION_ID.to_string(),
                bucket: ActionBucket::Safe,
                description: STUB_DESCRIPTION.to_string(),
                risk_level: 0,
                actually_suspicious: false,
                department_tags: Default::default(),
            },
            bucket_used: ActionBucket::Safe,
            used_fallback: true,
            is_stub: true,
        }
    }
}

pub struct ActionAllocator;

impl ActionAllocator {
    /// Traitors draw once for sabotage and again for decoy-or-safe; innocents
    /// draw once for a slip and again against their safe weight.
    pub fn primary_bucket(
        player: &Player,
        profile: &DifficultyProfile,
        rng: &mut GameRng,
    ) -> ActionBucket {
        match player.role {
            Role::Traitor => {
                if rng.chance(profile.traitor_rate) {
                    ActionBucket::TraitorSabotage
                } else if rng.chance(0.5) {
                    ActionBucket::Decoy
                } else {
                    ActionBucket::Safe
                }
            }
            Role::Innocent => {
                if rng.chance(profile.innocent_error_rate) {
                    ActionBucket::RiskyInnocent
                } else if rng.chance(player.behavior.safe) {
                    ActionBucket::Safe
                } else {
                    ActionBucket::Decoy
                }
            }
        }
    }

    /// Primary first, then the role's fallback list without the primary.
    pub fn bucket_order(primary: ActionBucket, role: Role) -> Vec<ActionBucket> {
        let fallback: &[ActionBucket] = match role {
            Role::Traitor => &TRAITOR_FALLBACK,
            Role::Innocent => &INNOCENT_FALLBACK,
        };
        std::iter::once(primary)
            .chain(fallback.iter().copied().filter(|bucket| *bucket != primary))
            .collect()
    }

    pub fn candidate_pool<'a>(
        library: &'a ActionLibrary,
        bucket: ActionBucket,
        state: &GameState,
        player_id: &str,
    ) -> Vec<&'a ActionDefinition> {
        let unused = library
            .bucket(bucket)
            .iter()
            .filter(|action| !state.is_action_used(&action.action_id))
            .collect::<Vec<_>>();
        let recent = state.recent_actions(player_id);
        let fresh = unused
            .iter()
            .copied()
            .filter(|action| {
                recent.map_or(true, |history| !history.contains(&action.action_id))
            })
            .collect::<Vec<_>>();
        if fresh.is_empty() {
            unused
        } else {
            fresh
        }
    }

    pub fn weight(action: &ActionDefinition, bucket: ActionBucket, department: &str) -> f64 {
        let mut weight = BASE_WEIGHT;
        if action.matches_department(department) {
            weight += DEPARTMENT_BONUS;
        }
        if bucket == ActionBucket::Safe && action.risk_level == 0 {
            weight += ZERO_RISK_SAFE_BONUS;
        }
        weight
    }

    pub fn choose(
        library: &ActionLibrary,
        state: &GameState,
        player: &Player,
        profile: &DifficultyProfile,
        rng: &mut GameRng,
    ) -> AllocatedAction {
        let primary = Self::primary_bucket(player, profile, rng);
        for bucket in Self::bucket_order(primary, player.role) {
            let pool = Self::candidate_pool(library, bucket, state, &player.id);
            if pool.is_empty() {
                continue;
            }
            let weights = pool
                .iter()
                .map(|action| Self::weight(action, bucket, &player.department))
                .collect::<Vec<_>>();
            if let Some(action) = rng.weighted_pick(&pool, &weights) {
                return AllocatedAction {
                    action: (*action).clone(),
                    bucket_used: bucket,
                    used_fallback: bucket != primary,
                    is_stub: false,
                };
            }
        }
        AllocatedAction::stub()
    }

    /// Every alive bot acts once, in roster order; picks are recorded in the
    /// used set and history before the next bot chooses.
    pub fn allocate_round(
        library: &ActionLibrary,
        state: &mut GameState,
        profile: &DifficultyProfile,
        rng: &mut GameRng,
    ) -> Vec<ActionRecord> {
        let bots = state.alive_bots().cloned().collect::<Vec<_>>();
        let mut records = Vec::with_capacity(bots.len());
        for bot in bots {
            let picked = Self::choose(library, state, &bot, profile, rng);
            state.record_action(&bot.id, &picked.action.action_id, picked.is_stub);
            records.push(ActionRecord {
                player_id: bot.id.clone(),
                player_name: bot.name.clone(),
                action_id: picked.action.action_id,
                description: picked.action.description,
                risk_level: picked.action.risk_level,
                is_suspicious: picked.action.actually_suspicious,
                bucket_used: picked.bucket_used,
                used_fallback: picked.used_fallback,
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::roster::RosterBuilder;
    use crate::test_support;
    use contracts::Difficulty;

    fn action(id: &str, bucket: ActionBucket, risk: u32, tags: &[&str]) -> ActionDefinition {
        ActionDefinition {
            action_id: id.to_string(),
            bucket,
            description: format!("did {id}"),
            risk_level: risk,
            actually_suspicious: bucket == ActionBucket::TraitorSabotage,
            department_tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    #[test]
    fn bucket_order_never_repeats_and_innocents_never_sabotage() {
        let order = ActionAllocator::bucket_order(ActionBucket::Decoy, Role::Traitor);
        assert_eq!(
            order,
            vec![
                ActionBucket::Decoy,
                ActionBucket::TraitorSabotage,
                ActionBucket::Safe,
                ActionBucket::RiskyInnocent,
                ActionBucket::RedHerring,
            ]
        );
        for primary in [
            ActionBucket::Safe,
            ActionBucket::Decoy,
            ActionBucket::RiskyInnocent,
        ] {
            let order = ActionAllocator::bucket_order(primary, Role::Innocent);
            assert!(!order.contains(&ActionBucket::TraitorSabotage));
            assert_eq!(order.len(), 4);
            assert_eq!(order[0], primary);
        }
    }

    #[test]
    fn weight_rewards_department_and_zero_risk_safe() {
        let tagged = action("a", ActionBucket::Safe, 0, &["finance"]);
        assert!((ActionAllocator::weight(&tagged, ActionBucket::Safe, "Finance") - 2.45).abs() < 1e-9);
        let risky = action("b", ActionBucket::Safe, 2, &[]);
        assert!((ActionAllocator::weight(&risky, ActionBucket::Safe, "Finance") - 1.0).abs() < 1e-9);
        let decoy = action("c", ActionBucket::Decoy, 0, &[]);
        assert!((ActionAllocator::weight(&decoy, ActionBucket::Decoy, "IT") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pool_prefers_fresh_then_unused() {
        let library = ActionLibrary::new(&[
            action("s1", ActionBucket::Safe, 0, &[]),
            action("s2", ActionBucket::Safe, 0, &[]),
        ]);
        let pool = test_support::characters(4);
        let mut rng = GameRng::new(3);
        let mut state = RosterBuilder::build(&pool, "emp_01", 1, 3, &mut rng).expect("roster");
        let bot = state.players()[1].id.clone();

        state.record_action(&bot, "s1", false);
        state.clear_used_actions();
        let ids = |pool: Vec<&ActionDefinition>| {
            pool.iter().map(|a| a.action_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(
            ids(ActionAllocator::candidate_pool(&library, ActionBucket::Safe, &state, &bot)),
            vec!["s2"]
        );

        state.record_action(&bot, "s2", false);
        state.clear_used_actions();
        assert_eq!(
            ids(ActionAllocator::candidate_pool(&library, ActionBucket::Safe, &state, &bot)),
            vec!["s1", "s2"]
        );

        state.record_action("someone", "s1", false);
        assert_eq!(
            ids(ActionAllocator::candidate_pool(&library, ActionBucket::Safe, &state, &bot)),
            vec!["s2"]
        );
    }

    #[test]
    fn exhausted_library_degrades_to_stub() {
        let library = ActionLibrary::new(&[action("only", ActionBucket::RedHerring, 1, &[])]);
        let pool = test_support::characters(6);
        let mut rng = GameRng::new(11);
        let mut state = RosterBuilder::build(&pool, "emp_01", 1, 11, &mut rng).expect("roster");
        let profile = Difficulty::Hard.profile();

        let records = ActionAllocator::allocate_round(&library, &mut state, &profile, &mut rng);
        assert_eq!(records.len(), 5);
        let real = records.iter().filter(|r| r.action_id == "only").count();
        assert_eq!(real, 1);
        for record in records.iter().filter(|r| r.action_id == STUB_ACTION_ID) {
            assert_eq!(record.bucket_used, ActionBucket::Safe);
            assert!(record.used_fallback);
            assert_eq!(record.risk_level, 0);
            assert!(!record.is_suspicious);
        }
        assert!(!state.is_action_used(STUB_ACTION_ID));
    }

    #[test]
    fn no_action_id_repeats_within_a_round() {
        let catalog = test_support::catalog();
        let library = ActionLibrary::new(catalog.actions());
        for seed in 0..40_u32 {
            let mut rng = GameRng::new(seed);
            let mut state =
                RosterBuilder::build(catalog.characters(), "emp_01", 3, seed, &mut rng)
                    .expect("roster");
            for _ in 0..4 {
                state.clear_used_actions();
                let records = ActionAllocator::allocate_round(
                    &library,
                    &mut state,
                    &Difficulty::Medium.profile(),
                    &mut rng,
                );
                let mut seen = BTreeSet::new();
                for record in records.iter().filter(|r| r.action_id != STUB_ACTION_ID) {
                    assert!(seen.insert(record.action_id.clone()), "seed {seed}");
                }
                assert!(state.check_invariants().is_ok());
            }
        }
    }

    #[test]
    fn innocents_never_report_sabotage() {
        let catalog = test_support::catalog();
        let library = ActionLibrary::new(catalog.actions());
        for seed in 0..25_u32 {
            let mut rng = GameRng::new(seed);
            let mut state =
                RosterBuilder::build(catalog.characters(), "emp_01", 3, seed, &mut rng)
                    .expect("roster");
            let records = ActionAllocator::allocate_round(
                &library,
                &mut state,
                &Difficulty::Hard.profile(),
                &mut rng,
            );
            for record in records {
                if !state.is_traitor(&record.player_id) {
                    assert_ne!(record.bucket_used, ActionBucket::TraitorSabotage);
                }
            }
        }
    }
}
