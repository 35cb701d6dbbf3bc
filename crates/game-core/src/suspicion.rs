use contracts::ActionRecord;

use crate::state::GameState;

pub const ROUND_DECAY: f64 = 0.9;
pub const RISK_WEIGHT: f64 = 0.8;
pub const SUSPICIOUS_BONUS: f64 = 1.2;

/// The only writer of suspicion scores.
pub struct SuspicionModel;

impl SuspicionModel {
    pub fn increment(record: &ActionRecord, pattern_clarity: f64) -> f64 {
        let flagged = if record.is_suspicious {
            SUSPICIOUS_BONUS
        } else {
            0.0
        };
        f64::from(record.risk_level) * RISK_WEIGHT + flagged * pattern_clarity
    }

    pub fn accumulate(state: &mut GameState, records: &[ActionRecord], pattern_clarity: f64) {
        for record in records {
            let delta = Self::increment(record, pattern_clarity);
            let score = state.suspicion_entry(&record.player_id);
            *score = (*score + delta).max(0.0);
        }
    }

    /// Applied before each round is presented, including round 1.
    pub fn decay(state: &mut GameState) {
        for score in state.suspicion_values_mut() {
            *score = (*score * ROUND_DECAY).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;
    use crate::roster::RosterBuilder;
    use crate::test_support;
    use contracts::ActionBucket;

    fn record(player_id: &str, risk_level: u32, is_suspicious: bool) -> ActionRecord {
        ActionRecord {
            player_id: player_id.to_string(),
            player_name: player_id.to_string(),
            action_id: "a".to_string(),
            description: "did a".to_string(),
            risk_level,
            is_suspicious,
            bucket_used: ActionBucket::Decoy,
            used_fallback: false,
        }
    }

    #[test]
    fn accumulate_then_decay() {
        let pool = test_support::characters(5);
        let mut rng = GameRng::new(2);
        let mut state = RosterBuilder::build(&pool, "emp_01", 1, 2, &mut rng).expect("roster");

        SuspicionModel::accumulate(
            &mut state,
            &[record("emp_02", 2, true), record("emp_03", 0, false)],
            0.7,
        );
        assert!((state.suspicion_of("emp_02") - (1.6 + 0.84)).abs() < 1e-9);
        assert_eq!(state.suspicion_of("emp_03"), 0.0);

        SuspicionModel::decay(&mut state);
        assert!((state.suspicion_of("emp_02") - 2.44 * 0.9).abs() < 1e-9);
        assert!(state.check_invariants().is_ok());
    }
}
