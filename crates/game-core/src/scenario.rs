use contracts::{OptionLabel, ScenarioDefinition};

use crate::error::{CatalogError, GameError};
use crate::rng::GameRng;

/// Result of judging one answer against the active scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub picked: OptionLabel,
    pub correct: bool,
    pub rationale: String,
}

#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    scenarios: Vec<ScenarioDefinition>,
}

impl ScenarioEngine {
    pub fn new(scenarios: Vec<ScenarioDefinition>) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::NoValidScenarios);
        }
        Ok(Self { scenarios })
    }

    /// One uniform draw per round; repeats across rounds are allowed.
    pub fn select(&self, rng: &mut GameRng) -> &ScenarioDefinition {
        let idx = rng.index(self.scenarios.len());
        &self.scenarios[idx]
    }

    /// Fails without side effects when `raw` is not a recognizable label.
    pub fn judge(scenario: &ScenarioDefinition, raw: &str) -> Result<Judgement, GameError> {
        let picked =
            OptionLabel::parse_loose(raw).ok_or_else(|| GameError::InvalidOption(raw.to_string()))?;
        let correct = picked == scenario.correct_option;
        let rationale = if correct {
            scenario.rationale_correct.clone()
        } else {
            scenario.rationale_wrong.clone()
        };
        Ok(Judgement {
            picked,
            correct,
            rationale,
        })
    }
}
