//! Reference data supplied by loaders: characters, actions, scenarios.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ActionBucket {
    Safe,
    RiskyInnocent,
    TraitorSabotage,
    Decoy,
    RedHerring,
}

impl ActionBucket {
    pub const ALL: [ActionBucket; 5] = [
        ActionBucket::Safe,
        ActionBucket::RiskyInnocent,
        ActionBucket::TraitorSabotage,
        ActionBucket::Decoy,
        ActionBucket::RedHerring,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::RiskyInnocent => "risky_innocent",
            Self::TraitorSabotage => "traitor_sabotage",
            Self::Decoy => "decoy",
            Self::RedHerring => "red_herring",
        }
    }
}

impl fmt::Display for ActionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionBucket {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == normalized)
            .ok_or_else(|| format!("unknown action bucket: {raw}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionDefinition {
    pub action_id: String,
    pub bucket: ActionBucket,
    pub description: String,
    pub risk_level: u32,
    pub actually_suspicious: bool,
    /// Lower-cased department names this action reads naturally for.
    #[serde(default)]
    pub department_tags: BTreeSet<String>,
}

impl ActionDefinition {
    pub fn matches_department(&self, department: &str) -> bool {
        let department = department.trim().to_lowercase();
        !department.is_empty() && self.department_tags.contains(&department)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLabel {
    A,
    B,
    C,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 3] = [OptionLabel::A, OptionLabel::B, OptionLabel::C];

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Accepts `b`, ` B `, `b.`, `(b)` and `option b`.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let stripped = lowered.strip_prefix("option").unwrap_or(&lowered);
        let core = stripped
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(['.', ')', ':']);
        match core.trim() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioDefinition {
    pub scenario_id: String,
    pub prompt: String,
    pub options: [String; 3],
    pub correct_option: OptionLabel,
    pub rationale_correct: String,
    pub rationale_wrong: String,
}

impl ScenarioDefinition {
    pub fn prompt_for_round(&self, round: u32) -> ScenarioPrompt {
        ScenarioPrompt {
            scenario_id: self.scenario_id.clone(),
            round,
            prompt: self.prompt.clone(),
            options: OptionLabel::ALL
                .into_iter()
                .map(|label| ScenarioOption {
                    label,
                    text: self.options[label.index()].clone(),
                })
                .collect(),
        }
    }
}

/// What the presentation layer shows; never carries the correct label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioPrompt {
    pub scenario_id: String,
    pub round: u32,
    pub prompt: String,
    pub options: Vec<ScenarioOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioOption {
    pub label: OptionLabel,
    pub text: String,
}
