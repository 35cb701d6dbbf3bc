//! Load-time normalization of the reference data.
//!
//! Loose input shapes (alternate key names, numeric answer indices, comma
//! separated department hints) are resolved here once; everything past this
//! module sees only the strict contract types.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use contracts::{ActionBucket, ActionDefinition, Character, OptionLabel, ScenarioDefinition};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CatalogError;

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const ACTIONS_FILE: &str = "actions.json";
pub const SCENARIOS_FILE: &str = "scenarios.json";
pub const ELIMINATION_MESSAGES_FILE: &str = "elimination_msgs.json";

const DEFAULT_RATIONALE_CORRECT: &str = "Good call.";
const DEFAULT_RATIONALE_WRONG: &str = "That creates risk. Try again next time.";

#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
    actions: Vec<ActionDefinition>,
    scenarios: Vec<ScenarioDefinition>,
    elimination_messages: BTreeMap<String, String>,
    warnings: Vec<String>,
}

impl Catalog {
    /// Builds a catalog from already-typed records. Fails when no scenario or
    /// no character is available.
    pub fn new(
        characters: Vec<Character>,
        actions: Vec<ActionDefinition>,
        scenarios: Vec<ScenarioDefinition>,
        elimination_messages: BTreeMap<String, String>,
    ) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::NoValidScenarios);
        }
        if characters.is_empty() {
            return Err(CatalogError::EmptyRosterPool);
        }
        Ok(Self {
            characters,
            actions,
            scenarios,
            elimination_messages,
            warnings: Vec::new(),
        })
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let employees = read_file(&dir.join(EMPLOYEES_FILE))?;
        let actions = read_file(&dir.join(ACTIONS_FILE))?;
        let scenarios = read_file(&dir.join(SCENARIOS_FILE))?;
        let messages_path = dir.join(ELIMINATION_MESSAGES_FILE);
        let messages = if messages_path.exists() {
            Some(read_file(&messages_path)?)
        } else {
            None
        };
        let catalog = Self::from_json(&employees, &actions, &scenarios, messages.as_deref())?;
        info!(
            dir = %dir.display(),
            characters = catalog.characters.len(),
            actions = catalog.actions.len(),
            scenarios = catalog.scenarios.len(),
            warnings = catalog.warnings.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(
        employees: &str,
        actions: &str,
        scenarios: &str,
        elimination_messages: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let mut warnings = Vec::new();

        let raw_characters = parse_array(employees, EMPLOYEES_FILE)?;
        let characters = normalize_characters(raw_characters, &mut warnings);

        let raw_actions = parse_array(actions, ACTIONS_FILE)?;
        let actions = normalize_actions(raw_actions, &mut warnings);

        let raw_scenarios = parse_array(scenarios, SCENARIOS_FILE)?;
        let scenarios = raw_scenarios
            .iter()
            .filter_map(|raw| match normalize_scenario(raw) {
                Ok(scenario) => Some(scenario),
                Err(reason) => {
                    let warning = format!("scenario skipped: {reason}");
                    warn!("{warning}");
                    warnings.push(warning);
                    None
                }
            })
            .collect::<Vec<_>>();

        let elimination_messages = match elimination_messages {
            Some(raw) => parse_messages(raw, &mut warnings)?,
            None => BTreeMap::new(),
        };

        let mut catalog = Self::new(characters, actions, scenarios, elimination_messages)?;
        catalog.warnings = warnings;
        Ok(catalog)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    pub fn actions(&self) -> &[ActionDefinition] {
        &self.actions
    }

    pub fn scenarios(&self) -> &[ScenarioDefinition] {
        &self.scenarios
    }

    pub fn scenario(&self, scenario_id: &str) -> Option<&ScenarioDefinition> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.scenario_id == scenario_id)
    }

    pub fn elimination_messages(&self) -> &BTreeMap<String, String> {
        &self.elimination_messages
    }

    /// Non-fatal problems found while normalizing.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_array(raw: &str, context: &str) -> Result<Vec<Value>, CatalogError> {
    let value = serde_json::from_str::<Value>(raw).map_err(|source| CatalogError::Parse {
        context: context.to_string(),
        source,
    })?;
    match value {
        Value::Array(entries) => Ok(entries),
        _ => Ok(Vec::new()),
    }
}

fn parse_messages(
    raw: &str,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<String, String>, CatalogError> {
    let value = serde_json::from_str::<Value>(raw).map_err(|source| CatalogError::Parse {
        context: ELIMINATION_MESSAGES_FILE.to_string(),
        source,
    })?;
    let Value::Object(entries) = value else {
        warnings.push(format!("{ELIMINATION_MESSAGES_FILE} is not an object; ignored"));
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(department, message)| match message {
            Value::String(text) => Some((department, text)),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Number(i64),
}

impl LooseId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCharacter {
    id: LooseId,
    name: String,
    #[serde(default)]
    department: String,
}

fn normalize_characters(raw: Vec<Value>, warnings: &mut Vec<String>) -> Vec<Character> {
    let mut seen = BTreeSet::new();
    let mut characters = Vec::new();
    for entry in raw {
        let parsed = match serde_json::from_value::<RawCharacter>(entry) {
            Ok(parsed) => parsed,
            Err(err) => {
                let warning = format!("character skipped: {err}");
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }
        };
        let id = parsed.id.into_string();
        if id.is_empty() || !seen.insert(id.clone()) {
            let warning = format!("character skipped: missing or duplicate id {id:?}");
            warn!("{warning}");
            warnings.push(warning);
            continue;
        }
        characters.push(Character {
            id,
            name: parsed.name,
            department: parsed.department.trim().to_string(),
        });
    }
    characters
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DepartmentHint {
    List(Vec<String>),
    Csv(String),
}

impl DepartmentHint {
    fn into_tags(self) -> BTreeSet<String> {
        let parts = match self {
            Self::List(items) => items,
            Self::Csv(raw) => raw.split(',').map(str::to_string).collect(),
        };
        parts
            .into_iter()
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawAction {
    id: LooseId,
    bucket: String,
    #[serde(default, alias = "text")]
    description: String,
    #[serde(default, alias = "riskLevel")]
    risk_level: i64,
    #[serde(default, alias = "actuallySuspicious")]
    actually_suspicious: bool,
    #[serde(default, alias = "departments_hint", alias = "departmentTags")]
    department_tags: Option<DepartmentHint>,
}

fn normalize_actions(raw: Vec<Value>, warnings: &mut Vec<String>) -> Vec<ActionDefinition> {
    let mut seen = BTreeSet::new();
    let mut unknown_buckets = Vec::new();
    let mut actions = Vec::new();

    for entry in raw {
        let parsed = match serde_json::from_value::<RawAction>(entry) {
            Ok(parsed) => parsed,
            Err(err) => {
                let warning = format!("action skipped: {err}");
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }
        };
        let action_id = parsed.id.into_string();
        let Ok(bucket) = parsed.bucket.parse::<ActionBucket>() else {
            unknown_buckets.push(action_id);
            continue;
        };
        if action_id.is_empty() || !seen.insert(action_id.clone()) {
            let warning = format!("action skipped: missing or duplicate id {action_id:?}");
            warn!("{warning}");
            warnings.push(warning);
            continue;
        }
        actions.push(ActionDefinition {
            action_id,
            bucket,
            description: parsed.description,
            risk_level: u32::try_from(parsed.risk_level.max(0)).unwrap_or(u32::MAX),
            actually_suspicious: parsed.actually_suspicious,
            department_tags: parsed
                .department_tags
                .map(DepartmentHint::into_tags)
                .unwrap_or_default(),
        });
    }

    if !unknown_buckets.is_empty() {
        let warning = format!(
            "unknown action buckets -> {}",
            unknown_buckets.join(", ")
        );
        warn!("{warning}");
        warnings.push(warning);
    }
    actions
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseAnswer {
    Index(i64),
    Label(String),
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    #[serde(default)]
    id: Option<LooseId>,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    option_a: Option<String>,
    #[serde(default)]
    option_b: Option<String>,
    #[serde(default)]
    option_c: Option<String>,
    #[serde(default)]
    identity: Option<LooseAnswer>,
    #[serde(default)]
    correct: Option<LooseAnswer>,
    #[serde(default, alias = "rationaleCorrect")]
    rationale_correct: Option<String>,
    #[serde(default, alias = "rationaleWrong")]
    rationale_wrong: Option<String>,
}

/// Normalizes one scenario record; anything without exactly three options is
/// rejected with a reason.
pub fn normalize_scenario(raw: &Value) -> Result<ScenarioDefinition, String> {
    let parsed = serde_json::from_value::<RawScenario>(raw.clone())
        .map_err(|err| format!("unreadable record ({err})"))?;
    let scenario_id = parsed.id.map(LooseId::into_string).unwrap_or_default();

    let options = match parsed.options {
        Some(list) => list,
        None => [parsed.option_a, parsed.option_b, parsed.option_c]
            .into_iter()
            .flatten()
            .filter(|text| !text.trim().is_empty())
            .collect(),
    };
    let options: [String; 3] = options
        .try_into()
        .map_err(|found: Vec<String>| {
            format!(
                "scenario {scenario_id:?} has {} options, expected 3",
                found.len()
            )
        })?;

    let correct_option = match parsed.identity.or(parsed.correct) {
        Some(LooseAnswer::Index(index)) => usize::try_from(index)
            .ok()
            .and_then(OptionLabel::from_index)
            .unwrap_or(OptionLabel::A),
        Some(LooseAnswer::Label(label)) => {
            OptionLabel::parse_loose(&label).unwrap_or(OptionLabel::A)
        }
        None => OptionLabel::A,
    };

    Ok(ScenarioDefinition {
        scenario_id,
        prompt: parsed.prompt,
        options,
        correct_option,
        rationale_correct: non_empty_or(parsed.rationale_correct, DEFAULT_RATIONALE_CORRECT),
        rationale_wrong: non_empty_or(parsed.rationale_wrong, DEFAULT_RATIONALE_WRONG),
    })
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_accepts_letter_fields_and_numeric_answer() {
        let scenario = normalize_scenario(&json!({
            "id": 7,
            "prompt": "A courier asks you to sign for someone else.",
            "option_a": "Sign it",
            "option_b": "Ask for ID and check the manifest",
            "option_c": "Leave it at the door",
            "identity": 1,
            "rationaleCorrect": "Verification first."
        }))
        .expect("valid scenario");
        assert_eq!(scenario.scenario_id, "7");
        assert_eq!(scenario.correct_option, OptionLabel::B);
        assert_eq!(scenario.rationale_correct, "Verification first.");
        assert_eq!(scenario.rationale_wrong, DEFAULT_RATIONALE_WRONG);
    }

    #[test]
    fn scenario_with_wrong_option_count_is_rejected() {
        let two = normalize_scenario(&json!({
            "id": "s1", "prompt": "p", "options": ["a", "b"], "correct": "A"
        }));
        assert!(two.is_err());

        let four = normalize_scenario(&json!({
            "id": "s2", "prompt": "p", "options": ["a", "b", "c", "d"], "correct": "A"
        }));
        assert!(four.is_err());

        let blank_letter = normalize_scenario(&json!({
            "id": "s3", "prompt": "p", "option_a": "a", "option_b": "", "option_c": "c"
        }));
        assert!(blank_letter.is_err());
    }

    #[test]
    fn scenario_answer_is_coerced_to_a_when_unreadable() {
        let scenario = normalize_scenario(&json!({
            "id": "s4", "prompt": "p", "options": ["a", "b", "c"], "correct": "Z"
        }))
        .expect("valid scenario");
        assert_eq!(scenario.correct_option, OptionLabel::A);

        let lowered = normalize_scenario(&json!({
            "id": "s5", "prompt": "p", "options": ["a", "b", "c"], "correct": " c "
        }))
        .expect("valid scenario");
        assert_eq!(lowered.correct_option, OptionLabel::C);
    }

    #[test]
    fn unknown_buckets_warn_and_never_surface() {
        let catalog = Catalog::from_json(
            r#"[{"id":"emp_01","name":"Ada","department":"IT"}]"#,
            r#"[
                {"id":"a1","bucket":"safe","description":"patched a laptop","risk_level":0,"departments_hint":"IT, Ops"},
                {"id":"a2","bucket":"lull","description":"stared at the wall","risk_level":1}
            ]"#,
            r#"[{"id":"s1","prompt":"p","options":["a","b","c"],"correct":"B"}]"#,
            None,
        )
        .expect("catalog loads");
        assert_eq!(catalog.actions().len(), 1);
        assert_eq!(
            catalog.actions()[0].department_tags,
            ["it".to_string(), "ops".to_string()].into_iter().collect()
        );
        assert!(catalog
            .warnings()
            .iter()
            .any(|warning| warning.contains("unknown action buckets -> a2")));
    }

    #[test]
    fn empty_scenario_set_is_fatal() {
        let result = Catalog::from_json(
            r#"[{"id":"emp_01","name":"Ada","department":"IT"}]"#,
            "[]",
            r#"[{"id":"s1","prompt":"p","options":["only one"]}]"#,
            None,
        );
        assert!(matches!(result, Err(CatalogError::NoValidScenarios)));
    }

    #[test]
    fn empty_character_pool_is_fatal() {
        let result = Catalog::from_json(
            "[]",
            "[]",
            r#"[{"id":"s1","prompt":"p","options":["a","b","c"],"correct":"A"}]"#,
            None,
        );
        assert!(matches!(result, Err(CatalogError::EmptyRosterPool)));
    }

    #[test]
    fn duplicate_ids_are_dropped_with_warning() {
        let catalog = Catalog::from_json(
            r#"[{"id":"e1","name":"A","department":"HR"},{"id":"e1","name":"B","department":"HR"}]"#,
            r#"[{"id":"a1","bucket":"decoy","description":"x"},{"id":"a1","bucket":"safe","description":"y"}]"#,
            r#"[{"id":"s1","prompt":"p","options":["a","b","c"]}]"#,
            Some(r#"{"HR":"HR in disarray.","IT":42}"#),
        )
        .expect("catalog loads");
        assert_eq!(catalog.characters().len(), 1);
        assert_eq!(catalog.actions().len(), 1);
        assert_eq!(catalog.actions()[0].bucket, ActionBucket::Decoy);
        assert_eq!(catalog.warnings().len(), 2);
        assert_eq!(catalog.elimination_messages().len(), 1);
    }

    #[test]
    fn load_dir_reads_all_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(EMPLOYEES_FILE),
            r#"[{"id":"e1","name":"A","department":"HR"}]"#,
        )
        .expect("write employees");
        fs::write(
            dir.path().join(ACTIONS_FILE),
            r#"[{"id":"a1","bucket":"safe","description":"x","risk_level":0}]"#,
        )
        .expect("write actions");
        fs::write(
            dir.path().join(SCENARIOS_FILE),
            r#"[{"id":"s1","prompt":"p","options":["a","b","c"],"correct":"C"}]"#,
        )
        .expect("write scenarios");

        let catalog = Catalog::load_dir(dir.path()).expect("catalog loads");
        assert_eq!(catalog.characters().len(), 1);
        assert_eq!(catalog.scenarios()[0].correct_option, OptionLabel::C);
        assert!(catalog.elimination_messages().is_empty());
    }

    #[test]
    fn load_dir_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = Catalog::load_dir(dir.path());
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
