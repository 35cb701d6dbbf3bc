use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use contracts::{Command, CommandPayload, EventType, GamePhase};
use game_api::{CommandOutcome, GameApi};
use game_core::Catalog;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::CliError;

pub fn interactive(config: &CliConfig, catalog: &Catalog) -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    interactive_with(config, catalog, stdin.lock(), stdout.lock())
}

/// Drives one game from line input until it ends or input runs out.
pub fn interactive_with<R: BufRead, W: Write>(
    config: &CliConfig,
    catalog: &Catalog,
    mut input: R,
    mut out: W,
) -> Result<(), CliError> {
    let human_id = match &config.human_id {
        Some(id) => id.clone(),
        None => match choose_character(catalog, &mut input, &mut out)? {
            Some(id) => id,
            None => return Ok(()),
        },
    };
    let seed = config.resolve_seed();
    let mut api = GameApi::from_config(config.game_config(human_id, seed)?, catalog)?;
    let delay = Duration::from_millis(config.reveal_delay_ms);
    let mut cursor = 0;
    let mut commands = 0_u32;

    writeln!(out, "seed {seed}")?;
    loop {
        cursor = print_events(&api, cursor, delay, &mut out)?;
        let payload = match api.game().phase() {
            GamePhase::GameOver => break,
            GamePhase::AwaitingScenarioAnswer => {
                if let Some(prompt) = api.current_prompt() {
                    writeln!(out, "\n{}", prompt.prompt)?;
                    for option in &prompt.options {
                        writeln!(out, "  {}) {}", option.label, option.text)?;
                    }
                }
                write!(out, "answer> ")?;
                out.flush()?;
                let Some(line) = read_line(&mut input)? else {
                    break;
                };
                CommandPayload::SubmitAnswer { option: line }
            }
            GamePhase::AwaitingVote => {
                let bots = api
                    .game()
                    .state()
                    .alive_bots()
                    .map(|bot| (bot.id.clone(), bot.name.clone(), bot.department.clone()))
                    .collect::<Vec<_>>();
                writeln!(out, "\nWho do you vote out?")?;
                for (index, (_, name, department)) in bots.iter().enumerate() {
                    writeln!(out, "  {}) {name} ({department})", index + 1)?;
                }
                write!(out, "vote> ")?;
                out.flush()?;
                let Some(line) = read_line(&mut input)? else {
                    break;
                };
                let target_id = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| bots.get(index))
                    .map(|(id, _, _)| id.clone())
                    .unwrap_or(line);
                CommandPayload::SubmitVote { target_id }
            }
            GamePhase::RoundComplete => {
                write!(out, "\npress enter for the next round> ")?;
                out.flush()?;
                if read_line(&mut input)?.is_none() {
                    break;
                }
                CommandPayload::NextRound
            }
        };

        commands += 1;
        let command = Command::new(format!("cli_{commands:04}"), api.game_id(), payload);
        match api.apply_command(command) {
            Ok(CommandOutcome::Answer(answer)) => writeln!(out, "{}", answer.rationale)?,
            Ok(_) => {}
            Err(error) => writeln!(out, "{}", error.message)?,
        }
    }

    if let Some(result) = api.game().result() {
        info!(outcome = ?result.outcome, round = result.round, "game finished");
    }
    writeln!(out, "replay hash {}", api.game().replay_hash())?;
    Ok(())
}

/// Autopilot: answers correctly and votes out the most suspected bot.
pub fn simulate(config: &CliConfig, catalog: &Catalog) -> Result<(), CliError> {
    let stdout = io::stdout();
    simulate_with(config, catalog, stdout.lock())
}

pub fn simulate_with<W: Write>(
    config: &CliConfig,
    catalog: &Catalog,
    mut out: W,
) -> Result<(), CliError> {
    let human_id = match &config.human_id {
        Some(id) => id.clone(),
        None => catalog
            .characters()
            .first()
            .map(|character| character.id.clone())
            .ok_or_else(|| CliError::Config("catalog has no characters".to_string()))?,
    };
    let seed = config.resolve_seed();
    let mut api = GameApi::from_config(config.game_config(human_id, seed)?, catalog)?;
    let mut commands = 0_u32;

    while !api.game().is_over() {
        let payload = match api.game().phase() {
            GamePhase::AwaitingScenarioAnswer => {
                let option = api
                    .current_prompt()
                    .and_then(|prompt| catalog.scenario(&prompt.scenario_id))
                    .map(|scenario| scenario.correct_option.to_string())
                    .ok_or_else(|| CliError::Config("scenario missing from catalog".into()))?;
                CommandPayload::SubmitAnswer { option }
            }
            GamePhase::AwaitingVote => {
                let state = api.game().state();
                let target_id = state
                    .alive_bots()
                    .max_by(|a, b| state.suspicion_of(&a.id).total_cmp(&state.suspicion_of(&b.id)))
                    .map(|bot| bot.id.clone())
                    .ok_or_else(|| CliError::Config("no bot left to vote for".into()))?;
                CommandPayload::SubmitVote { target_id }
            }
            GamePhase::RoundComplete => CommandPayload::NextRound,
            GamePhase::GameOver => break,
        };
        commands += 1;
        let command = Command::new(format!("sim_{commands:04}"), api.game_id(), payload);
        if let Err(error) = api.apply_command(command) {
            return Err(CliError::Config(error.message));
        }
    }

    for event in api.events() {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    debug!(
        seed,
        events = api.events().len(),
        replay_hash = %api.game().replay_hash(),
        "simulation finished"
    );
    Ok(())
}

fn choose_character<R: BufRead, W: Write>(
    catalog: &Catalog,
    input: &mut R,
    out: &mut W,
) -> Result<Option<String>, CliError> {
    writeln!(out, "Pick your character:")?;
    for (index, character) in catalog.characters().iter().enumerate() {
        writeln!(
            out,
            "  {}) {} ({})",
            index + 1,
            character.name,
            character.department
        )?;
    }
    loop {
        write!(out, "character> ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| catalog.characters().get(index))
            .or_else(|| catalog.character(&line));
        match picked {
            Some(character) => return Ok(Some(character.id.clone())),
            None => writeln!(out, "no such character: {line}")?,
        }
    }
}

/// Prints events past `cursor`, pausing between vote reveals.
fn print_events<W: Write>(
    api: &GameApi,
    cursor: usize,
    delay: Duration,
    out: &mut W,
) -> Result<usize, CliError> {
    let events = api.events();
    for event in &events[cursor.min(events.len())..] {
        if event.event_type == EventType::VoteCast && !delay.is_zero() {
            out.flush()?;
            thread::sleep(delay);
        }
        writeln!(out, "{}", event.message)?;
    }
    Ok(events.len())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, CliError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::path::PathBuf;

    fn sample_catalog() -> Catalog {
        Catalog::load_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data"))
            .expect("sample catalog")
    }

    fn quiet_config() -> CliConfig {
        CliConfig {
            seed: Some(42),
            difficulty: "easy".to_string(),
            reveal_delay_ms: 0,
            ..CliConfig::default()
        }
    }

    #[test]
    fn simulate_prints_one_json_event_per_line() {
        let catalog = sample_catalog();
        let mut out = Vec::new();
        simulate_with(&quiet_config(), &catalog, &mut out).expect("simulate");
        let text = String::from_utf8(out).expect("utf8");
        let events = text
            .lines()
            .map(|line| serde_json::from_str::<contracts::GameEvent>(line).expect("event"))
            .collect::<Vec<_>>();
        assert_eq!(events.first().map(|e| e.event_type), Some(EventType::GameStarted));
        assert_eq!(events.last().map(|e| e.event_type), Some(EventType::GameOver));
    }

    #[test]
    fn simulate_is_repeatable_for_a_fixed_seed() {
        let catalog = sample_catalog();
        let mut a = Vec::new();
        let mut b = Vec::new();
        simulate_with(&quiet_config(), &catalog, &mut a).expect("simulate");
        simulate_with(&quiet_config(), &catalog, &mut b).expect("simulate");
        assert_eq!(a, b);
    }

    #[test]
    fn interactive_survives_bad_input_and_eof() {
        let catalog = sample_catalog();
        let input = Cursor::new("99\n1\nnot-a-label\n");
        let mut out = Vec::new();
        interactive_with(&quiet_config(), &catalog, input, &mut out).expect("play");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("no such character: 99"));
        assert!(text.contains("answer> "));
        assert!(text.contains("replay hash"));
    }
}
