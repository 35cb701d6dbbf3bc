use super::*;

use contracts::{Character, OptionLabel, ScenarioDefinition};
use std::collections::BTreeMap;

fn test_state() -> AppState {
    let characters = (1..=10)
        .map(|n| Character {
            id: format!("emp_{n:02}"),
            name: format!("Employee {n}"),
            department: "Ops".to_string(),
        })
        .collect();
    let scenarios = vec![ScenarioDefinition {
        scenario_id: "sc_http".to_string(),
        prompt: "An unknown USB stick sits in the lobby.".to_string(),
        options: [
            "Plug it in".to_string(),
            "Hand it to IT".to_string(),
            "Keep it".to_string(),
        ],
        correct_option: OptionLabel::B,
        rationale_correct: "Good call.".to_string(),
        rationale_wrong: "Unknown media is a classic lure.".to_string(),
    }];
    let catalog =
        Catalog::new(characters, Vec::new(), scenarios, BTreeMap::new()).expect("catalog");
    AppState::new(catalog)
}

fn game_config() -> GameConfig {
    GameConfig {
        game_id: "game_http".to_string(),
        human_id: "emp_01".to_string(),
        ..GameConfig::default()
    }
}

async fn created_state() -> AppState {
    let state = test_state();
    create_game(
        State(state.clone()),
        Json(CreateGameRequest::Config(game_config())),
    )
    .await
    .expect("game created");
    state
}

#[test]
fn pagination_enforces_max_bounds() {
    let (start, end, next_cursor) = paginate(100, Some(10), Some(20)).expect("page should work");
    assert_eq!(start, 10);
    assert_eq!(end, 30);
    assert_eq!(next_cursor, Some(30));

    let (_, end, next_cursor) = paginate(5, None, Some(0)).expect("page should work");
    assert_eq!(end, 1);
    assert_eq!(next_cursor, Some(1));

    let out_of_range = paginate(5, Some(10), Some(1));
    assert!(out_of_range.is_err());
}

#[test]
fn api_error_codes_map_to_http_statuses() {
    let conflict = HttpApiError::from_api(ApiError::new(ErrorCode::PhaseConflict, "busy", None));
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    let missing = HttpApiError::from_api(ApiError::new(ErrorCode::GameNotFound, "gone", None));
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    let invalid = HttpApiError::from_api(ApiError::new(ErrorCode::InvalidCommand, "bad", None));
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let state = created_state().await;
    let err = get_status(Path("other".to_string()), State(state))
        .await
        .expect_err("unknown game");
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.error_code, ErrorCode::GameNotFound);
}

#[tokio::test]
async fn answer_then_vote_over_http() {
    let state = created_state().await;

    let scenario = get_scenario(Path("game_http".to_string()), State(state.clone()))
        .await
        .expect("scenario")
        .0;
    assert_eq!(
        scenario.scenario.map(|prompt| prompt.scenario_id),
        Some("sc_http".to_string())
    );

    let answered = submit_answer(
        Path("game_http".to_string()),
        State(state.clone()),
        Json(AnswerRequest {
            option: "B".to_string(),
        }),
    )
    .await
    .expect("answer accepted")
    .0;
    assert!(matches!(answered.outcome, CommandOutcome::Answer(ref a) if a.correct));

    let again = submit_answer(
        Path("game_http".to_string()),
        State(state.clone()),
        Json(AnswerRequest {
            option: "B".to_string(),
        }),
    )
    .await
    .expect_err("second answer rejected");
    assert_eq!(again.status, StatusCode::CONFLICT);

    let voted = submit_vote(
        Path("game_http".to_string()),
        State(state.clone()),
        Json(VoteRequest {
            target_id: "emp_02".to_string(),
        }),
    )
    .await
    .expect("vote accepted")
    .0;
    assert!(matches!(voted.outcome, CommandOutcome::Vote(_)));

    let audit = get_commands(
        Path("game_http".to_string()),
        State(state.clone()),
        Query(PaginationQuery::default()),
    )
    .await
    .expect("audit")
    .0;
    assert_eq!(audit.entries.len(), 3);
    assert!(!audit.entries[1].accepted);
    assert_eq!(audit.entries[0].command_id, "http_answer_0001");

    let page = get_events(
        Path("game_http".to_string()),
        State(state),
        Query(PaginationQuery {
            cursor: Some(0),
            page_size: Some(2),
        }),
    )
    .await
    .expect("events")
    .0;
    assert_eq!(page.events.len(), 2);
    assert_eq!(page.next_cursor, Some(2));
}

#[tokio::test]
async fn generic_command_endpoint_reports_rejections_in_body() {
    let state = created_state().await;
    let command = Command::new("cmd_early", "game_http", CommandPayload::NextRound);
    let response = submit_command(
        Path("game_http".to_string()),
        State(state),
        Json(SubmitCommandRequest::Raw(command)),
    )
    .await
    .expect("recorded")
    .0;
    assert!(!response.result.accepted);
    assert!(response.outcome.is_none());
    assert_eq!(
        response.result.error.map(|error| error.error_code),
        Some(ErrorCode::PhaseConflict)
    );
}

#[tokio::test]
async fn create_refuses_replacement_when_asked() {
    let state = created_state().await;
    let err = create_game(
        State(state),
        Json(CreateGameRequest::WithOptions(CreateGameOptions {
            config: game_config(),
            replace_existing: Some(false),
        })),
    )
    .await
    .expect_err("replacement refused");
    assert_eq!(err.status, StatusCode::CONFLICT);
}
