#[derive(Debug, Deserialize, Default)]
struct PaginationQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EventPage {
    schema_version: String,
    game_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    replay_hash: String,
    events: Vec<GameEvent>,
}

#[derive(Debug, Serialize)]
struct CommandAuditPage {
    schema_version: String,
    game_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    entries: Vec<CommandResult>,
}

#[derive(Debug, Serialize)]
struct ScenarioResponse {
    schema_version: String,
    game_id: String,
    scenario: Option<ScenarioPrompt>,
}

async fn get_status(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GameStatus>, HttpApiError> {
    let inner = state.inner.lock().await;
    let game = require_game(&inner, &game_id)?;
    Ok(Json(game.status()))
}

async fn get_snapshot(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GameSnapshot>, HttpApiError> {
    let inner = state.inner.lock().await;
    let game = require_game(&inner, &game_id)?;
    Ok(Json(game.snapshot()))
}

async fn get_scenario(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ScenarioResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let game = require_game(&inner, &game_id)?;
    Ok(Json(ScenarioResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id,
        scenario: game.current_prompt(),
    }))
}

async fn get_events(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<EventPage>, HttpApiError> {
    let inner = state.inner.lock().await;
    let game = require_game(&inner, &game_id)?;
    let (start, end, next_cursor) =
        paginate(game.events().len(), query.cursor, query.page_size)?;

    Ok(Json(EventPage {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id,
        cursor: start,
        next_cursor,
        replay_hash: game.game().replay_hash(),
        events: game.game().events_since(start, end - start).to_vec(),
    }))
}

async fn get_commands(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CommandAuditPage>, HttpApiError> {
    let inner = state.inner.lock().await;
    let game = require_game(&inner, &game_id)?;
    let entries = game.command_audit();
    let (start, end, next_cursor) = paginate(entries.len(), query.cursor, query.page_size)?;

    Ok(Json(CommandAuditPage {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id,
        cursor: start,
        next_cursor,
        entries: entries[start..end].to_vec(),
    }))
}
