#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateGameRequest {
    Config(GameConfig),
    WithOptions(CreateGameOptions),
}

#[derive(Debug, Deserialize)]
struct CreateGameOptions {
    config: GameConfig,
    replace_existing: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreateGameResponse {
    schema_version: String,
    game_id: String,
    status: GameStatus,
    replaced_existing_game: bool,
    warnings: Vec<String>,
}

async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, HttpApiError> {
    let (config, replace_existing) = match request {
        CreateGameRequest::Config(config) => (config, true),
        CreateGameRequest::WithOptions(options) => {
            (options.config, options.replace_existing.unwrap_or(true))
        }
    };

    if config.schema_version != SCHEMA_VERSION_V1 {
        return Err(HttpApiError::from_api(ApiError::new(
            ErrorCode::ContractVersionUnsupported,
            "Unsupported schema_version",
            Some(format!(
                "got={} expected={}",
                config.schema_version, SCHEMA_VERSION_V1
            )),
        )));
    }

    let mut inner = state.inner.lock().await;
    let replaced_existing_game = inner.game.is_some();
    if replaced_existing_game && !replace_existing {
        let active = inner
            .game
            .as_ref()
            .map(|game| game.game_id().to_string())
            .unwrap_or_default();
        return Err(HttpApiError::from_api(ApiError::new(
            ErrorCode::PhaseConflict,
            "a game is already active; pass replace_existing=true to replace",
            Some(format!("active_game_id={active}")),
        )));
    }

    let catalog = Arc::clone(&inner.catalog);
    let game = GameApi::from_config(config, &catalog)
        .map_err(|err| HttpApiError::from_api(api_error(&err)))?;
    let response = CreateGameResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        game_id: game.game_id().to_string(),
        status: game.status(),
        replaced_existing_game,
        warnings: catalog.warnings().to_vec(),
    };
    info!(
        game_id = %response.game_id,
        replaced_existing_game,
        "game created over http"
    );
    inner.game = Some(game);

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubmitCommandRequest {
    Raw(Command),
    Wrapped { command: Command },
}

impl SubmitCommandRequest {
    fn into_command(self) -> Command {
        match self {
            Self::Raw(command) | Self::Wrapped { command } => command,
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitCommandResponse {
    schema_version: String,
    result: CommandResult,
    outcome: Option<CommandOutcome>,
    status: GameStatus,
}

/// Generic command endpoint. Rejections are reported in `result` with a 200,
/// matching what lands in the command audit.
async fn submit_command(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitCommandRequest>,
) -> Result<Json<SubmitCommandResponse>, HttpApiError> {
    let command = request.into_command();
    if command.game_id != game_id {
        return Err(HttpApiError::invalid_command(
            "command.game_id must match path game_id",
            Some(format!(
                "path_game_id={game_id} command_game_id={}",
                command.game_id
            )),
        ));
    }

    let mut inner = state.inner.lock().await;
    let game = require_game_mut(&mut inner, &game_id)?;
    let outcome = game.apply_command(command).ok();
    let result = game
        .command_audit()
        .last()
        .cloned()
        .ok_or_else(|| {
            HttpApiError::from_api(ApiError::new(
                ErrorCode::InternalError,
                "command was not recorded in the audit",
                None,
            ))
        })?;

    Ok(Json(SubmitCommandResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        result,
        outcome,
        status: game.status(),
    }))
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    option: String,
}

#[derive(Debug, Deserialize)]
struct VoteRequest {
    target_id: String,
}

#[derive(Debug, Serialize)]
struct OutcomeResponse {
    schema_version: String,
    outcome: CommandOutcome,
    status: GameStatus,
}

async fn submit_answer(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<OutcomeResponse>, HttpApiError> {
    apply_shortcut(
        &state,
        &game_id,
        "answer",
        CommandPayload::SubmitAnswer {
            option: request.option,
        },
    )
    .await
}

async fn submit_vote(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<OutcomeResponse>, HttpApiError> {
    apply_shortcut(
        &state,
        &game_id,
        "vote",
        CommandPayload::SubmitVote {
            target_id: request.target_id,
        },
    )
    .await
}

async fn next_round(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OutcomeResponse>, HttpApiError> {
    apply_shortcut(&state, &game_id, "next_round", CommandPayload::NextRound).await
}

async fn apply_shortcut(
    state: &AppState,
    game_id: &str,
    kind: &str,
    payload: CommandPayload,
) -> Result<Json<OutcomeResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let game = require_game_mut(&mut inner, game_id)?;
    let command = Command::new(next_command_id(game, kind), game_id, payload);
    let outcome = game.apply_command(command).map_err(HttpApiError::from_api)?;

    Ok(Json(OutcomeResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        outcome,
        status: game.status(),
    }))
}
