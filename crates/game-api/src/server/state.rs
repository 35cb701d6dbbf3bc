/// Shared server state: one catalog, at most one active game.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<ServerInner>>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerInner {
                catalog: Arc::new(catalog),
                game: None,
            })),
        }
    }
}

#[derive(Debug)]
struct ServerInner {
    catalog: Arc<Catalog>,
    game: Option<GameApi>,
}

fn require_game<'a>(inner: &'a ServerInner, game_id: &str) -> Result<&'a GameApi, HttpApiError> {
    let Some(game) = inner.game.as_ref() else {
        return Err(HttpApiError::game_not_found(game_id, None));
    };

    if game.game_id() != game_id {
        return Err(HttpApiError::game_not_found(game_id, Some(game.game_id())));
    }

    Ok(game)
}

fn require_game_mut<'a>(
    inner: &'a mut ServerInner,
    game_id: &str,
) -> Result<&'a mut GameApi, HttpApiError> {
    let active_game_id = inner.game.as_ref().map(|game| game.game_id().to_string());
    let Some(game) = inner.game.as_mut() else {
        return Err(HttpApiError::game_not_found(game_id, None));
    };

    if game.game_id() != game_id {
        return Err(HttpApiError::game_not_found(
            game_id,
            active_game_id.as_deref(),
        ));
    }

    Ok(game)
}
