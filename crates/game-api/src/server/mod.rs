use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, Command, CommandPayload, CommandResult, ErrorCode, GameConfig, GameEvent,
    GameSnapshot, GameStatus, ScenarioPrompt, SCHEMA_VERSION_V1,
};
use game_core::Catalog;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

use crate::{api_error, CommandOutcome, GameApi};

const DEFAULT_PAGE_SIZE: usize = 200;
const MAX_PAGE_SIZE: usize = 2000;

include!("error.rs");
include!("state.rs");
include!("routes/games.rs");
include!("routes/query.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, catalog: Catalog) -> Result<(), ServerError> {
    let state = AppState::new(catalog);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "game api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/games", post(create_game))
        .route("/api/v1/games/{game_id}/status", get(get_status))
        .route("/api/v1/games/{game_id}/snapshot", get(get_snapshot))
        .route("/api/v1/games/{game_id}/scenario", get(get_scenario))
        .route("/api/v1/games/{game_id}/events", get(get_events))
        .route(
            "/api/v1/games/{game_id}/commands",
            post(submit_command).get(get_commands),
        )
        .route("/api/v1/games/{game_id}/answer", post(submit_answer))
        .route("/api/v1/games/{game_id}/vote", post(submit_vote))
        .route("/api/v1/games/{game_id}/next_round", post(next_round))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests;
