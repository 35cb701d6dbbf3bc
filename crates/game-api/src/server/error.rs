#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn game_not_found(requested_game_id: &str, active_game_id: Option<&str>) -> Self {
        let details = active_game_id.map(|active| {
            format!("requested_game_id={requested_game_id} active_game_id={active}")
        });
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::GameNotFound,
                "game_id does not match an active game",
                details,
            ),
        }
    }

    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidQuery, message, details),
        }
    }

    fn invalid_command(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidCommand, message, details),
        }
    }

    fn from_api(error: ApiError) -> Self {
        let status = match error.error_code {
            ErrorCode::GameNotFound => StatusCode::NOT_FOUND,
            ErrorCode::PhaseConflict => StatusCode::CONFLICT,
            ErrorCode::InvalidCommand
            | ErrorCode::InvalidQuery
            | ErrorCode::InvalidConfig
            | ErrorCode::ContractVersionUnsupported => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
