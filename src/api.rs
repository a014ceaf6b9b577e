//! HTTP API endpoints.
//!
//! Clients poll `GET /rounds/{round}` every few seconds; every state change happens
//! inside one of these request handlers.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::{GameError, GameResult};
use crate::protocol::*;
use crate::state::export::GameStateExport;
use crate::state::AppState;
use crate::types::{Answer, Player, Round};

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", post(create_game))
        .route("/games/join", post(join_game))
        .route("/games/{game}", get(show_game))
        .route("/games/{game}/players", post(add_player))
        .route("/games/{game}/rounds", post(start_round))
        .route("/rounds/{round}", get(show_round))
        .route("/rounds/{round}/answers", post(submit_answer))
        .route("/api/state/export", get(export_state))
        .route("/api/state/import", post(import_state))
        .with_state(state)
}

/// Unwrap a JSON body, reporting malformed payloads as validation errors
fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> GameResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| GameError::validation("body", rejection.body_text()))
}

/// Parse a body whose fields are all optional; an empty body means all defaults
fn optional_body<T: DeserializeOwned + Default>(bytes: &Bytes) -> GameResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(|e| GameError::validation("body", e.to_string()))
}

async fn health() -> &'static str {
    "ok"
}

/// POST /games
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    payload: Bytes,
) -> GameResult<(StatusCode, Json<CreateGameResponse>)> {
    let req: CreateGameRequest = optional_body(&payload)?;
    let (game, host_player) = state.create_game(req.host_name.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse { game, host_player }),
    ))
}

/// POST /games/join
pub async fn join_game(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JoinGameRequest>, JsonRejection>,
) -> GameResult<(StatusCode, Json<JoinGameResponse>)> {
    let req = body(payload)?;
    let (game, player) = state
        .join_game(req.code.as_deref(), req.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(JoinGameResponse { game, player })))
}

/// GET /games/{game}
pub async fn show_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> GameResult<Json<GameDetail>> {
    Ok(Json(state.get_game_detail(&game_id).await?))
}

/// POST /games/{game}/players
pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    payload: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> GameResult<(StatusCode, Json<Player>)> {
    let req = body(payload)?;
    let player = state.add_player(&game_id, req.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// POST /games/{game}/rounds
///
/// 404 with `{message}` when no question set matches the filters.
pub async fn start_round(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    payload: Bytes,
) -> GameResult<(StatusCode, Json<Round>)> {
    let req: StartRoundRequest = optional_body(&payload)?;
    let (filter, duration_seconds) = req.into_parts()?;
    let round = state.start_round(&game_id, filter, duration_seconds).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

/// GET /rounds/{round}
pub async fn show_round(
    State(state): State<Arc<AppState>>,
    Path(round_id): Path<String>,
) -> GameResult<Json<RoundView>> {
    Ok(Json(state.get_round_view(&round_id).await?))
}

/// POST /rounds/{round}/answers
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(round_id): Path<String>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> GameResult<(StatusCode, Json<Answer>)> {
    let req = body(payload)?;
    let player_id = req
        .player_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| GameError::validation("player_id", "The player id field is required."))?;
    let submitted_order = req.submitted_order.unwrap_or_default();

    let answer = state
        .submit_answer(&round_id, &player_id, submitted_order)
        .await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

/// Export the entire game state as JSON.
///
/// GET /api/state/export
pub async fn export_state(State(state): State<Arc<AppState>>) -> Json<GameStateExport> {
    Json(state.export_state().await)
}

/// Import a game state snapshot, replacing all current state.
///
/// POST /api/state/import
pub async fn import_state(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GameStateExport>, JsonRejection>,
) -> Response {
    let result = match body(payload) {
        Ok(export) => state.import_state(export).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => (StatusCode::OK, "State imported successfully").into_response(),
        Err(e) => {
            tracing::error!("State import failed: {}", e);
            e.into_response()
        }
    }
}
