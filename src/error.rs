//! Error type shared by the state services and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GameError {
    #[error("Game not found")]
    GameNotFound,

    #[error("Player not found")]
    PlayerNotFound,

    #[error("Round not found")]
    RoundNotFound,

    #[error("No question available with given filters")]
    NoQuestionAvailable,

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Time is up for this round")]
    DeadlinePassed,

    #[error("Player has already answered this round")]
    AlreadyAnswered,

    #[error("Player does not belong to this game")]
    PlayerNotInGame,

    #[error("Content store error: {0}")]
    Content(String),

    #[error("Import failed: {0}")]
    Import(String),
}

impl GameError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GameError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::GameNotFound
            | GameError::PlayerNotFound
            | GameError::RoundNotFound
            | GameError::NoQuestionAvailable => StatusCode::NOT_FOUND,
            GameError::Validation { .. } | GameError::PlayerNotInGame => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GameError::DeadlinePassed | GameError::AlreadyAnswered => StatusCode::CONFLICT,
            GameError::Import(_) => StatusCode::BAD_REQUEST,
            GameError::Content(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::content::ContentError> for GameError {
    fn from(e: crate::content::ContentError) -> Self {
        GameError::Content(e.to_string())
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = match &self {
            GameError::Validation { field, message } => json!({
                "message": message,
                "errors": { *field: [message] },
            }),
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
