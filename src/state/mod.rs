mod answer;
pub mod export;
mod game;
mod player;
mod round;
mod score;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::content::ContentProvider;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use player::generate_unique_code;
pub use score::{position_matches, score_order};

/// Shared application state
///
/// Players, rounds and answers are append-only and kept in creation order.
/// Locks are always taken in the order games → players → rounds → answers.
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<RwLock<HashMap<GameId, Game>>>,
    pub players: Arc<RwLock<Vec<Player>>>,
    pub rounds: Arc<RwLock<Vec<Round>>>,
    pub answers: Arc<RwLock<Vec<Answer>>>,
    /// Read-only trivia content store
    pub content: Arc<dyn ContentProvider>,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(content: Arc<dyn ContentProvider>) -> Self {
        Self::new_with_clock(content, Arc::new(SystemClock))
    }

    pub fn new_with_clock(content: Arc<dyn ContentProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            players: Arc::new(RwLock::new(Vec::new())),
            rounds: Arc::new(RwLock::new(Vec::new())),
            answers: Arc::new(RwLock::new(Vec::new())),
            content,
            clock,
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }
}
