use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;
pub type RoundId = String;
pub type AnswerId = String;
pub type QuestionId = u64;

/// Length of a game's join code
pub const JOIN_CODE_LENGTH: usize = 6;

/// Round duration bounds (seconds)
pub const MIN_ROUND_SECONDS: u32 = 10;
pub const MAX_ROUND_SECONDS: u32 = 300;
pub const DEFAULT_ROUND_SECONDS: u32 = 60;

/// Every round ranks exactly this many items
pub const ITEMS_PER_ROUND: usize = 4;

/// Points per correctly placed item (100 / ITEMS_PER_ROUND)
pub const POINTS_PER_POSITION: u32 = 25;

/// Maximum length of a player display name
pub const MAX_NAME_CHARS: usize = 255;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Pending,
    Active,
    Ended,
}

/// Half-year period a question set's view statistics cover
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Period {
    S1,
    S2,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S1" => Some(Period::S1),
            "S2" => Some(Period::S2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub code: String,
    pub status: GameStatus,
    pub host_player_id: Option<PlayerId>,
    pub current_round_id: Option<RoundId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub game_id: GameId,
    pub name: String,
    pub is_host: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub game_id: GameId,
    /// 1-based position of this round within its game
    pub number: u32,
    pub question_id: Option<QuestionId>,
    pub status: RoundStatus,
    pub theme: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<Period>,
    /// Item titles as presented to players
    pub articles: Vec<String>,
    /// Ground truth, ascending by popularity
    pub correct_order: Vec<String>,
    pub deadline_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: AnswerId,
    pub round_id: RoundId,
    pub player_id: PlayerId,
    pub submitted_order: Vec<String>,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}
