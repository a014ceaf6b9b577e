//! JSON bodies of the HTTP API.

use crate::content::{QuestionArticle, QuestionFilter};
use crate::error::{GameError, GameResult};
use crate::types::*;
use serde::{de, Deserialize, Deserializer, Serialize};

// ========== Requests ==========

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinGameRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddPlayerRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRoundRequest {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "integer_or_numeric_string")]
    pub year: Option<i32>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
}

impl StartRoundRequest {
    /// Split into content filter and requested duration, rejecting malformed fields
    pub fn into_parts(self) -> GameResult<(QuestionFilter, Option<u32>)> {
        let theme = self
            .theme
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let semester = match self.semester.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(Period::parse(s).ok_or_else(|| {
                GameError::validation("semester", "The selected semester is invalid.")
            })?),
        };

        let duration_seconds = match self.duration_seconds {
            None => None,
            Some(secs) => Some(u32::try_from(secs).map_err(|_| duration_out_of_range())?),
        };

        Ok((
            QuestionFilter {
                theme,
                year: self.year,
                semester,
            },
            duration_seconds,
        ))
    }
}

/// Accept `2023` as well as `"2023"`; a blank string counts as absent
fn integer_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("year must be an integer, got \"{}\"", s))),
    }
}

pub(crate) fn duration_out_of_range() -> GameError {
    GameError::validation(
        "duration_seconds",
        format!(
            "The duration seconds field must be between {} and {}.",
            MIN_ROUND_SECONDS, MAX_ROUND_SECONDS
        ),
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub submitted_order: Option<Vec<String>>,
}

// ========== Responses ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game: Game,
    pub host_player: Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameResponse {
    pub game: Game,
    pub player: Player,
}

/// Cumulative score of one player across all rounds of a game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub total_score: u32,
    pub player: Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub players: Vec<Player>,
    /// Newest first
    pub rounds: Vec<Round>,
    pub current_round: Option<Round>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// An answer as shown after a round, with its position matches recomputed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    pub player: Option<Player>,
    pub player_id: PlayerId,
    pub score: u32,
    pub matches: usize,
    pub submitted_order: Vec<String>,
}

/// View statistics of one article of a round's question set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleStats {
    pub title: String,
    pub views_total: u64,
    pub views_avg_daily: f64,
}

impl From<QuestionArticle> for ArticleStats {
    fn from(a: QuestionArticle) -> Self {
        Self {
            title: a.title,
            views_total: a.views_total,
            views_avg_daily: a.views_avg_daily,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundView {
    pub round: Round,
    pub answers: Vec<AnswerView>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub ended: bool,
    #[serde(rename = "allPlayersAnswered")]
    pub all_players_answered: bool,
    pub question_articles: Vec<ArticleStats>,
}
