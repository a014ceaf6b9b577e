//! State export/import for backups and restarts.
//!
//! The whole in-memory store serializes to one JSON document. Content (question
//! sets) is not part of the snapshot; it is reloaded from its own file.

use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Schema version for export format compatibility
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// A serializable snapshot of every game, player, round and answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateExport {
    /// Schema version for forward compatibility
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub games: HashMap<GameId, Game>,
    /// Creation order is preserved
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    pub answers: Vec<Answer>,
}

impl GameStateExport {
    /// Check version and referential integrity before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        let player_games: HashMap<&str, &str> = self
            .players
            .iter()
            .map(|p| (p.id.as_str(), p.game_id.as_str()))
            .collect();
        let round_games: HashMap<&str, &str> = self
            .rounds
            .iter()
            .map(|r| (r.id.as_str(), r.game_id.as_str()))
            .collect();

        let mut codes = HashSet::new();
        for (game_id, game) in &self.games {
            if !codes.insert(game.code.as_str()) {
                return Err(format!("Join code '{}' is used by more than one game", game.code));
            }
            if let Some(ref host_id) = game.host_player_id {
                if player_games.get(host_id.as_str()) != Some(&game_id.as_str()) {
                    return Err(format!(
                        "Game '{}' references host player '{}' which doesn't exist in it",
                        game_id, host_id
                    ));
                }
            }
            if let Some(ref round_id) = game.current_round_id {
                if !round_games.contains_key(round_id.as_str()) {
                    return Err(format!(
                        "Game '{}' references current round '{}' which doesn't exist",
                        game_id, round_id
                    ));
                }
            }
        }

        for player in &self.players {
            if !self.games.contains_key(&player.game_id) {
                return Err(format!(
                    "Player '{}' references game '{}' which doesn't exist",
                    player.id, player.game_id
                ));
            }
        }

        for round in &self.rounds {
            if !self.games.contains_key(&round.game_id) {
                return Err(format!(
                    "Round '{}' references game '{}' which doesn't exist",
                    round.id, round.game_id
                ));
            }
        }

        let mut answered = HashSet::new();
        for answer in &self.answers {
            let Some(round_game) = round_games.get(answer.round_id.as_str()) else {
                return Err(format!(
                    "Answer '{}' references round '{}' which doesn't exist",
                    answer.id, answer.round_id
                ));
            };
            let Some(player_game) = player_games.get(answer.player_id.as_str()) else {
                return Err(format!(
                    "Answer '{}' references player '{}' which doesn't exist",
                    answer.id, answer.player_id
                ));
            };
            if round_game != player_game {
                return Err(format!(
                    "Answer '{}' pairs player '{}' with round '{}' of another game",
                    answer.id, answer.player_id, answer.round_id
                ));
            }
            if !answered.insert((answer.round_id.as_str(), answer.player_id.as_str())) {
                return Err(format!(
                    "Player '{}' answered round '{}' more than once",
                    answer.player_id, answer.round_id
                ));
            }
        }

        Ok(())
    }
}

impl AppState {
    /// Snapshot the full store
    pub async fn export_state(&self) -> GameStateExport {
        let games = self.games.read().await;
        let players = self.players.read().await;
        let rounds = self.rounds.read().await;
        let answers = self.answers.read().await;

        GameStateExport {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: self.clock.now(),
            games: games.clone(),
            players: players.clone(),
            rounds: rounds.clone(),
            answers: answers.clone(),
        }
    }

    /// Replace the full store with a validated snapshot
    pub async fn import_state(&self, export: GameStateExport) -> GameResult<()> {
        export.validate().map_err(GameError::Import)?;

        let mut games = self.games.write().await;
        let mut players = self.players.write().await;
        let mut rounds = self.rounds.write().await;
        let mut answers = self.answers.write().await;

        tracing::info!(
            "Importing state exported at {}: {} games, {} players, {} rounds, {} answers",
            export.exported_at,
            export.games.len(),
            export.players.len(),
            export.rounds.len(),
            export.answers.len()
        );

        *games = export.games;
        *players = export.players;
        *rounds = export.rounds;
        *answers = export.answers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::content::QuestionFilter;
    use crate::state::test_support::{correct_order, test_state};

    #[tokio::test]
    async fn test_export_import_restores_games() {
        let (state, _clock) = test_state();
        let (game, alice) = state.create_game(Some("Alice")).await.unwrap();
        let round = state
            .start_round(&game.id, QuestionFilter::default(), None)
            .await
            .unwrap();
        state
            .submit_answer(&round.id, &alice.id, correct_order())
            .await
            .unwrap();

        let json = serde_json::to_string_pretty(&state.export_state().await).unwrap();
        let parsed: GameStateExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);

        let (fresh, _clock) = test_state();
        fresh.import_state(parsed).await.unwrap();

        let restored = fresh.get_game_detail(&game.id).await.unwrap();
        assert_eq!(restored.game.code, game.code);
        assert_eq!(restored.players.len(), 1);
        assert_eq!(restored.leaderboard[0].total_score, 100);
        assert_eq!(fresh.find_game_by_code(&game.code).await.unwrap().id, game.id);
    }

    #[tokio::test]
    async fn test_validation_missing_round() {
        let (state, _clock) = test_state();
        let (game, _) = state.create_game(None).await.unwrap();

        let mut export = state.export_state().await;
        export
            .games
            .get_mut(&game.id)
            .unwrap()
            .current_round_id = Some("missing_round".to_string());

        let result = export.validate();
        assert!(result.unwrap_err().contains("doesn't exist"));
    }

    #[tokio::test]
    async fn test_validation_orphan_answer() {
        let (state, clock) = test_state();
        let mut export = state.export_state().await;
        export.answers.push(Answer {
            id: "a1".to_string(),
            round_id: "nowhere".to_string(),
            player_id: "nobody".to_string(),
            submitted_order: vec![],
            score: 0,
            submitted_at: clock.now(),
        });

        let err = state.import_state(export).await.unwrap_err();
        assert!(matches!(err, GameError::Import(_)));
    }

    #[tokio::test]
    async fn test_validation_rejects_duplicate_answers() {
        let (state, _clock) = test_state();
        let (game, alice) = state.create_game(Some("Alice")).await.unwrap();
        state.add_player(&game.id, Some("Bob")).await.unwrap();
        let round = state
            .start_round(&game.id, QuestionFilter::default(), None)
            .await
            .unwrap();
        state
            .submit_answer(&round.id, &alice.id, correct_order())
            .await
            .unwrap();

        let mut export = state.export_state().await;
        assert!(export.validate().is_ok());

        let mut repeat = export.answers[0].clone();
        repeat.id = "a2".to_string();
        export.answers.push(repeat);
        assert!(export.validate().unwrap_err().contains("more than once"));
    }

    #[tokio::test]
    async fn test_validation_rejects_cross_game_answers() {
        let (state, _clock) = test_state();
        let (game, alice) = state.create_game(Some("Alice")).await.unwrap();
        let (_, mallory) = state.create_game(Some("Mallory")).await.unwrap();
        let round = state
            .start_round(&game.id, QuestionFilter::default(), None)
            .await
            .unwrap();
        let answer = state
            .submit_answer(&round.id, &alice.id, correct_order())
            .await
            .unwrap();

        let mut export = state.export_state().await;
        export.answers[0] = Answer {
            player_id: mallory.id.clone(),
            ..answer
        };
        assert!(export.validate().unwrap_err().contains("another game"));
    }

    #[tokio::test]
    async fn test_validation_rejects_unknown_host() {
        let (state, _clock) = test_state();
        let (game, _) = state.create_game(Some("Alice")).await.unwrap();
        let (_, mallory) = state.create_game(Some("Mallory")).await.unwrap();

        let mut export = state.export_state().await;
        export.games.get_mut(&game.id).unwrap().host_player_id = Some("ghost".to_string());
        assert!(export.validate().unwrap_err().contains("host player"));

        // A host from a different game is rejected too
        export.games.get_mut(&game.id).unwrap().host_player_id = Some(mallory.id.clone());
        assert!(export.validate().unwrap_err().contains("host player"));
    }

    #[test]
    fn test_validation_future_schema() {
        let export = GameStateExport {
            schema_version: EXPORT_SCHEMA_VERSION + 1,
            exported_at: Utc::now(),
            games: HashMap::new(),
            players: Vec::new(),
            rounds: Vec::new(),
            answers: Vec::new(),
        };

        let result = export.validate();
        assert!(result.unwrap_err().contains("newer than supported"));
    }
}
