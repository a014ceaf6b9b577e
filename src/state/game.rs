use super::player::{generate_unique_code, validate_name};
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::GameDetail;
use crate::types::*;

const DEFAULT_HOST_NAME: &str = "Host";

impl AppState {
    /// Create a game in `waiting` status together with its host player
    pub async fn create_game(&self, host_name: Option<&str>) -> GameResult<(Game, Player)> {
        let host_name = validate_name("host_name", host_name)?
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string());

        let mut games = self.games.write().await;

        // Code is drawn while holding the write lock so two creations can't collide
        let code = {
            let mut rng = rand::rng();
            generate_unique_code(&mut rng, |c| games.values().any(|g| g.code == c))
        };

        let game_id = ulid::Ulid::new().to_string();
        let host = self.insert_player(&game_id, host_name, true).await;

        let game = Game {
            id: game_id.clone(),
            code,
            status: GameStatus::Waiting,
            host_player_id: Some(host.id.clone()),
            current_round_id: None,
            created_at: self.clock.now(),
        };
        games.insert(game_id, game.clone());

        tracing::info!(
            "Created game {} (code {}) hosted by {}",
            game.id,
            game.code,
            host.name
        );
        Ok((game, host))
    }

    /// Get a game by id
    pub async fn get_game(&self, game_id: &str) -> GameResult<Game> {
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or(GameError::GameNotFound)
    }

    /// Look up a game by join code (case-insensitive)
    pub async fn find_game_by_code(&self, code: &str) -> GameResult<Game> {
        let code = code.trim().to_uppercase();
        self.games
            .read()
            .await
            .values()
            .find(|g| g.code == code)
            .cloned()
            .ok_or(GameError::GameNotFound)
    }

    /// Add a non-host player to a game
    pub async fn add_player(&self, game_id: &str, name: Option<&str>) -> GameResult<Player> {
        let name = validate_name("name", name)?
            .ok_or_else(|| GameError::validation("name", "The name field is required."))?;

        // Hold the games lock so the game can't be replaced by an import meanwhile
        let games = self.games.read().await;
        let game = games.get(game_id).ok_or(GameError::GameNotFound)?;
        let player = self.insert_player(&game.id, name, false).await;
        drop(games);

        tracing::info!("Player {} ({}) joined game {}", player.name, player.id, game_id);
        Ok(player)
    }

    /// Join a game by its join code
    pub async fn join_game(
        &self,
        code: Option<&str>,
        name: Option<&str>,
    ) -> GameResult<(Game, Player)> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GameError::validation("code", "The code field is required."))?;
        if code.chars().count() != JOIN_CODE_LENGTH {
            return Err(GameError::validation(
                "code",
                format!("The code field must be {} characters.", JOIN_CODE_LENGTH),
            ));
        }

        let game = self.find_game_by_code(code).await?;
        let player = self.add_player(&game.id, name).await?;
        Ok((game, player))
    }

    /// Game with its players, rounds (newest first), current round and leaderboard.
    /// Read-only: round statuses are reported as last stored.
    pub async fn get_game_detail(&self, game_id: &str) -> GameResult<GameDetail> {
        let game = self.get_game(game_id).await?;
        let players = self.get_players(game_id).await;

        let rounds: Vec<Round> = self
            .rounds
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();

        let current_round = game
            .current_round_id
            .as_ref()
            .and_then(|id| rounds.iter().find(|r| &r.id == id).cloned());

        let leaderboard = self.get_leaderboard(game_id).await;

        Ok(GameDetail {
            game,
            players,
            rounds,
            current_round,
            leaderboard,
        })
    }
}
