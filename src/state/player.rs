use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;

/// Join codes are uppercase alphanumerics
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random join code
fn generate_join_code<R: Rng>(rng: &mut R) -> String {
    (0..JOIN_CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Draw join codes until one is not taken
pub fn generate_unique_code<R, F>(rng: &mut R, is_taken: F) -> String
where
    R: Rng,
    F: Fn(&str) -> bool,
{
    loop {
        let code = generate_join_code(rng);
        if !is_taken(&code) {
            return code;
        }
        // Collision - try again (36^6 codes, rare)
        tracing::debug!("Join code {} already in use, regenerating", code);
    }
}

/// Check a display name; `None` means the field was absent
pub(crate) fn validate_name(field: &'static str, name: Option<&str>) -> GameResult<Option<String>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(GameError::validation(
            field,
            format!(
                "The {} field must not be greater than {} characters.",
                field.replace('_', " "),
                MAX_NAME_CHARS
            ),
        ));
    }
    Ok(Some(name.to_string()))
}

impl AppState {
    /// Create a player record and attach it to `game_id`. The caller checks the game exists.
    pub(super) async fn insert_player(&self, game_id: &GameId, name: String, is_host: bool) -> Player {
        let player = Player {
            id: ulid::Ulid::new().to_string(),
            game_id: game_id.clone(),
            name,
            is_host,
            joined_at: self.clock.now(),
        };

        self.players.write().await.push(player.clone());
        player
    }

    /// Get player by id
    pub async fn get_player(&self, player_id: &str) -> GameResult<Player> {
        self.players
            .read()
            .await
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
            .ok_or(GameError::PlayerNotFound)
    }

    /// All players of a game, in join order
    pub async fn get_players(&self, game_id: &str) -> Vec<Player> {
        self.players
            .read()
            .await
            .iter()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect()
    }
}
