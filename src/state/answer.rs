use super::round::finalize_if_complete;
use super::score::score_order;
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;

impl AppState {
    /// Record a player's ordering for a round, score it and end the round if this was
    /// the last missing answer.
    ///
    /// Insert and completion check happen under the same locks so concurrent
    /// submissions can't both miss the threshold.
    pub async fn submit_answer(
        &self,
        round_id: &str,
        player_id: &str,
        submitted_order: Vec<String>,
    ) -> GameResult<Answer> {
        if submitted_order.is_empty() {
            return Err(GameError::validation(
                "submitted_order",
                "The submitted order field is required.",
            ));
        }

        let now = self.clock.now();
        let players = self.players.read().await;
        let mut rounds = self.rounds.write().await;
        let mut answers = self.answers.write().await;

        let round = rounds
            .iter_mut()
            .find(|r| r.id == round_id)
            .ok_or(GameError::RoundNotFound)?;
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;

        if player.game_id != round.game_id {
            return Err(GameError::PlayerNotInGame);
        }
        if now > round.deadline_at {
            tracing::debug!(
                "Rejected late answer from {} for round {}",
                player_id,
                round_id
            );
            return Err(GameError::DeadlinePassed);
        }
        if answers
            .iter()
            .any(|a| a.round_id == round_id && a.player_id == player_id)
        {
            return Err(GameError::AlreadyAnswered);
        }

        let answer = Answer {
            id: ulid::Ulid::new().to_string(),
            round_id: round.id.clone(),
            player_id: player.id.clone(),
            score: score_order(&submitted_order, &round.correct_order),
            submitted_order,
            submitted_at: now,
        };
        answers.push(answer.clone());

        tracing::info!(
            "Player {} answered round {} (score {})",
            player.name,
            round_id,
            answer.score
        );

        let player_count = players.iter().filter(|p| p.game_id == round.game_id).count();
        let answer_count = answers.iter().filter(|a| a.round_id == round_id).count();
        if finalize_if_complete(round, now, player_count, answer_count) {
            tracing::info!(
                "Round {} ended ({} of {} players answered)",
                round_id,
                answer_count,
                player_count
            );
        }

        Ok(answer)
    }

    /// Answers of a round, in submission order
    pub async fn get_answers(&self, round_id: &str) -> Vec<Answer> {
        self.answers
            .read()
            .await
            .iter()
            .filter(|a| a.round_id == round_id)
            .cloned()
            .collect()
    }
}
