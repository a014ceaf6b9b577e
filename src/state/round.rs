use super::score::{build_leaderboard, position_matches};
use super::AppState;
use crate::content::{order_ascending_by_popularity, QuestionFilter};
use crate::error::{GameError, GameResult};
use crate::protocol::{duration_out_of_range, AnswerView, ArticleStats, RoundView};
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Whether a round should end now: deadline reached, or everyone in the game answered
pub(super) fn is_complete(
    round: &Round,
    now: DateTime<Utc>,
    player_count: usize,
    answer_count: usize,
) -> bool {
    now >= round.deadline_at || (player_count > 0 && answer_count >= player_count)
}

/// End the round if it is complete. Returns true if this call ended it.
pub(super) fn finalize_if_complete(
    round: &mut Round,
    now: DateTime<Utc>,
    player_count: usize,
    answer_count: usize,
) -> bool {
    if round.status == RoundStatus::Ended || !is_complete(round, now, player_count, answer_count) {
        return false;
    }
    round.status = RoundStatus::Ended;
    round.ended_at = Some(now);
    true
}

impl AppState {
    /// Start a new round for a game from a random matching question set
    pub async fn start_round(
        &self,
        game_id: &str,
        filter: QuestionFilter,
        duration_seconds: Option<u32>,
    ) -> GameResult<Round> {
        let duration = duration_seconds.unwrap_or(self.config.default_round_seconds);
        if !(MIN_ROUND_SECONDS..=MAX_ROUND_SECONDS).contains(&duration) {
            return Err(duration_out_of_range());
        }

        // Fail fast before querying the content store
        self.get_game(game_id).await?;

        let question = self
            .content
            .fetch_question(&filter)
            .await?
            .ok_or(GameError::NoQuestionAvailable)?;

        let correct_order = order_ascending_by_popularity(&question.articles);
        let mut articles: Vec<String> = question.articles.iter().map(|a| a.title.clone()).collect();
        {
            let mut rng = rand::rng();
            articles.shuffle(&mut rng);
        }

        let now = self.clock.now();
        let mut games = self.games.write().await;
        let game = games.get_mut(game_id).ok_or(GameError::GameNotFound)?;
        let mut rounds = self.rounds.write().await;

        let number = rounds.iter().filter(|r| r.game_id == game_id).count() as u32 + 1;
        let round = Round {
            id: ulid::Ulid::new().to_string(),
            game_id: game.id.clone(),
            number,
            question_id: Some(question.id),
            status: RoundStatus::Active,
            theme: Some(question.theme),
            year: Some(question.year),
            semester: Some(question.semester),
            articles,
            correct_order,
            deadline_at: now + chrono::Duration::seconds(i64::from(duration)),
            started_at: now,
            ended_at: None,
        };
        rounds.push(round.clone());

        game.current_round_id = Some(round.id.clone());
        game.status = GameStatus::Running;

        tracing::info!(
            "Started round {} (#{}) of game {} with question {}, {}s",
            round.id,
            round.number,
            game_id,
            question.id,
            duration
        );
        Ok(round)
    }

    /// Get a round as stored, without re-evaluating completion
    pub async fn get_round(&self, round_id: &str) -> GameResult<Round> {
        self.rounds
            .read()
            .await
            .iter()
            .find(|r| r.id == round_id)
            .cloned()
            .ok_or(GameError::RoundNotFound)
    }

    /// Current (most recently started) round of a game
    pub async fn get_current_round(&self, game_id: &str) -> GameResult<Option<Round>> {
        let game = self.get_game(game_id).await?;
        match game.current_round_id {
            Some(round_id) => Ok(Some(self.get_round(&round_id).await?)),
            None => Ok(None),
        }
    }

    /// Re-evaluate completion of a round and end it if due. Idempotent.
    pub async fn finalize_round(&self, round_id: &str) -> GameResult<Round> {
        let now = self.clock.now();
        let players = self.players.read().await;
        let mut rounds = self.rounds.write().await;
        let answers = self.answers.read().await;

        let round = rounds
            .iter_mut()
            .find(|r| r.id == round_id)
            .ok_or(GameError::RoundNotFound)?;
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
        Ok(round.clone())
    }

    /// Round state as polled by clients: finalizes lazily, then assembles answers,
    /// the game leaderboard and the question's view statistics.
    pub async fn get_round_view(&self, round_id: &str) -> GameResult<RoundView> {
        let round = self.finalize_round(round_id).await?;

        let (answers, leaderboard, all_players_answered) = {
            let players = self.players.read().await;
            let rounds = self.rounds.read().await;
            let answers = self.answers.read().await;

            let game_players: Vec<Player> = players
                .iter()
                .filter(|p| p.game_id == round.game_id)
                .cloned()
                .collect();

            let round_answers: Vec<AnswerView> = answers
                .iter()
                .filter(|a| a.round_id == round.id)
                .map(|a| AnswerView {
                    player: game_players.iter().find(|p| p.id == a.player_id).cloned(),
                    player_id: a.player_id.clone(),
                    score: a.score,
                    matches: position_matches(&a.submitted_order, &round.correct_order),
                    submitted_order: a.submitted_order.clone(),
                })
                .collect();

            let round_ids: HashSet<&str> = rounds
                .iter()
                .filter(|r| r.game_id == round.game_id)
                .map(|r| r.id.as_str())
                .collect();
            let leaderboard = build_leaderboard(&game_players, &round_ids, &answers);

            let all_answered =
                !game_players.is_empty() && round_answers.len() >= game_players.len();

            (round_answers, leaderboard, all_answered)
        };

        let question_articles: Vec<ArticleStats> = match round.question_id {
            Some(id) => self
                .content
                .question_articles(id)
                .await?
                .into_iter()
                .map(ArticleStats::from)
                .collect(),
            None => Vec::new(),
        };

        Ok(RoundView {
            ended: round.status == RoundStatus::Ended,
            round,
            answers,
            leaderboard,
            all_players_answered,
            question_articles,
        })
    }
}
