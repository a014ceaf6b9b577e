use crate::protocol::LeaderboardEntry;
use crate::state::AppState;
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// Number of positions where `submitted` agrees exactly with `correct`
pub fn position_matches(submitted: &[String], correct: &[String]) -> usize {
    submitted
        .iter()
        .zip(correct.iter())
        .filter(|(s, c)| s == c)
        .count()
}

/// Score a submitted ordering against the ground truth.
///
/// Each exactly matching position is worth [`POINTS_PER_POSITION`] regardless of how
/// many items were submitted. Duplicate or unknown titles simply never match.
pub fn score_order(submitted: &[String], correct: &[String]) -> u32 {
    if correct.is_empty() {
        return 0;
    }
    position_matches(submitted, correct) as u32 * POINTS_PER_POSITION
}

/// Sum answer scores per player over `round_ids`, highest total first.
/// Ties keep join order. Players without any answer are left out.
pub(super) fn build_leaderboard(
    players: &[Player],
    round_ids: &HashSet<&str>,
    answers: &[Answer],
) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for answer in answers
        .iter()
        .filter(|a| round_ids.contains(a.round_id.as_str()))
    {
        *totals.entry(answer.player_id.as_str()).or_insert(0) += answer.score;
    }

    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .filter_map(|p| {
            totals.get(p.id.as_str()).map(|total| LeaderboardEntry {
                player_id: p.id.clone(),
                total_score: *total,
                player: p.clone(),
            })
        })
        .collect();

    // Sort by total descending
    entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    entries
}

impl AppState {
    /// Cumulative leaderboard across all rounds of a game
    pub async fn get_leaderboard(&self, game_id: &str) -> Vec<LeaderboardEntry> {
        let players = self.players.read().await;
        let rounds = self.rounds.read().await;
        let answers = self.answers.read().await;

        let game_players: Vec<Player> = players
            .iter()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect();
        let round_ids: HashSet<&str> = rounds
            .iter()
            .filter(|r| r.game_id == game_id)
            .map(|r| r.id.as_str())
            .collect();

        build_leaderboard(&game_players, &round_ids, &answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_ground_truth_scores_zero() {
        assert_eq!(score_order(&titles(&["a", "b"]), &[]), 0);
        assert_eq!(score_order(&[], &[]), 0);
    }

    #[test]
    fn test_perfect_order_scores_full_marks() {
        let correct = titles(&["a", "b", "c", "d"]);
        assert_eq!(score_order(&correct, &correct), 100);

        let three = titles(&["a", "b", "c"]);
        assert_eq!(score_order(&three, &three), 75);
    }

    #[test]
    fn test_reversed_order_scores_zero() {
        let correct = titles(&["a", "b", "c", "d"]);
        let reversed: Vec<String> = correct.iter().rev().cloned().collect();
        assert_eq!(score_order(&reversed, &correct), 0);
    }

    #[test]
    fn test_fixed_point_still_scores() {
        let correct = titles(&["a", "b", "c", "d"]);
        // "b" stays at index 1
        assert_eq!(score_order(&titles(&["c", "b", "d", "a"]), &correct), 25);
    }

    #[test]
    fn test_per_position_constant_ignores_length() {
        let correct = titles(&["a", "b", "c", "d"]);
        assert_eq!(score_order(&titles(&["a", "b"]), &correct), 50);
        assert_eq!(
            score_order(&titles(&["a", "b", "c", "d", "e", "f"]), &correct),
            100
        );
    }

    #[test]
    fn test_duplicates_and_foreign_titles_are_non_matches() {
        let correct = titles(&["a", "b", "c", "d"]);
        assert_eq!(score_order(&titles(&["a", "a", "a", "a"]), &correct), 25);
        assert_eq!(score_order(&titles(&["x", "b", "y", "D"]), &correct), 25);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let correct = titles(&["Paris"]);
        assert_eq!(position_matches(&titles(&["paris"]), &correct), 0);
        assert_eq!(position_matches(&titles(&["Paris"]), &correct), 1);
    }

    #[test]
    fn test_build_leaderboard_sums_and_sorts() {
        let now = chrono::Utc::now();
        let player = |id: &str| Player {
            id: id.to_string(),
            game_id: "g".to_string(),
            name: id.to_uppercase(),
            is_host: false,
            joined_at: now,
        };
        let answer = |round: &str, player: &str, score: u32| Answer {
            id: ulid::Ulid::new().to_string(),
            round_id: round.to_string(),
            player_id: player.to_string(),
            submitted_order: vec![],
            score,
            submitted_at: now,
        };

        let players = vec![player("alice"), player("bob"), player("carol"), player("dave")];
        let answers = vec![
            answer("r1", "alice", 25),
            answer("r1", "bob", 100),
            answer("r2", "alice", 50),
            answer("r2", "carol", 75),
            // Another game's round must not count
            answer("other", "dave", 100),
        ];
        let round_ids: HashSet<&str> = ["r1", "r2"].into_iter().collect();

        let board = build_leaderboard(&players, &round_ids, &answers);
        let order: Vec<(&str, u32)> = board
            .iter()
            .map(|e| (e.player_id.as_str(), e.total_score))
            .collect();
        // alice and carol tie on 75 and keep join order
        assert_eq!(order, vec![("bob", 100), ("alice", 75), ("carol", 75)]);
    }
}
