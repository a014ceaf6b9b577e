//! Trivia content store: themed sets of four ranked articles.
//!
//! The store is read-only from the game's point of view. Rounds pick one eligible
//! question set at random and derive their ground truth from its view statistics.

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Period, QuestionId, ITEMS_PER_ROUND};

pub use memory::{InMemoryContent, QuestionSet};

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors that can occur while loading or querying content
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Optional filters applied when picking a question set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFilter {
    pub theme: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<Period>,
}

/// One article of a question set together with its view statistics for the period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionArticle {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub views_total: u64,
    pub views_avg_daily: f64,
}

/// A question ready to be played as a round
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub theme: String,
    pub year: i32,
    pub semester: Period,
    pub articles: Vec<QuestionArticle>,
}

/// Source of question sets
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Pick a random ready question set with exactly four articles matching `filter`.
    /// Returns `None` when nothing matches.
    async fn fetch_question(&self, filter: &QuestionFilter) -> ContentResult<Option<Question>>;

    /// Articles of a question set, in stored order. Empty when the id is unknown.
    async fn question_articles(&self, id: QuestionId) -> ContentResult<Vec<QuestionArticle>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Titles sorted by average daily views, least popular first.
///
/// Stable: articles with equal averages keep their input order.
pub fn order_ascending_by_popularity(articles: &[QuestionArticle]) -> Vec<String> {
    let mut sorted: Vec<&QuestionArticle> = articles.iter().collect();
    sorted.sort_by(|a, b| a.views_avg_daily.total_cmp(&b.views_avg_daily));
    sorted.into_iter().map(|a| a.title.clone()).collect()
}

/// Whether a question set can be served as a round
pub(crate) fn is_playable(articles: &[QuestionArticle]) -> bool {
    articles.len() == ITEMS_PER_ROUND
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, avg: f64) -> QuestionArticle {
        QuestionArticle {
            title: title.to_string(),
            summary: None,
            image_url: None,
            views_total: (avg * 181.0) as u64,
            views_avg_daily: avg,
        }
    }

    #[test]
    fn test_orders_ascending() {
        let articles = vec![
            article("pop10", 10.0),
            article("pop5", 5.0),
            article("pop20", 20.0),
            article("pop1", 1.0),
        ];
        assert_eq!(
            order_ascending_by_popularity(&articles),
            vec!["pop1", "pop5", "pop10", "pop20"]
        );
    }

    #[test]
    fn test_order_is_stable_for_ties() {
        let articles = vec![
            article("b", 3.0),
            article("a", 3.0),
            article("low", 0.5),
            article("c", 3.0),
        ];
        assert_eq!(
            order_ascending_by_popularity(&articles),
            vec!["low", "b", "a", "c"]
        );
    }

    #[test]
    fn test_order_of_empty_set() {
        assert!(order_ascending_by_popularity(&[]).is_empty());
    }
}
