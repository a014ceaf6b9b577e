use super::*;
use rand::seq::IndexedRandom;
use std::path::Path;

const STATUS_READY: &str = "ready";

fn default_status() -> String {
    STATUS_READY.to_string()
}

/// A question set as stored in the content file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSet {
    pub id: QuestionId,
    pub theme: String,
    pub year: i32,
    pub semester: Period,
    #[serde(default = "default_status")]
    pub status: String,
    pub articles: Vec<QuestionArticle>,
}

impl QuestionSet {
    fn is_eligible(&self, filter: &QuestionFilter) -> bool {
        self.status == STATUS_READY
            && is_playable(&self.articles)
            && filter.theme.as_ref().map_or(true, |t| *t == self.theme)
            && filter.year.map_or(true, |y| y == self.year)
            && filter.semester.map_or(true, |s| s == self.semester)
    }

    fn to_question(&self) -> Question {
        Question {
            id: self.id,
            theme: self.theme.clone(),
            year: self.year,
            semester: self.semester,
            articles: self.articles.clone(),
        }
    }
}

/// Content provider holding every question set in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    sets: Vec<QuestionSet>,
}

impl InMemoryContent {
    pub fn new(sets: Vec<QuestionSet>) -> Self {
        Self { sets }
    }

    pub fn from_json_str(json: &str) -> ContentResult<Self> {
        let sets: Vec<QuestionSet> = serde_json::from_str(json)?;
        Ok(Self::new(sets))
    }

    /// Load question sets from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> ContentResult<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let content = Self::from_json_str(&raw)?;
        tracing::info!(
            "Loaded {} question sets ({} playable) from {}",
            content.sets.len(),
            content.playable_count(),
            path.as_ref().display()
        );
        Ok(content)
    }

    /// Number of sets that could be served with no filter
    pub fn playable_count(&self) -> usize {
        let any = QuestionFilter::default();
        self.sets.iter().filter(|s| s.is_eligible(&any)).count()
    }
}

#[async_trait]
impl ContentProvider for InMemoryContent {
    async fn fetch_question(&self, filter: &QuestionFilter) -> ContentResult<Option<Question>> {
        let eligible: Vec<&QuestionSet> =
            self.sets.iter().filter(|s| s.is_eligible(filter)).collect();

        let picked = {
            let mut rng = rand::rng();
            eligible.choose(&mut rng).map(|s| s.to_question())
        };

        if picked.is_none() {
            tracing::debug!("No question set matches filter {:?}", filter);
        }
        Ok(picked)
    }

    async fn question_articles(&self, id: QuestionId) -> ContentResult<Vec<QuestionArticle>> {
        Ok(self
            .sets
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.articles.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn article(title: &str, avg: f64) -> QuestionArticle {
        QuestionArticle {
            title: title.to_string(),
            summary: Some(format!("About {}", title)),
            image_url: None,
            views_total: (avg * 180.0) as u64,
            views_avg_daily: avg,
        }
    }

    fn set(id: QuestionId, theme: &str, year: i32, semester: Period, n: usize) -> QuestionSet {
        QuestionSet {
            id,
            theme: theme.to_string(),
            year,
            semester,
            status: "ready".to_string(),
            articles: (0..n)
                .map(|i| article(&format!("{}-{}", theme, i), i as f64))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_filters_by_theme_year_and_semester() {
        let content = InMemoryContent::new(vec![
            set(1, "Cinema", 2023, Period::S1, 4),
            set(2, "Cinema", 2024, Period::S2, 4),
            set(3, "Sport", 2023, Period::S1, 4),
        ]);

        let filter = QuestionFilter {
            theme: Some("Cinema".to_string()),
            year: Some(2024),
            semester: None,
        };
        let q = content.fetch_question(&filter).await.unwrap().unwrap();
        assert_eq!(q.id, 2);
        assert_eq!(q.semester, Period::S2);

        let filter = QuestionFilter {
            theme: None,
            year: None,
            semester: Some(Period::S1),
        };
        for _ in 0..20 {
            let q = content.fetch_question(&filter).await.unwrap().unwrap();
            assert!(q.id == 1 || q.id == 3);
        }
    }

    #[tokio::test]
    async fn test_requires_exactly_four_articles_and_ready_status() {
        let mut draft = set(4, "Music", 2022, Period::S1, 4);
        draft.status = "draft".to_string();
        let content = InMemoryContent::new(vec![
            set(1, "Music", 2022, Period::S1, 3),
            set(2, "Music", 2022, Period::S1, 5),
            draft,
        ]);

        let filter = QuestionFilter {
            theme: Some("Music".to_string()),
            ..Default::default()
        };
        assert!(content.fetch_question(&filter).await.unwrap().is_none());
        assert_eq!(content.playable_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_theme_yields_none() {
        let content = InMemoryContent::new(vec![set(1, "Cinema", 2023, Period::S1, 4)]);
        let filter = QuestionFilter {
            theme: Some("Cooking".to_string()),
            ..Default::default()
        };
        assert!(content.fetch_question(&filter).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_question_articles_lookup() {
        let content = InMemoryContent::new(vec![set(7, "Cinema", 2023, Period::S1, 4)]);
        let articles = content.question_articles(7).await.unwrap();
        assert_eq!(articles.len(), 4);
        assert_eq!(articles[0].title, "Cinema-0");
        assert!(content.question_articles(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "theme": "Cinema", "year": 2023, "semester": "S2",
                 "articles": [
                   {{"title": "A", "views_total": 100, "views_avg_daily": 0.5}},
                   {{"title": "B", "views_total": 200, "views_avg_daily": 1.0}},
                   {{"title": "C", "views_total": 300, "views_avg_daily": 1.5}},
                   {{"title": "D", "views_total": 400, "views_avg_daily": 2.0}}
                 ]}}]"#
        )
        .unwrap();

        let content = InMemoryContent::load(file.path()).await.unwrap();
        assert_eq!(content.playable_count(), 1);

        let q = content
            .fetch_question(&QuestionFilter::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(q.theme, "Cinema");
        assert_eq!(q.articles.len(), 4);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let result = InMemoryContent::load(file.path()).await;
        assert!(matches!(result, Err(ContentError::Parse(_))));

        let missing = InMemoryContent::load("/nonexistent/questions.json").await;
        assert!(matches!(missing, Err(ContentError::Io(_))));
    }

    #[test]
    fn test_provider_name() {
        let content: Box<dyn ContentProvider> = Box::new(InMemoryContent::default());
        assert_eq!(content.name(), "memory");
    }
}
