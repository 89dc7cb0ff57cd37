/// Feature Extraction Module
///
/// Derives bounded numeric feature vectors for articles and personas from
/// the candidate set. Vectors are aligned to a category vocabulary built
/// per pass and are recomputed on demand, never persisted.
use crate::models::{Article, Persona};
use chrono::{DateTime, Utc};

/// A fixed-shape feature vector with every dimension in 0..1.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        let values = values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Self { values }
    }

    pub fn zeros(dim: usize) -> Self {
        Self {
            values: vec![0.0; dim],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Cosine similarity in 0..1 (all dimensions are non-negative).
    ///
    /// A zero vector on either side yields 0.
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }

        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
    }
}

/// Engagement event weights for the article engagement feature.
///
/// Shares carry the most signal, then likes, then comments, then views.
const VIEW_WEIGHT: f32 = 1.0;
const LIKE_WEIGHT: f32 = 5.0;
const SHARE_WEIGHT: f32 = 10.0;
const COMMENT_WEIGHT: f32 = 3.0;

/// Builds article/persona vectors over the candidate set's categories.
///
/// Layout: [category one-hot/affinity (N), recency (1), engagement (1)]
pub struct FeatureExtractor {
    vocabulary: Vec<String>,
    trending_normalizer: f32,
    recency_decay_rate: f32,
}

impl FeatureExtractor {
    /// Build the category vocabulary from the candidate articles.
    ///
    /// The vocabulary is sorted so vector layout is stable for a given
    /// candidate set.
    pub fn from_candidates(
        articles: &[Article],
        trending_normalizer: f32,
        recency_decay_rate: f32,
    ) -> Self {
        let mut vocabulary: Vec<String> = articles
            .iter()
            .filter_map(|a| a.category_name().map(|c| c.to_string()))
            .collect();
        vocabulary.sort();
        vocabulary.dedup();

        Self {
            vocabulary,
            trending_normalizer: trending_normalizer.max(1.0),
            recency_decay_rate,
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .vocabulary
            .iter()
            .map(|c| format!("category:{}", c))
            .collect();
        names.push("recency".to_string());
        names.push("engagement".to_string());
        names
    }

    pub fn dim(&self) -> usize {
        self.vocabulary.len() + 2
    }

    /// Article embedding: category one-hot, recency decay, engagement.
    pub fn article_vector(&self, article: &Article, now: DateTime<Utc>) -> FeatureVector {
        let mut values = vec![0.0f32; self.dim()];

        if let Some(category) = article.category_name() {
            if let Ok(idx) = self.vocabulary.binary_search_by(|c| c.as_str().cmp(category)) {
                values[idx] = 1.0;
            }
        }

        let recency_idx = self.vocabulary.len();
        values[recency_idx] = self.recency_score(article.created_at, now);
        values[recency_idx + 1] = self.engagement_score(article);

        FeatureVector::new(values)
    }

    /// Persona semantic profile: per-category affinity.
    ///
    /// A persona with no interests has a zero profile, so the content term
    /// contributes nothing and scoring falls back to trending/context.
    pub fn persona_vector(&self, persona: &Persona) -> FeatureVector {
        if persona.interests.is_empty() {
            return FeatureVector::zeros(self.dim());
        }

        let mut values = vec![0.0f32; self.dim()];
        for (idx, category) in self.vocabulary.iter().enumerate() {
            if persona.interests.contains(category) {
                values[idx] = 1.0;
            }
        }

        let recency_idx = self.vocabulary.len();
        // Readers always prefer fresh content; engagement dimension tracks
        // how interactive this reader historically is.
        values[recency_idx] = 1.0;
        values[recency_idx + 1] = persona.engagement.engagement_rate.clamp(0.0, 1.0);

        FeatureVector::new(values)
    }

    /// Exponential recency decay: e^(-rate * age_hours), floored at 0.
    fn recency_score(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
        let age_hours = (now - created_at).num_minutes().max(0) as f32 / 60.0;
        (-self.recency_decay_rate * age_hours).exp()
    }

    /// Weighted engagement normalized into 0..1.
    fn engagement_score(&self, article: &Article) -> f32 {
        let analytics = &article.analytics;
        let raw = analytics.views as f32 * VIEW_WEIGHT
            + analytics.likes as f32 * LIKE_WEIGHT
            + analytics.shares as f32 * SHARE_WEIGHT
            + analytics.comments as f32 * COMMENT_WEIGHT;
        (raw / self.trending_normalizer).min(1.0)
    }
}
