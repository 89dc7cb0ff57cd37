/// Recommendation Engine
///
/// Orchestrates one recommendation pass: load persona and candidates from
/// the injected store, score, rank with diversification, then try to
/// upgrade the final items' explanations through the text-generation
/// collaborator. The pass never fails outright; the worst case is a
/// numeric-only, template-explained list.
use crate::config::EngineConfig;
use crate::models::{PassStats, Persona, RecommendationResponse, ScoredCandidate};
use crate::services::explain::Explainer;
use crate::services::ranking::Ranker;
use crate::services::scoring::{Scorer, ScoringContext};
use crate::store::ContentStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Per-request overrides for the configured ranking limits.
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    pub max_results: Option<usize>,
    pub max_per_category: Option<usize>,
    /// Pin the pass to a fixed instant (defaults to now)
    pub at: Option<DateTime<Utc>>,
}

pub struct RecommendationEngine {
    store: Arc<ContentStore>,
    scorer: Scorer,
    config: EngineConfig,
    explainer: Option<Explainer>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<ContentStore>, config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            scorer: Scorer::new(&config),
            store,
            config,
            explainer: None,
        }
    }

    /// Attach the text-generation collaborator. Without it, every
    /// explanation stays templated.
    pub fn with_explainer(mut self, explainer: Explainer) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Run one recommendation pass for a reader.
    pub async fn recommend(
        &self,
        user_id: Uuid,
        opts: RecommendOptions,
    ) -> Result<RecommendationResponse> {
        let persona = match self.store.get_persona(user_id).await {
            Some(persona) => persona,
            None => Persona::cold_start(user_id),
        };

        let candidates = self.store.list_articles().await;
        let peers = self.store.list_peers(user_id).await;

        let now = opts.at.unwrap_or_else(Utc::now);
        let ctx = ScoringContext::for_persona(&persona, now);

        let mut stats = PassStats {
            candidate_count: candidates.len(),
            ..Default::default()
        };

        let scored = self
            .scorer
            .score_candidates(&persona, &peers, &candidates, &ctx);
        stats.scored_count = scored.len();

        let max_results = opts.max_results.unwrap_or(self.config.ranking.max_results);
        let max_per_category = opts
            .max_per_category
            .unwrap_or(self.config.ranking.max_per_category);

        let ranker = Ranker::new(max_per_category);
        let ranked = ranker.rank(scored, max_results);
        stats.final_count = ranked.len();

        let items = self.explain_items(&persona, ranked, &mut stats).await;

        info!(
            user_id = %user_id,
            candidates = stats.candidate_count,
            scored = stats.scored_count,
            explained = stats.explained_count,
            fallbacks = stats.fallback_count,
            final_count = stats.final_count,
            "Recommendation pass complete"
        );

        Ok(RecommendationResponse { items, stats })
    }

    /// Upgrade explanations for the final slate only. Generation runs
    /// concurrently; any failure keeps the scoring-time template.
    async fn explain_items(
        &self,
        persona: &Persona,
        ranked: Vec<ScoredCandidate>,
        stats: &mut PassStats,
    ) -> Vec<ScoredCandidate> {
        let explainer = match &self.explainer {
            Some(explainer) => explainer,
            None => {
                stats.fallback_count = ranked.len();
                return ranked;
            }
        };

        let explanations = futures::future::join_all(
            ranked
                .iter()
                .map(|candidate| explainer.explain(persona, candidate)),
        )
        .await;

        ranked
            .into_iter()
            .zip(explanations)
            .map(|(mut candidate, explanation)| {
                if explanation.is_generated() {
                    stats.explained_count += 1;
                } else {
                    stats.fallback_count += 1;
                }
                candidate.explanation = explanation;
                candidate
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, ArticleAnalytics, Category};
    use chrono::TimeZone;

    fn article(id: &str, category: &str, views: u64, shares: u64) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            excerpt: String::new(),
            author: String::new(),
            category: Some(Category::named(category)),
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
            analytics: ArticleAnalytics {
                views,
                shares,
                ..Default::default()
            },
        }
    }

    async fn seeded_store() -> Arc<ContentStore> {
        let store = Arc::new(ContentStore::new());
        store.upsert_article(article("a", "tech", 1000, 10)).await;
        store.upsert_article(article("b", "tech", 100, 1)).await;
        store.upsert_article(article("c", "sports", 500, 5)).await;
        store
    }

    #[tokio::test]
    async fn test_worked_example_end_to_end() {
        let store = seeded_store().await;

        let mut config = EngineConfig::default();
        config.weights.personalized = 0.0;
        config.weights.trend = 1.0;
        config.weights.time_based = 0.0;
        let engine = RecommendationEngine::new(store, config);

        let opts = RecommendOptions {
            max_results: Some(2),
            max_per_category: Some(1),
            at: Some(Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()),
        };
        let response = engine.recommend(Uuid::new_v4(), opts).await.unwrap();

        let ids: Vec<&str> = response
            .items
            .iter()
            .map(|c| c.article_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(response.stats.candidate_count, 3);
        assert_eq!(response.stats.final_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_user_gets_cold_start_pass() {
        let store = seeded_store().await;
        let engine = RecommendationEngine::new(store, EngineConfig::default());

        let response = engine
            .recommend(Uuid::new_v4(), RecommendOptions::default())
            .await
            .unwrap();

        assert_eq!(response.items.len(), 3);
        // No explainer attached: everything falls back to templates
        assert_eq!(response.stats.fallback_count, 3);
        assert!(response.items.iter().all(|c| !c.explanation.is_generated()));
    }

    #[tokio::test]
    async fn test_empty_store_empty_response() {
        let store = Arc::new(ContentStore::new());
        let engine = RecommendationEngine::new(store, EngineConfig::default());

        let response = engine
            .recommend(Uuid::new_v4(), RecommendOptions::default())
            .await
            .unwrap();

        assert!(response.items.is_empty());
        assert_eq!(response.stats.candidate_count, 0);
    }

    #[tokio::test]
    async fn test_zero_max_results_override() {
        let store = seeded_store().await;
        let engine = RecommendationEngine::new(store, EngineConfig::default());

        let opts = RecommendOptions {
            max_results: Some(0),
            ..Default::default()
        };
        let response = engine.recommend(Uuid::new_v4(), opts).await.unwrap();
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_category_cap_applies_between_passes() {
        let store = seeded_store().await;
        let engine = RecommendationEngine::new(store, EngineConfig::default());

        let opts = RecommendOptions {
            max_per_category: Some(1),
            ..Default::default()
        };
        let response = engine.recommend(Uuid::new_v4(), opts).await.unwrap();

        let tech_count = response
            .items
            .iter()
            .filter(|c| c.category_name() == Some("tech"))
            .count();
        assert!(tech_count <= 1);
    }
}
