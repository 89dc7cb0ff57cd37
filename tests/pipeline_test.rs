use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sabq_recsys::services::explain::{ExplainError, Explainer, TextGenerator};
use sabq_recsys::{
    Article, ArticleAnalytics, Category, ContentStore, EngineConfig, Persona, RecommendOptions,
    RecommendationEngine,
};
use std::sync::Arc;
use uuid::Uuid;

/// Collaborator that always rejects, for the degradation scenario.
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _json_mode: bool) -> Result<String, ExplainError> {
        Err(ExplainError::RequestFailed("always down".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Collaborator that returns a fixed well-formed payload.
struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str, _json_mode: bool) -> Result<String, ExplainError> {
        Ok(r#"{"summary": "Picked for your interests", "factors": ["content match"]}"#.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sabq_recsys=debug")
        .with_test_writer()
        .try_init();
}

fn article(id: &str, category: &str, views: u64, shares: u64, age_hours: i64) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Story {}", id),
        excerpt: "…".to_string(),
        author: "desk".to_string(),
        category: Some(Category::named(category)),
        created_at: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()
            - Duration::hours(age_hours),
        analytics: ArticleAnalytics {
            views,
            shares,
            ..Default::default()
        },
    }
}

async fn seeded_store(articles: Vec<Article>) -> Arc<ContentStore> {
    let store = Arc::new(ContentStore::new());
    for a in articles {
        store.upsert_article(a).await;
    }
    store
}

#[tokio::test]
async fn test_graceful_degradation_with_failing_collaborator() {
    init_tracing();

    // 5 articles, zero-interest persona, collaborator always rejects:
    // still 5 scored candidates, numeric scores, templated explanations.
    let store = seeded_store(vec![
        article("a", "tech", 900, 9, 1),
        article("b", "tech", 800, 8, 2),
        article("c", "sports", 700, 7, 3),
        article("d", "economy", 600, 6, 4),
        article("e", "culture", 500, 5, 5),
    ])
    .await;

    let user_id = Uuid::new_v4();
    store.upsert_persona(Persona::cold_start(user_id)).await;

    let explainer = Explainer::new(Arc::new(FailingGenerator), "none".to_string());
    let engine =
        RecommendationEngine::new(store, EngineConfig::default()).with_explainer(explainer);

    let response = engine
        .recommend(user_id, RecommendOptions::default())
        .await
        .expect("pass must not fail");

    assert_eq!(response.items.len(), 5);
    assert_eq!(response.stats.fallback_count, 5);
    assert_eq!(response.stats.explained_count, 0);
    for item in &response.items {
        assert!((0.0..=1.0).contains(&item.score));
        assert!((0.0..=1.0).contains(&item.confidence));
        assert!(!item.explanation.text().is_empty());
        assert!(!item.explanation.is_generated());
    }
}

#[tokio::test]
async fn test_happy_path_with_generated_explanations() {
    let store = seeded_store(vec![
        article("a", "tech", 2000, 40, 1),
        article("b", "sports", 300, 2, 6),
    ])
    .await;

    let user_id = Uuid::new_v4();
    let mut persona = Persona::cold_start(user_id);
    persona.interests.insert("tech".to_string());
    store.upsert_persona(persona).await;

    let explainer = Explainer::new(Arc::new(CannedGenerator), "canned-model".to_string());
    let engine =
        RecommendationEngine::new(store, EngineConfig::default()).with_explainer(explainer);

    let response = engine
        .recommend(user_id, RecommendOptions::default())
        .await
        .unwrap();

    assert_eq!(response.items.len(), 2);
    assert_eq!(response.stats.explained_count, 2);
    assert!(response.items.iter().all(|i| i.explanation.is_generated()));
    // The tech story dominates on both content match and trending
    assert_eq!(response.items[0].article_id, "a");
}

#[tokio::test]
async fn test_repeated_passes_are_identical_modulo_explanation() {
    let store = seeded_store(vec![
        article("a", "tech", 1000, 10, 1),
        article("b", "tech", 100, 1, 2),
        article("c", "sports", 500, 5, 3),
    ])
    .await;

    let user_id = Uuid::new_v4();
    let mut persona = Persona::cold_start(user_id);
    persona.interests.insert("sports".to_string());
    store.upsert_persona(persona).await;

    let engine = RecommendationEngine::new(store, EngineConfig::default());
    let opts = RecommendOptions {
        at: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()),
        ..Default::default()
    };

    let first = engine.recommend(user_id, opts.clone()).await.unwrap();
    let second = engine.recommend(user_id, opts).await.unwrap();

    assert_eq!(first.items.len(), second.items.len());
    for (a, b) in first.items.iter().zip(second.items.iter()) {
        assert_eq!(a.article_id, b.article_id);
        assert_eq!(a.score, b.score);
        assert_eq!(a.confidence, b.confidence);
    }
}

#[tokio::test]
async fn test_engagement_updates_shift_trending_order() {
    let store = seeded_store(vec![
        article("a", "tech", 100, 1, 1),
        article("b", "sports", 100, 1, 1),
    ])
    .await;

    let mut config = EngineConfig::default();
    config.weights.personalized = 0.0;
    config.weights.trend = 1.0;
    config.weights.time_based = 0.0;
    let engine = RecommendationEngine::new(store.clone(), config);

    let user_id = Uuid::new_v4();
    let at = Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap());
    let opts = RecommendOptions {
        at,
        ..Default::default()
    };

    // Massive engagement burst on "b"
    store.record_engagement("b", 5000, 0, 200, 0).await;

    let response = engine.recommend(user_id, opts).await.unwrap();
    assert_eq!(response.items[0].article_id, "b");
    assert!(response.items[0].score > response.items[1].score);
}
