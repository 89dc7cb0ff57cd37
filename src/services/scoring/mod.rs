/// Candidate Scoring Module
///
/// Combines the per-strategy signals into one weighted score per article.
/// Scoring is deterministic given the persona, peer sample, candidates,
/// weights, and context; it never awaits the text-generation collaborator.
mod strategies;

pub use strategies::{
    CollaborativeStrategy, ContentSimilarityStrategy, ContextualStrategy, ScoringStrategy,
    TrendingStrategy,
};

use crate::config::{ConfidenceConfig, EngineConfig, ScoringWeights};
use crate::models::{
    Article, Explanation, Persona, ScoreBreakdown, ScoredCandidate, StrategyKind, TimeSlot,
};
use crate::services::features::FeatureExtractor;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Frozen inputs that make one scoring pass reproducible.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext {
    pub now: DateTime<Utc>,
    pub time_slot: TimeSlot,
}

impl ScoringContext {
    /// Context for a persona scored "now": the slot comes from the
    /// persona's stored time-of-day setting.
    pub fn for_persona(persona: &Persona, now: DateTime<Utc>) -> Self {
        Self {
            now,
            time_slot: persona.time_slot,
        }
    }
}

pub struct Scorer {
    weights: ScoringWeights,
    confidence: ConfidenceConfig,
    trending_normalizer: f32,
    recency_decay_rate: f32,
    peer_sample_size: usize,
}

impl Scorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights.clamped(),
            confidence: config.scoring.confidence.clone(),
            trending_normalizer: config.scoring.trending_normalizer,
            recency_decay_rate: config.scoring.recency_decay_rate,
            peer_sample_size: config.scoring.peer_sample_size,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score every candidate for this persona.
    ///
    /// Empty candidate list returns an empty vec. Explanations are filled
    /// with the deterministic template; the engine may upgrade them later.
    pub fn score_candidates(
        &self,
        persona: &Persona,
        peers: &[Persona],
        articles: &[Article],
        ctx: &ScoringContext,
    ) -> Vec<ScoredCandidate> {
        if articles.is_empty() {
            return Vec::new();
        }

        let peer_sample: Vec<Persona> = peers
            .iter()
            .take(self.peer_sample_size)
            .cloned()
            .collect();

        let extractor = FeatureExtractor::from_candidates(
            articles,
            self.trending_normalizer,
            self.recency_decay_rate,
        );

        let strategies: [Box<dyn ScoringStrategy>; 4] = [
            Box::new(CollaborativeStrategy::new(peer_sample)),
            Box::new(ContentSimilarityStrategy::new(extractor)),
            Box::new(TrendingStrategy::new(self.trending_normalizer)),
            Box::new(ContextualStrategy),
        ];

        let scored: Vec<ScoredCandidate> = articles
            .iter()
            .map(|article| self.score_one(persona, article, &strategies, ctx))
            .collect();

        debug!(
            user_id = %persona.user_id,
            candidate_count = articles.len(),
            top_score = scored
                .iter()
                .map(|c| c.score)
                .fold(f32::MIN, f32::max),
            "Scoring complete"
        );

        scored
    }

    fn score_one(
        &self,
        persona: &Persona,
        article: &Article,
        strategies: &[Box<dyn ScoringStrategy>; 4],
        ctx: &ScoringContext,
    ) -> ScoredCandidate {
        let mut breakdown = ScoreBreakdown::default();
        for strategy in strategies {
            let value = strategy.score(persona, article, ctx).clamp(0.0, 1.0);
            match strategy.kind() {
                StrategyKind::Collaborative => breakdown.collaborative = value,
                StrategyKind::ContentSimilarity => breakdown.content = value,
                StrategyKind::Trending => breakdown.trending = value,
                StrategyKind::Contextual => breakdown.contextual = value,
            }
        }

        let score = breakdown.combined(&self.weights);
        let dominant = breakdown.dominant(&self.weights);
        let confidence = self.confidence_for(dominant);
        let explanation =
            Explanation::Template(template_explanation(persona, article, dominant));

        ScoredCandidate {
            article_id: article.id.clone(),
            title: article.title.clone(),
            category: article.category.clone(),
            score,
            confidence,
            breakdown,
            explanation,
        }
    }

    fn confidence_for(&self, kind: StrategyKind) -> f32 {
        let value = match kind {
            StrategyKind::Collaborative => self.confidence.collaborative,
            StrategyKind::ContentSimilarity => self.confidence.content,
            StrategyKind::Trending => self.confidence.trending,
            StrategyKind::Contextual => self.confidence.contextual,
        };
        value.clamp(0.0, 1.0)
    }
}

/// Deterministic explanation used when the collaborator is unavailable.
pub fn template_explanation(persona: &Persona, article: &Article, dominant: StrategyKind) -> String {
    let category = article.category_name().unwrap_or("general");
    match dominant {
        StrategyKind::Collaborative => format!(
            "Readers with interests similar to yours engaged with this {} story.",
            category
        ),
        StrategyKind::ContentSimilarity => format!(
            "Matches your interest in {} and your recent reading profile.",
            category
        ),
        StrategyKind::Trending => format!(
            "Trending now in {}: widely viewed and shared in the last hours.",
            category
        ),
        StrategyKind::Contextual => format!(
            "A {} pick for your {} reading session.",
            category,
            persona.time_slot.as_str()
        ),
    }
}
