use super::ScoringContext;
use crate::models::{Article, Persona, StrategyKind, TimeSlot};
use crate::services::features::FeatureExtractor;

/// One sub-model contributing a raw 0..1 signal per candidate.
pub trait ScoringStrategy: Send + Sync {
    fn score(&self, persona: &Persona, article: &Article, ctx: &ScoringContext) -> f32;
    fn kind(&self) -> StrategyKind;
}

/// Collaborative strategy: averages peer affinity weighted by how similar
/// each peer's interests are to the requesting persona.
///
/// score = mean(jaccard(persona, peer) * peer_affinity(article)) over the
/// peer sample. No peers, or no interest overlap, yields 0.
pub struct CollaborativeStrategy {
    peers: Vec<Persona>,
}

impl CollaborativeStrategy {
    /// `peers` must already be a deterministic sample (the store returns
    /// them ordered by user id).
    pub fn new(peers: Vec<Persona>) -> Self {
        Self { peers }
    }

    fn jaccard(a: &Persona, b: &Persona) -> f32 {
        if a.interests.is_empty() || b.interests.is_empty() {
            return 0.0;
        }
        let intersection = a.interests.intersection(&b.interests).count();
        let union = a.interests.union(&b.interests).count();
        intersection as f32 / union as f32
    }

    /// How much a peer cares about this article's category, 0..1.
    ///
    /// Interested peers contribute at least 0.5, scaled up by how engaged
    /// the peer historically is.
    fn peer_affinity(peer: &Persona, article: &Article) -> f32 {
        match article.category_name() {
            Some(category) if peer.interests.contains(category) => {
                0.5 + 0.5 * peer.engagement.engagement_rate.clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

impl ScoringStrategy for CollaborativeStrategy {
    fn score(&self, persona: &Persona, article: &Article, _ctx: &ScoringContext) -> f32 {
        if self.peers.is_empty() {
            return 0.0;
        }

        let total: f32 = self
            .peers
            .iter()
            .map(|peer| Self::jaccard(persona, peer) * Self::peer_affinity(peer, article))
            .sum();

        (total / self.peers.len() as f32).clamp(0.0, 1.0)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Collaborative
    }
}

/// Content strategy: cosine similarity between the persona's semantic
/// profile and the article embedding.
pub struct ContentSimilarityStrategy {
    extractor: FeatureExtractor,
}

impl ContentSimilarityStrategy {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }
}

impl ScoringStrategy for ContentSimilarityStrategy {
    fn score(&self, persona: &Persona, article: &Article, ctx: &ScoringContext) -> f32 {
        let profile = self.extractor.persona_vector(persona);
        let embedding = self.extractor.article_vector(article, ctx.now);
        profile.cosine_similarity(&embedding)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ContentSimilarity
    }
}

/// Trending strategy: min(1, (views + 10*shares) / normalizer).
pub struct TrendingStrategy {
    normalizer: f32,
}

impl TrendingStrategy {
    pub fn new(normalizer: f32) -> Self {
        Self {
            normalizer: normalizer.max(1.0),
        }
    }
}

impl ScoringStrategy for TrendingStrategy {
    fn score(&self, _persona: &Persona, article: &Article, _ctx: &ScoringContext) -> f32 {
        let analytics = &article.analytics;
        let raw = analytics.views as f32 + 10.0 * analytics.shares as f32;
        (raw / self.normalizer).min(1.0)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Trending
    }
}

/// Contextual strategy: 1 when the article's publication time slot matches
/// the reader's current slot, 0 otherwise.
pub struct ContextualStrategy;

impl ScoringStrategy for ContextualStrategy {
    fn score(&self, _persona: &Persona, article: &Article, ctx: &ScoringContext) -> f32 {
        if TimeSlot::from_datetime(article.created_at) == ctx.time_slot {
            1.0
        } else {
            0.0
        }
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Contextual
    }
}
