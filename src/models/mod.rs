use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Engagement counters attached to an article.
///
/// Counters only ever increase; missing fields deserialize to 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleAnalytics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    /// Average read time in seconds
    #[serde(default)]
    pub read_time_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn named(name: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
        }
    }
}

/// A published article as stored by the CMS.
///
/// Immutable once authored except for `analytics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    /// Articles without a category are ranked in their own singleton bucket
    #[serde(default)]
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub analytics: ArticleAnalytics,
}

impl Article {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Coarse time-of-day bucket used by the contextual scoring term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    Morning,   // 05:00 - 11:59
    Afternoon, // 12:00 - 16:59
    Evening,   // 17:00 - 21:59
    Night,     // 22:00 - 04:59
}

impl TimeSlot {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Afternoon,
            17..=21 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::from_hour(at.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }
}

impl Default for TimeSlot {
    fn default() -> Self {
        TimeSlot::Morning
    }
}

/// Reader mood as set in the persona preferences screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Calm,
    Curious,
    Focused,
    Relaxed,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Curious => "curious",
            Mood::Focused => "focused",
            Mood::Relaxed => "relaxed",
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Calm
    }
}

/// Historical engagement aggregates for one reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementSummary {
    #[serde(default)]
    pub sessions: u32,
    /// Average session read time in seconds
    #[serde(default)]
    pub avg_read_time_secs: f32,
    /// Fraction of impressions that led to an interaction, 0..1
    #[serde(default)]
    pub engagement_rate: f32,
}

/// A reader's stored interest/behavior profile.
///
/// Mutated only by explicit settings changes; no concurrent writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub user_id: Uuid,
    /// Interest categories by name, unordered and unique
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub mood: Mood,
    /// The reader's current time-of-day setting
    #[serde(default)]
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub engagement: EngagementSummary,
}

impl Persona {
    /// Profile used for unknown readers: no interests, neutral defaults.
    pub fn cold_start(user_id: Uuid) -> Self {
        Self {
            user_id,
            interests: BTreeSet::new(),
            mood: Mood::default(),
            time_slot: TimeSlot::default(),
            engagement: EngagementSummary::default(),
        }
    }

    pub fn is_cold_start(&self) -> bool {
        self.interests.is_empty()
    }
}

/// Which sub-model produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    Collaborative,
    ContentSimilarity,
    Trending,
    Contextual,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Collaborative => "collaborative",
            StrategyKind::ContentSimilarity => "content_similarity",
            StrategyKind::Trending => "trending",
            StrategyKind::Contextual => "contextual",
        }
    }
}

/// Per-strategy raw scores for one candidate, each in 0..1.
///
/// The final score is reproducible from this breakdown under the weight
/// formula; see [`ScoreBreakdown::combined`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub collaborative: f32,
    pub content: f32,
    pub trending: f32,
    pub contextual: f32,
}

impl ScoreBreakdown {
    /// Weighted linear combination, clamped to 0..1.
    pub fn combined(&self, weights: &crate::config::ScoringWeights) -> f32 {
        let raw = self.collaborative * weights.personalized
            + self.content * weights.personalized
            + self.trending * weights.trend
            + self.contextual * weights.time_based;
        raw.clamp(0.0, 1.0)
    }

    /// Strategy with the largest weighted contribution.
    ///
    /// Ties resolve in declaration order so the result is deterministic.
    pub fn dominant(&self, weights: &crate::config::ScoringWeights) -> StrategyKind {
        let terms = [
            (
                StrategyKind::Collaborative,
                self.collaborative * weights.personalized,
            ),
            (
                StrategyKind::ContentSimilarity,
                self.content * weights.personalized,
            ),
            (StrategyKind::Trending, self.trending * weights.trend),
            (StrategyKind::Contextual, self.contextual * weights.time_based),
        ];

        let mut best = terms[0];
        for term in &terms[1..] {
            if term.1 > best.1 {
                best = *term;
            }
        }
        best.0
    }
}

/// How a candidate's explanation text was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Explanation {
    /// Parsed output of the text-generation collaborator
    Generated {
        summary: String,
        factors: Vec<String>,
        model: String,
    },
    /// Deterministic templated text (collaborator unavailable or unparsable)
    Template(String),
}

impl Explanation {
    pub fn text(&self) -> &str {
        match self {
            Explanation::Generated { summary, .. } => summary,
            Explanation::Template(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Explanation::Generated { .. })
    }
}

/// One scored article, produced fresh per ranking pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub article_id: String,
    pub title: String,
    pub category: Option<Category>,
    pub score: f32,
    pub confidence: f32,
    pub breakdown: ScoreBreakdown,
    pub explanation: Explanation,
}

impl ScoredCandidate {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Counters for one recommendation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassStats {
    pub candidate_count: usize,
    pub scored_count: usize,
    pub explained_count: usize,
    pub fallback_count: usize,
    pub final_count: usize,
}

/// Final output of a recommendation pass.
#[derive(Debug, Clone)]
pub struct RecommendationResponse {
    pub items: Vec<ScoredCandidate>,
    pub stats: PassStats,
}
