//! Recommendation scoring and ranking core for the Sabq news CMS.
//!
//! The pipeline is: content store → feature extraction → multi-strategy
//! scoring → rank/diversify → explanation. Scoring is deterministic given
//! its inputs; the text-generation collaborator only decorates results and
//! every failure there degrades to templated text.

pub mod config;
pub mod engine;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use engine::{RecommendOptions, RecommendationEngine};
pub use models::{
    Article, ArticleAnalytics, Category, Explanation, Persona, RecommendationResponse,
    ScoreBreakdown, ScoredCandidate,
};
pub use services::{Explainer, Ranker, Scorer, ScoringContext, TextGenerator};
pub use store::ContentStore;
