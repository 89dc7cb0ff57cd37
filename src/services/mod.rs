pub mod explain;
pub mod features;
pub mod ranking;
pub mod scoring;

pub use explain::{Explainer, HttpTextGenerator, TextGenerator};
pub use features::{FeatureExtractor, FeatureVector};
pub use ranking::Ranker;
pub use scoring::{Scorer, ScoringContext};
