use serde::Deserialize;
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Engine configuration, assembled from environment variables with
/// documented defaults. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub llm: LlmConfig,
}

/// Weight configuration for the linear score combination.
///
/// Each weight lives in 0..1 and the set need not sum to 1.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringWeights {
    pub personalized: f32,
    pub diversity: f32,
    pub novelty: f32,
    pub trend: f32,
    pub time_based: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            personalized: 0.4,
            diversity: 0.2,
            novelty: 0.1,
            trend: 0.2,
            time_based: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Clamp every weight into 0..1. Negative weights become 0.
    pub fn clamped(&self) -> Self {
        Self {
            personalized: self.personalized.clamp(0.0, 1.0),
            diversity: self.diversity.clamp(0.0, 1.0),
            novelty: self.novelty.clamp(0.0, 1.0),
            trend: self.trend.clamp(0.0, 1.0),
            time_based: self.time_based.clamp(0.0, 1.0),
        }
    }
}

/// Fixed per-strategy confidence constants.
///
/// These reflect which sub-model produced the dominant signal; they are
/// configuration, not learned values.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceConfig {
    pub collaborative: f32,
    pub content: f32,
    pub trending: f32,
    pub contextual: f32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            collaborative: 0.82,
            content: 0.90,
            trending: 0.76,
            contextual: 0.70,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Denominator for the trending term: min(1, (views + 10*shares) / normalizer)
    pub trending_normalizer: f32,
    /// Recency decay rate per hour (exponential decay)
    pub recency_decay_rate: f32,
    /// How many peer personas feed the collaborative term
    pub peer_sample_size: usize,
    pub confidence: ConfidenceConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trending_normalizer: 10_000.0,
            recency_decay_rate: 0.1,
            peer_sample_size: 25,
            confidence: ConfidenceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub max_results: usize,
    pub max_per_category: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            max_per_category: 3,
        }
    }
}

/// Text-generation collaborator settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            timeout_secs: 30,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            scoring: ScoringConfig::default(),
            ranking: RankingConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let weight_defaults = ScoringWeights::default();
        let scoring_defaults = ScoringConfig::default();
        let ranking_defaults = RankingConfig::default();
        let llm_defaults = LlmConfig::default();

        let config = EngineConfig {
            weights: ScoringWeights {
                personalized: env_or("RECSYS_WEIGHT_PERSONALIZED", weight_defaults.personalized),
                diversity: env_or("RECSYS_WEIGHT_DIVERSITY", weight_defaults.diversity),
                novelty: env_or("RECSYS_WEIGHT_NOVELTY", weight_defaults.novelty),
                trend: env_or("RECSYS_WEIGHT_TREND", weight_defaults.trend),
                time_based: env_or("RECSYS_WEIGHT_TIME_BASED", weight_defaults.time_based),
            },
            scoring: ScoringConfig {
                trending_normalizer: env_or(
                    "RECSYS_TRENDING_NORMALIZER",
                    scoring_defaults.trending_normalizer,
                ),
                recency_decay_rate: env_or(
                    "RECSYS_RECENCY_DECAY_RATE",
                    scoring_defaults.recency_decay_rate,
                ),
                peer_sample_size: env_or(
                    "RECSYS_PEER_SAMPLE_SIZE",
                    scoring_defaults.peer_sample_size,
                ),
                confidence: ConfidenceConfig::default(),
            },
            ranking: RankingConfig {
                max_results: env_or("RECSYS_MAX_RESULTS", ranking_defaults.max_results),
                max_per_category: env_or(
                    "RECSYS_MAX_PER_CATEGORY",
                    ranking_defaults.max_per_category,
                ),
            },
            llm: LlmConfig {
                enabled: env_or("RECSYS_LLM_ENABLED", llm_defaults.enabled),
                endpoint: env::var("RECSYS_LLM_ENDPOINT").unwrap_or(llm_defaults.endpoint),
                api_key: env::var("RECSYS_LLM_API_KEY").unwrap_or_default(),
                model: env::var("RECSYS_LLM_MODEL").unwrap_or(llm_defaults.model),
                max_tokens: env_or("RECSYS_LLM_MAX_TOKENS", llm_defaults.max_tokens),
                timeout_secs: env_or("RECSYS_LLM_TIMEOUT_SECS", llm_defaults.timeout_secs),
            },
        };

        config.sanitized()
    }

    /// Clamp weights into range and floor ranking limits.
    ///
    /// `max_per_category` of 0 would make every pass empty, so it floors
    /// at 1. `max_results` of 0 is a legal "return nothing" setting.
    pub fn sanitized(mut self) -> Self {
        self.weights = self.weights.clamped();
        self.ranking.max_per_category = self.ranking.max_per_category.max(1);
        self.scoring.trending_normalizer = self.scoring.trending_normalizer.max(1.0);
        self
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Unparsable config value, using default");
            default
        }),
        Err(_) => default,
    }
}
