// ============================================
// Explanation Layer
// ============================================
//
// Produces human-readable "why this article" text via the external
// text-generation collaborator. Scoring never depends on this layer:
// a rejected call, empty output, or unparsable JSON degrades to the
// deterministic template already attached at scoring time.

use crate::config::LlmConfig;
use crate::models::{Explanation, Persona, ScoredCandidate};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Text generation request failed: {0}")]
    RequestFailed(String),

    #[error("Text generation returned an error status: {0}")]
    BadStatus(String),

    #[error("Unparsable generation payload: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ExplainError>;

/// The external text-generation collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<String>;
    fn name(&self) -> &str;
}

// ============================================
// HTTP Provider (OpenAI-compatible chat endpoint)
// ============================================

pub struct HttpTextGenerator {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpTextGenerator {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExplainError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str, _json_mode: bool) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExplainError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExplainError::BadStatus(error_text));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExplainError::ParseError(e.to_string()))?;

        Ok(result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================
// Explainer
// ============================================

/// Expected JSON shape from the collaborator.
#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    summary: String,
    #[serde(default)]
    factors: Vec<String>,
}

pub struct Explainer {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl Explainer {
    pub fn new(generator: Arc<dyn TextGenerator>, model: String) -> Self {
        Self { generator, model }
    }

    /// Try to upgrade a candidate's templated explanation to generated
    /// text. Any failure keeps the existing template; this never errors.
    pub async fn explain(&self, persona: &Persona, candidate: &ScoredCandidate) -> Explanation {
        let prompt = self.build_prompt(persona, candidate);

        match self.generator.generate(&prompt, true).await {
            Ok(raw) if raw.trim().is_empty() => {
                warn!(
                    article_id = %candidate.article_id,
                    "Empty generation output, keeping templated explanation"
                );
                candidate.explanation.clone()
            }
            Ok(raw) => match self.parse_payload(&raw) {
                Ok(payload) => {
                    debug!(article_id = %candidate.article_id, "Explanation generated");
                    Explanation::Generated {
                        summary: payload.summary,
                        factors: payload.factors,
                        model: self.model.clone(),
                    }
                }
                Err(e) => {
                    warn!(
                        article_id = %candidate.article_id,
                        error = %e,
                        "Unparsable generation output, keeping templated explanation"
                    );
                    candidate.explanation.clone()
                }
            },
            Err(e) => {
                warn!(
                    article_id = %candidate.article_id,
                    error = %e,
                    "Text generation failed, keeping templated explanation"
                );
                candidate.explanation.clone()
            }
        }
    }

    fn build_prompt(&self, persona: &Persona, candidate: &ScoredCandidate) -> String {
        let interests = persona
            .interests
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let breakdown = &candidate.breakdown;

        format!(
            r#"You write one-line recommendation explanations for a news reader.

Reader: interests [{interests}], mood {mood}, reading in the {slot}.
Article: "{title}" ({category}).
Signal breakdown: collaborative {collab:.2}, content {content:.2}, trending {trending:.2}, contextual {contextual:.2}.

Return ONLY a JSON object in this exact format:
{{"summary": "one sentence, max 20 words", "factors": ["short factor", "short factor"]}}

Return ONLY valid JSON, no other text."#,
            interests = interests,
            mood = persona.mood.as_str(),
            slot = persona.time_slot.as_str(),
            title = candidate.title,
            category = candidate.category_name().unwrap_or("general"),
            collab = breakdown.collaborative,
            content = breakdown.content,
            trending = breakdown.trending,
            contextual = breakdown.contextual,
        )
    }

    /// Extract JSON from the response, tolerating markdown code fences.
    fn parse_payload(&self, response: &str) -> Result<GeneratedPayload> {
        let json_str = if response.contains("```json") {
            response
                .split("```json")
                .nth(1)
                .and_then(|s| s.split("```").next())
                .unwrap_or(response)
        } else if response.contains("```") {
            response.split("```").nth(1).unwrap_or(response)
        } else {
            response
        };

        serde_json::from_str(json_str.trim())
            .map_err(|e| ExplainError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ScoreBreakdown};
    use uuid::Uuid;

    fn candidate() -> ScoredCandidate {
        ScoredCandidate {
            article_id: "a1".to_string(),
            title: "Budget announced".to_string(),
            category: Some(Category::named("economy")),
            score: 0.42,
            confidence: 0.76,
            breakdown: ScoreBreakdown {
                collaborative: 0.1,
                content: 0.2,
                trending: 0.8,
                contextual: 0.0,
            },
            explanation: Explanation::Template("Trending now in economy.".to_string()),
        }
    }

    fn explainer_with(mock: MockTextGenerator) -> Explainer {
        Explainer::new(Arc::new(mock), "test-model".to_string())
    }

    #[tokio::test]
    async fn test_generated_explanation_parsed() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(|_, _| {
            Ok(r#"{"summary": "Trending economy story", "factors": ["trending"]}"#.to_string())
        });

        let explainer = explainer_with(mock);
        let persona = Persona::cold_start(Uuid::new_v4());

        let explanation = explainer.explain(&persona, &candidate()).await;
        match explanation {
            Explanation::Generated {
                summary, factors, ..
            } => {
                assert_eq!(summary, "Trending economy story");
                assert_eq!(factors, vec!["trending"]);
            }
            other => panic!("Expected generated explanation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_markdown_fenced_json_accepted() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(|_, _| {
            Ok("```json\n{\"summary\": \"Fenced\", \"factors\": []}\n```".to_string())
        });

        let explainer = explainer_with(mock);
        let persona = Persona::cold_start(Uuid::new_v4());

        let explanation = explainer.explain(&persona, &candidate()).await;
        assert!(explanation.is_generated());
        assert_eq!(explanation.text(), "Fenced");
    }

    #[tokio::test]
    async fn test_rejection_keeps_template() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Err(ExplainError::RequestFailed("connection refused".to_string())));

        let explainer = explainer_with(mock);
        let persona = Persona::cold_start(Uuid::new_v4());
        let input = candidate();

        let explanation = explainer.explain(&persona, &input).await;
        assert_eq!(explanation, input.explanation);
        assert!(!explanation.is_generated());
    }

    #[tokio::test]
    async fn test_non_json_output_keeps_template() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("Sure! Here is why this article matters...".to_string()));

        let explainer = explainer_with(mock);
        let persona = Persona::cold_start(Uuid::new_v4());
        let input = candidate();

        let explanation = explainer.explain(&persona, &input).await;
        assert_eq!(explanation, input.explanation);
    }

    #[tokio::test]
    async fn test_empty_output_keeps_template() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(|_, _| Ok("   ".to_string()));

        let explainer = explainer_with(mock);
        let persona = Persona::cold_start(Uuid::new_v4());
        let input = candidate();

        let explanation = explainer.explain(&persona, &input).await;
        assert_eq!(explanation, input.explanation);
    }

}
