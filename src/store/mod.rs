use crate::models::{Article, Persona};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-session content repository.
///
/// Holds the article and persona collections behind reader/writer locks.
/// Constructed once per session by the host CMS and passed by reference
/// into the engine; the scoring pipeline only uses the read accessors.
#[derive(Default)]
pub struct ContentStore {
    articles: RwLock<HashMap<String, Article>>,
    personas: RwLock<HashMap<Uuid, Persona>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all articles, ordered by id for reproducible passes.
    pub async fn list_articles(&self) -> Vec<Article> {
        let articles = self.articles.read().await;
        let mut all: Vec<Article> = articles.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub async fn get_article(&self, article_id: &str) -> Option<Article> {
        self.articles.read().await.get(article_id).cloned()
    }

    pub async fn get_persona(&self, user_id: Uuid) -> Option<Persona> {
        self.personas.read().await.get(&user_id).cloned()
    }

    /// All personas except the given user, ordered by user id.
    ///
    /// This is the peer pool for the collaborative term; the ordering keeps
    /// the deterministic sample stable between passes.
    pub async fn list_peers(&self, exclude: Uuid) -> Vec<Persona> {
        let personas = self.personas.read().await;
        let mut peers: Vec<Persona> = personas
            .values()
            .filter(|p| p.user_id != exclude)
            .cloned()
            .collect();
        peers.sort_by_key(|p| p.user_id);
        peers
    }

    pub async fn upsert_article(&self, article: Article) {
        debug!(article_id = %article.id, "Upserting article");
        self.articles.write().await.insert(article.id.clone(), article);
    }

    pub async fn upsert_persona(&self, persona: Persona) {
        debug!(user_id = %persona.user_id, "Upserting persona");
        self.personas
            .write()
            .await
            .insert(persona.user_id, persona);
    }

    /// Bump one article's engagement counters. Counters are monotone;
    /// unknown articles are ignored.
    pub async fn record_engagement(
        &self,
        article_id: &str,
        views: u64,
        likes: u64,
        shares: u64,
        comments: u64,
    ) {
        let mut articles = self.articles.write().await;
        if let Some(article) = articles.get_mut(article_id) {
            article.analytics.views += views;
            article.analytics.likes += likes;
            article.analytics.shares += shares;
            article.analytics.comments += comments;
        } else {
            debug!(article_id, "Engagement for unknown article dropped");
        }
    }

    pub async fn article_count(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn persona_count(&self) -> usize {
        self.personas.read().await.len()
    }
}
