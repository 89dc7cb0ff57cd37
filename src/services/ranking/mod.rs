/// Ranking / Diversification Module
///
/// Orders scored candidates and caps per-category repetition so one desk
/// cannot dominate the recommendation slate.
use crate::models::ScoredCandidate;
use std::collections::HashMap;
use tracing::debug;

pub struct Ranker {
    max_per_category: usize,
}

impl Ranker {
    pub fn new(max_per_category: usize) -> Self {
        Self {
            // A cap of 0 would empty every pass; clamp instead of reject
            max_per_category: max_per_category.max(1),
        }
    }

    /// Stable-sort by score descending, then greedily emit candidates
    /// whose category bucket is below the cap, until `max_results`.
    ///
    /// Equal scores keep their input order. Uncategorized candidates each
    /// form their own singleton bucket.
    pub fn rank(
        &self,
        mut candidates: Vec<ScoredCandidate>,
        max_results: usize,
    ) -> Vec<ScoredCandidate> {
        if candidates.is_empty() || max_results == 0 {
            return Vec::new();
        }

        // Stable sort: ties break by original candidate order.
        // NaN scores are treated as equal to any score.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut category_counts: HashMap<String, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(max_results.min(candidates.len()));

        for candidate in candidates {
            if selected.len() >= max_results {
                break;
            }

            let bucket = match candidate.category_name() {
                Some(name) => name.to_string(),
                // Singleton bucket per uncategorized article
                None => format!("__uncategorized:{}", candidate.article_id),
            };

            let count = category_counts.entry(bucket).or_insert(0);
            if *count >= self.max_per_category {
                continue;
            }
            *count += 1;
            selected.push(candidate);
        }

        debug!(
            final_count = selected.len(),
            max_results, "Ranking complete"
        );

        selected
    }
}
