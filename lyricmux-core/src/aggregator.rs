//! Lyrics aggregator that fans a query out to every backend and ranks the results.
//!
//! Per request: search every backend, keep the first few hits of each, fetch
//! lyrics for all of them concurrently, then score and sort. Failures of a
//! single backend or candidate only remove that backend's or candidate's
//! results.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::backend::{is_not_found_text, BackendId, Candidate, LyricsBackend, LyricsPayload, LyricsQuery};
use crate::config::BackendsConfig;
use crate::document::{LyricDocument, ScoredDocument};
use crate::error::{CoreError, Result};

/// Default number of search hits per backend that go on to lyric retrieval
pub const DEFAULT_CANDIDATE_LIMIT: usize = 3;

type Discovered = (Arc<dyn LyricsBackend>, Candidate);

/// Aggregates lyrics from several backends into one ranked list
pub struct LyricsAggregator {
    backends: Vec<Arc<dyn LyricsBackend>>,
    candidate_limit: usize,
    max_concurrency: Option<usize>,
}

impl LyricsAggregator {
    /// Create an aggregator over `backends`.
    ///
    /// Backend order is the final tie-break when ranking results.
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn LyricsBackend>>) -> Self {
        Self {
            backends,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            max_concurrency: None,
        }
    }

    /// Create an aggregator using limits from the `[backends]` config section
    #[must_use]
    pub fn from_config(backends: Vec<Arc<dyn LyricsBackend>>, config: &BackendsConfig) -> Self {
        Self::new(backends)
            .with_candidate_limit(config.candidate_limit)
            .with_max_concurrency(config.max_concurrency)
    }

    /// Set how many search hits per backend are fetched
    #[must_use]
    pub const fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// Cap concurrent lyric fetches (`None`: one slot per candidate)
    #[must_use]
    pub const fn with_max_concurrency(mut self, max: Option<usize>) -> Self {
        self.max_concurrency = max;
        self
    }

    /// IDs of the configured backends, in tie-break order
    #[must_use]
    pub fn backend_ids(&self) -> Vec<BackendId> {
        self.backends.iter().map(|b| b.id()).collect()
    }

    /// Search all backends and return ranked lyric documents.
    ///
    /// An empty list means no backend produced usable lyrics.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Internal`] if the fetch pool cannot admit tasks.
    /// Backend and candidate failures never surface here.
    pub async fn aggregate(&self, query: &LyricsQuery) -> Result<Vec<LyricDocument>> {
        info!(
            "Aggregating lyrics for: {} - {} (backends: {:?})",
            query.artist,
            query.title,
            self.backend_ids()
        );

        let candidates = self.search_all(query).await;
        if candidates.is_empty() {
            info!("No candidates found for {}", query.title);
            return Ok(Vec::new());
        }

        let total = candidates.len();
        let scored = self.fetch_all(candidates, query).await?;
        info!(
            "Fetched lyrics for {}/{} candidates for {}",
            scored.len(),
            total,
            query.title
        );

        Ok(rank(scored))
    }

    /// Search every backend concurrently, keeping backend order and the first
    /// `candidate_limit` hits of each
    async fn search_all(&self, query: &LyricsQuery) -> Vec<Discovered> {
        let searches = self.backends.iter().map(|backend| async move {
            let mut hits = backend.search(query).await;
            let found = hits.len();
            hits.truncate(self.candidate_limit);
            debug!(
                "{} returned {} hits, keeping {}",
                backend.id(),
                found,
                hits.len()
            );

            hits.into_iter()
                .map(|candidate| (Arc::clone(backend), candidate))
                .collect::<Vec<_>>()
        });

        join_all(searches).await.into_iter().flatten().collect()
    }

    /// Fetch lyrics for every candidate in a bounded task group and wait for all of them
    async fn fetch_all(
        &self,
        candidates: Vec<Discovered>,
        query: &LyricsQuery,
    ) -> Result<Vec<ScoredDocument>> {
        let pool_size = self
            .max_concurrency
            .map_or(candidates.len(), |max| max.min(candidates.len()));
        let pool = Arc::new(Semaphore::new(pool_size));
        debug!(
            "Fetching {} candidates with pool size {}",
            candidates.len(),
            pool_size
        );

        let mut tasks = JoinSet::new();
        for (order, (backend, candidate)) in candidates.into_iter().enumerate() {
            let permit = Arc::clone(&pool)
                .acquire_owned()
                .await
                .map_err(|e| CoreError::Internal {
                    reason: format!("fetch pool unavailable: {e}"),
                })?;

            tasks.spawn(async move {
                let _permit = permit;
                (order, fetch_document(backend, candidate).await)
            });
        }

        let mut documents = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((order, Some((document, has_translation)))) => {
                    documents.push(ScoredDocument::new(document, has_translation, order, query));
                }
                Ok((_, None)) => {}
                Err(e) => warn!("Lyrics fetch task failed: {e}"),
            }
        }

        Ok(documents)
    }
}

/// Fetch, check and assemble lyrics for one candidate.
///
/// Returns `None` for any outcome that should drop the candidate.
async fn fetch_document(
    backend: Arc<dyn LyricsBackend>,
    candidate: Candidate,
) -> Option<(LyricDocument, bool)> {
    let source = backend.id();
    let markers = backend.not_found_markers();

    match backend.fetch_lyrics(&candidate).await {
        Ok(LyricsPayload::Found {
            lyrics,
            translation,
        }) => {
            if is_not_found_text(&lyrics, markers) {
                debug!(
                    "{} has no lyrics for {} (id: {})",
                    source, candidate.title, candidate.external_id
                );
                return None;
            }

            let translation = translation.filter(|t| !is_not_found_text(t, markers));
            Some(LyricDocument::assemble(
                candidate,
                &lyrics,
                translation.as_deref(),
            ))
        }
        Ok(LyricsPayload::NotFound) => {
            debug!(
                "{} reported no lyrics for {} (id: {})",
                source, candidate.title, candidate.external_id
            );
            None
        }
        Err(e) => {
            warn!(
                "{} lyrics fetch failed for {} (id: {}): {}",
                source, candidate.title, candidate.external_id, e
            );
            None
        }
    }
}

/// Order by score, then translation availability, then discovery order; drop ranking keys
fn rank(mut scored: Vec<ScoredDocument>) -> Vec<LyricDocument> {
    scored.sort_by_key(|s| s.discovery_order);
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.has_translation.cmp(&a.has_translation))
    });
    scored.into_iter().map(|s| s.document).collect()
}
