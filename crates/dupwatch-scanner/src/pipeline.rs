//! The shared per-item scan pipeline.
//!
//! Both orchestration modes (bulk batch iteration and the single-item event
//! trigger) funnel into [`ScanEngine::scan_item`]:
//! discover → embed (fan-out) → rank → tier → store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, warn};

use dupwatch_core::{
    defaults, AlertEntry, DuplicateHit, EmbeddingBackend, GenerationBackend, Item, ItemSearch,
    KeyValueStore, Result, ScanConfig,
};
use dupwatch_inference::DuplicateJudge;
use dupwatch_store::{AlertStore, EmbeddingCache, IgnoreStore};

use crate::discovery;
use crate::rank;
use crate::tiering;

/// The scan engine: collaborators wired once, shared by both orchestrators.
pub struct ScanEngine {
    search: Arc<dyn ItemSearch>,
    generator: Arc<dyn GenerationBackend>,
    judge: DuplicateJudge,
    embeddings: EmbeddingCache,
    alerts: AlertStore,
    ignores: IgnoreStore,
}

impl ScanEngine {
    pub fn new(
        search: Arc<dyn ItemSearch>,
        embedder: Arc<dyn EmbeddingBackend>,
        generator: Arc<dyn GenerationBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            search,
            judge: DuplicateJudge::new(generator.clone()),
            generator,
            embeddings: EmbeddingCache::new(store.clone(), embedder),
            alerts: AlertStore::new(store.clone()),
            ignores: IgnoreStore::new(store),
        }
    }

    pub fn search(&self) -> &Arc<dyn ItemSearch> {
        &self.search
    }

    pub fn generator(&self) -> &Arc<dyn GenerationBackend> {
        &self.generator
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn ignores(&self) -> &IgnoreStore {
        &self.ignores
    }

    /// Run the full pipeline for one source item.
    ///
    /// Returns the confirmed duplicates sorted descending by confidence.
    /// Completing a scan replaces the stored alert wholesale; a completed
    /// scan with zero confirmed duplicates deletes it. When no usable query
    /// can be built (or every search call fails) the stored alert is left
    /// untouched: an unscannable item is not the same as a clean one.
    pub async fn scan_item(
        &self,
        source: &Item,
        config: &ScanConfig,
        max_candidates: usize,
    ) -> Result<Vec<DuplicateHit>> {
        let start = Instant::now();

        // Discovery.
        let projects = config.scope_projects(&source.project_key);
        let scope = discovery::scope_clause(&projects);
        let clauses = discovery::discover_clauses(source, self.generator.as_ref()).await;
        if clauses.is_empty() {
            info!(
                subsystem = "scanner",
                component = "pipeline",
                item_key = %source.key,
                "No usable search clause, skipping scan"
            );
            return Ok(vec![]);
        }

        // Union the candidate searches, deduplicating by key. A single
        // failed search drops only its own results.
        let mut discovered: HashMap<String, Item> = HashMap::new();
        let mut searched_ok = false;
        for clause in &clauses {
            let query = discovery::candidate_query(&scope, clause, &source.key);
            match self.search.search(&query, defaults::SEARCH_MAX_RESULTS).await {
                Ok(items) => {
                    searched_ok = true;
                    for item in items {
                        discovered.entry(item.key.clone()).or_insert(item);
                    }
                }
                Err(e) => {
                    warn!(
                        subsystem = "scanner",
                        component = "pipeline",
                        item_key = %source.key,
                        error = %e,
                        "Candidate search failed"
                    );
                }
            }
        }
        if !searched_ok {
            warn!(
                subsystem = "scanner",
                component = "pipeline",
                item_key = %source.key,
                "Every candidate search failed, leaving stored alerts untouched"
            );
            return Ok(vec![]);
        }

        // Filter: never the source itself, nothing terminal, nothing the
        // user already dismissed.
        let ignored = self.ignores.list(&source.key).await?;
        let mut candidates: Vec<Item> = discovered
            .into_values()
            .filter(|c| c.key != source.key)
            .filter(|c| !c.is_done())
            .filter(|c| !ignored.contains(&c.key))
            .collect();
        candidates.sort_by(|a, b| a.key.cmp(&b.key));
        candidates.truncate(max_candidates);

        debug!(
            subsystem = "scanner",
            component = "pipeline",
            item_key = %source.key,
            candidate_count = candidates.len(),
            "Candidates ready for ranking"
        );

        // Embeddings: source and all candidates fetched concurrently. A
        // failed candidate embedding removes only that candidate.
        let source_embedding_text = source.embedding_text();
        let source_future = self
            .embeddings
            .get_or_create(&source.key, &source_embedding_text);
        let candidate_futures = candidates.iter().map(|c| async move {
            match self
                .embeddings
                .get_or_create(&c.key, &c.embedding_text())
                .await
            {
                Ok(vector) => Some((c.clone(), vector)),
                Err(e) => {
                    warn!(
                        subsystem = "scanner",
                        component = "pipeline",
                        item_key = %c.key,
                        error = %e,
                        "Candidate embedding failed, dropping candidate"
                    );
                    None
                }
            }
        });

        let (source_vector, candidate_vectors) =
            tokio::join!(source_future, join_all(candidate_futures));
        let source_vector = source_vector?;
        let embedded: Vec<(Item, Vec<f32>)> = candidate_vectors.into_iter().flatten().collect();

        // Ranking.
        let ranked: Vec<rank::Candidate> = embedded
            .iter()
            .map(|(item, vector)| rank::Candidate {
                key: item.key.clone(),
                embedding: vector.clone(),
            })
            .collect();
        let matches =
            rank::find_top_matches(&source_vector, &ranked, defaults::SIMILARITY_THRESHOLD)?;
        let by_key: HashMap<&str, &Item> =
            embedded.iter().map(|(item, _)| (item.key.as_str(), item)).collect();

        // Verdict tiering, bounded to the top matches.
        let mut hits: Vec<DuplicateHit> = Vec::new();
        for m in matches.iter().take(defaults::MAX_ALERT_ENTRIES) {
            let Some(candidate) = by_key.get(m.key.as_str()) else {
                continue;
            };
            let verdict =
                tiering::resolve(m.score, || self.judge.judge(source, candidate)).await;
            if let Some(verdict) = verdict {
                hits.push(DuplicateHit {
                    key: m.key.clone(),
                    summary: candidate.summary.clone(),
                    score: m.score,
                    confidence: verdict.confidence,
                    reason: verdict.reason,
                });
            }
        }
        hits.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        // Store: wholesale replace, delete on a clean scan.
        let entries: Vec<AlertEntry> = hits.iter().map(AlertEntry::from).collect();
        self.alerts.record(&source.key, &entries).await?;

        info!(
            subsystem = "scanner",
            component = "pipeline",
            item_key = %source.key,
            match_count = matches.len(),
            result_count = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );
        Ok(hits)
    }
}
