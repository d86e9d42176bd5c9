use crate::assembler::ResultAssembler;
use crate::bm25::{Bm25Index, Bm25Params, LexicalBackend};
use crate::config::RetrievalConfig;
use crate::error::{Backend, Result, SearchError};
use crate::fusion::{ScoreFusion, ScoredResult};
use crate::lexical::LexicalSearchIndex;
use crate::query_analyzer::Query;
use crate::semantic::SemanticSearchClient;
use regscope_corpus::{InMemoryPassageStore, PassageStore};
use regscope_protocol::{RetrievalRequest, RetrievalResponse, RetrievedPassage};
use regscope_vector_store::{EmbeddingProvider, FlatIndex, VectorIndex};
use std::sync::{Arc, PoisonError, RwLock};

/// Read-only view of everything one retrieval call needs
pub struct IndexSnapshot {
    passages: Arc<dyn PassageStore>,
    semantic: SemanticSearchClient,
    lexical: LexicalSearchIndex,
}

impl IndexSnapshot {
    pub fn new(
        passages: Arc<dyn PassageStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorIndex>,
        lexical: Arc<dyn LexicalBackend>,
    ) -> Self {
        Self {
            passages,
            semantic: SemanticSearchClient::new(embedder, vectors),
            lexical: LexicalSearchIndex::new(lexical),
        }
    }

    /// Build an in-process flat vector index and BM25 index over `store`
    pub async fn build_in_memory(
        store: InMemoryPassageStore,
        embedder: Arc<dyn EmbeddingProvider>,
        bm25: Bm25Params,
    ) -> Result<Self> {
        let vectors = FlatIndex::build(embedder.as_ref(), store.passages())
            .await
            .map_err(|err| {
                log::warn!("Failed to build vector index: {err}");
                SearchError::IndexUnavailable(Backend::Semantic)
            })?;
        let lexical = Bm25Index::from_passages(bm25, store.passages());

        Ok(Self::new(
            Arc::new(store),
            embedder,
            Arc::new(vectors),
            Arc::new(lexical),
        ))
    }

    #[must_use]
    pub fn passages(&self) -> &dyn PassageStore {
        self.passages.as_ref()
    }
}

/// Hybrid semantic + lexical retrieval entry point.
///
/// Holds the current [`IndexSnapshot`]; each call pins the snapshot it started
/// with, so a concurrent [`HybridRetriever::replace_snapshot`] never leaks a
/// half-swapped index into an in-flight query.
pub struct HybridRetriever {
    snapshot: RwLock<Arc<IndexSnapshot>>,
    defaults: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            defaults: RetrievalConfig::default(),
        }
    }

    /// Builder: config used by [`HybridRetriever::retrieve_default`]
    #[must_use]
    pub fn with_defaults(mut self, defaults: RetrievalConfig) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub const fn defaults(&self) -> &RetrievalConfig {
        &self.defaults
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_snapshot(&self, snapshot: IndexSnapshot) {
        let next = Arc::new(snapshot);
        let passages = next.passages.len();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        log::info!("Swapped retrieval snapshot ({passages} passages)");
    }

    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        self.retrieve(query, &self.defaults).await
    }

    /// Ranked grounding passages for `query`. An empty list means nothing
    /// cleared `min_similarity`.
    pub async fn retrieve(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<RetrievedPassage>> {
        let snapshot = self.snapshot();
        let scored = Self::rank(&snapshot, query, config).await?;
        ResultAssembler::assemble(&scored, snapshot.passages())
    }

    /// Like [`HybridRetriever::retrieve`] but keeps per-signal scores and matched terms
    pub async fn retrieve_scored(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredResult>> {
        let snapshot = self.snapshot();
        Self::rank(&snapshot, query, config).await
    }

    pub async fn handle_request(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        let config = RetrievalConfig::from(request);
        let results = self.retrieve(&request.query, &config).await?;
        Ok(RetrievalResponse::new(results))
    }

    async fn rank(
        snapshot: &IndexSnapshot,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredResult>> {
        let fusion = ScoreFusion::new(config.clone())?;

        if snapshot.passages.is_empty() {
            log::debug!("Empty corpus, nothing to retrieve");
            return Ok(Vec::new());
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::parse(query);
        let pool = config.candidate_pool();
        log::debug!(
            "Hybrid retrieval: query='{}', terms={:?}, pool={}",
            query.raw_text,
            query.extracted_terms,
            pool
        );

        // Both lookups must succeed; there is no single-signal fallback
        let (semantic, lexical) = tokio::join!(
            snapshot.semantic.search(&query.raw_text, pool),
            async { snapshot.lexical.search(&query.raw_text, pool) }
        );
        let semantic = semantic?;
        let lexical = lexical?;

        let results = fusion.fuse(
            &semantic,
            &lexical,
            &query.extracted_terms,
            snapshot.passages(),
        )?;

        log::info!(
            "Hybrid retrieval completed: {} semantic, {} lexical, {} final results",
            semantic.len(),
            lexical.len(),
            results.len()
        );
        Ok(results)
    }
}
