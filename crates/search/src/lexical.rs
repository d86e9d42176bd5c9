use crate::bm25::LexicalBackend;
use crate::error::{Backend, Result, SearchError};
use crate::tokenizer::tokenize;
use std::sync::Arc;

/// Sparse term-matching search over the static corpus
#[derive(Clone)]
pub struct LexicalSearchIndex {
    backend: Arc<dyn LexicalBackend>,
}

impl LexicalSearchIndex {
    pub fn new(backend: Arc<dyn LexicalBackend>) -> Self {
        Self { backend }
    }

    /// Up to `n` `(passage_id, lexical_raw_score)` pairs sorted by descending score.
    /// Scores are raw BM25 values, not normalized.
    pub fn search(&self, query: &str, n: usize) -> Result<Vec<(String, f32)>> {
        if self.backend.doc_count() == 0 {
            return Err(SearchError::IndexUnavailable(Backend::Lexical));
        }

        let tokens = tokenize(query);
        if tokens.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        let mut results = self.backend.score(&tokens, n)?;
        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(n);

        log::debug!("Lexical: {} results for {} tokens", results.len(), tokens.len());
        Ok(results)
    }
}
