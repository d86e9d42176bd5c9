use crate::error::{Backend, Result, SearchError};
use regscope_vector_store::{EmbeddingProvider, VectorIndex};
use std::collections::HashSet;
use std::sync::Arc;

/// Dense embedding search against a pre-built vector index
#[derive(Clone)]
pub struct SemanticSearchClient {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl SemanticSearchClient {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Up to `n` `(passage_id, semantic_raw_score)` pairs sorted by descending
    /// score, each score within `[0, 1]` where 1 means identical.
    pub async fn search(&self, query: &str, n: usize) -> Result<Vec<(String, f32)>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await.map_err(|err| {
            log::warn!("Embedding provider failed: {err}");
            SearchError::IndexUnavailable(Backend::Semantic)
        })?;

        if vector.len() != self.index.dimension() {
            log::warn!(
                "Embedding dimension {} does not match vector index dimension {}",
                vector.len(),
                self.index.dimension()
            );
            return Err(SearchError::IndexUnavailable(Backend::Semantic));
        }

        let neighbors = self.index.nearest(&vector, n).await.map_err(|err| {
            log::warn!("Vector index lookup failed: {err}");
            SearchError::IndexUnavailable(Backend::Semantic)
        })?;

        let mut seen = HashSet::new();
        let mut results: Vec<(String, f32)> = neighbors
            .into_iter()
            .filter(|neighbor| seen.insert(neighbor.passage_id.clone()))
            .map(|neighbor| (neighbor.passage_id, neighbor.proximity.to_similarity()))
            .collect();

        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(n);

        log::debug!("Semantic: {} results", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use regscope_corpus::Passage;
    use regscope_vector_store::{FlatIndex, HashEmbedder, Neighbor, Proximity, VectorStoreError};

    struct OfflineEmbedder;

    #[async_trait]
    impl EmbeddingProvider for OfflineEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> regscope_vector_store::Result<Vec<f32>> {
            Err(VectorStoreError::EmbeddingError("connection refused".to_string()))
        }
    }

    /// Reports Euclidean distances, closest last
    struct EuclideanIndex;

    #[async_trait]
    impl VectorIndex for EuclideanIndex {
        fn dimension(&self) -> usize {
            HashEmbedder::DEFAULT_DIMENSION
        }

        fn len(&self) -> usize {
            2
        }

        async fn nearest(
            &self,
            _vector: &[f32],
            _n: usize,
        ) -> regscope_vector_store::Result<Vec<Neighbor>> {
            Ok(vec![
                Neighbor {
                    passage_id: "far".to_string(),
                    proximity: Proximity::EuclideanDistance(3.0),
                },
                Neighbor {
                    passage_id: "near".to_string(),
                    proximity: Proximity::EuclideanDistance(0.5),
                },
            ])
        }
    }

    #[tokio::test]
    async fn embedder_failure_is_semantic_unavailable() {
        let client =
            SemanticSearchClient::new(Arc::new(OfflineEmbedder), Arc::new(FlatIndex::new(4)));
        let err = client.search("Section 16", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(Backend::Semantic)));
    }

    #[tokio::test]
    async fn dimension_mismatch_is_semantic_unavailable() {
        let client = SemanticSearchClient::new(
            Arc::new(HashEmbedder::new(8).unwrap()),
            Arc::new(FlatIndex::new(4)),
        );
        let err = client.search("Section 16", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(Backend::Semantic)));
    }

    #[tokio::test]
    async fn distances_become_descending_similarities() {
        let client =
            SemanticSearchClient::new(Arc::new(HashEmbedder::default()), Arc::new(EuclideanIndex));
        let results = client.search("anything", 5).await.unwrap();
        assert_eq!(results[0].0, "near");
        assert!((results[0].1 - 1.0 / 1.5).abs() < 1e-6);
        assert!((results[1].1 - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn scores_stay_in_unit_range() {
        let embedder = Arc::new(HashEmbedder::new(64).unwrap());
        let passages = vec![
            Passage::new("p1", "Section 16 input tax credit", "act"),
            Passage::new("p2", "returns and annual filing", "act"),
            Passage::new("p3", "credit note issued by supplier", "act"),
        ];
        let index = FlatIndex::build(embedder.as_ref(), &passages).await.unwrap();
        let client = SemanticSearchClient::new(embedder, Arc::new(index));

        let results = client.search("input tax credit", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "p1");
        assert!(results.iter().all(|(_, score)| (0.0..=1.0).contains(score)));
        assert!(results[0].1 >= results[1].1);
    }
}
