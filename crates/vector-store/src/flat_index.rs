use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::error::{Result, VectorStoreError};
use crate::types::{Neighbor, Proximity};
use async_trait::async_trait;
use regscope_corpus::Passage;
use std::collections::BTreeMap;

/// Nearest-neighbor lookup over pre-built passage vectors
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `n` neighbors, closest first
    async fn nearest(&self, vector: &[f32], n: usize) -> Result<Vec<Neighbor>>;
}

/// Exact brute-force index. Reports cosine distance like most ANN backends do.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: BTreeMap<String, Vec<f32>>,
}

impl FlatIndex {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: BTreeMap::new(),
        }
    }

    /// Embed every passage and index it under its id
    pub async fn build<'a>(
        embedder: &dyn EmbeddingProvider,
        passages: impl IntoIterator<Item = &'a Passage>,
    ) -> Result<Self> {
        let passages: Vec<&Passage> = passages.into_iter().collect();
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        let mut index = Self::new(embedder.dimension());
        for (passage, vector) in passages.into_iter().zip(vectors) {
            index.add(&passage.id, vector)?;
        }
        log::info!("Built flat vector index with {} passages", index.len());
        Ok(index)
    }

    pub fn add(&mut self, passage_id: &str, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.vectors.contains_key(passage_id) {
            return Err(VectorStoreError::DuplicateId(passage_id.to_string()));
        }
        self.vectors.insert(passage_id.to_string(), vector);
        Ok(())
    }

    pub fn remove(&mut self, passage_id: &str) -> bool {
        self.vectors.remove(passage_id).is_some()
    }
}

#[async_trait]
impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    async fn nearest(&self, vector: &[f32], n: usize) -> Result<Vec<Neighbor>> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<(&String, f32)> = self
            .vectors
            .iter()
            .map(|(id, stored)| (id, 1.0 - cosine_similarity(vector, stored)))
            .collect();

        // Ascending distance, id order among equals
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(id, distance)| Neighbor {
                passage_id: id.clone(),
                proximity: Proximity::CosineDistance(distance),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;

    #[tokio::test]
    async fn test_add_and_search() {
        let mut index = FlatIndex::new(3);

        index.add("a", vec![1.0, 0.0, 0.0]).unwrap();
        index.add("b", vec![0.9, 0.1, 0.0]).unwrap();
        index.add("c", vec![0.0, 1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 3);

        let results = index.nearest(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].passage_id, "a");
        assert!((results[0].proximity.to_similarity() - 1.0).abs() < 1e-6);

        assert_eq!(results[1].passage_id, "b");
        assert!(results[1].proximity.to_similarity() > 0.9);
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(3);
        assert!(index.add("a", vec![1.0, 0.0]).is_err());

        index.add("a", vec![1.0, 0.0, 0.0]).unwrap();
        assert!(index.nearest(&[1.0, 0.0], 1).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let mut index = FlatIndex::new(2);
        index.add("a", vec![1.0, 0.0]).unwrap();
        let err = index.add("a", vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, VectorStoreError::DuplicateId(id) if id == "a"));
        assert!(index.remove("a"));
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn equal_distances_break_ties_by_id() {
        let mut index = FlatIndex::new(2);
        index.add("z", vec![1.0, 0.0]).unwrap();
        index.add("m", vec![1.0, 0.0]).unwrap();
        let results = index.nearest(&[1.0, 0.0], 5).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|n| n.passage_id.as_str()).collect();
        assert_eq!(ids, vec!["m", "z"]);
    }

    #[tokio::test]
    async fn build_embeds_every_passage() {
        let embedder = HashEmbedder::new(32).unwrap();
        let passages = vec![
            Passage::new("p1", "input tax credit", "act.pdf"),
            Passage::new("p2", "annual return filing", "act.pdf"),
        ];
        let index = FlatIndex::build(&embedder, &passages).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 32);

        let query = embedder.embed("input tax credit").await.unwrap();
        let results = index.nearest(&query, 1).await.unwrap();
        assert_eq!(results[0].passage_id, "p1");
    }
}
