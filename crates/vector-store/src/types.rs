/// Closeness reported by a vector index, tagged with the metric it was measured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proximity {
    /// Cosine similarity, 1 = identical
    Similarity(f32),
    /// Cosine distance between normalized vectors, 0 = identical
    CosineDistance(f32),
    /// Euclidean (L2) distance, 0 = identical
    EuclideanDistance(f32),
}

impl Proximity {
    /// Map onto `[0, 1]` where 1 means identical. Monotonic in closeness.
    #[must_use]
    pub fn to_similarity(self) -> f32 {
        let similarity = match self {
            Self::Similarity(s) => s,
            Self::CosineDistance(d) => 1.0 - d,
            Self::EuclideanDistance(d) => 1.0 / (1.0 + d.max(0.0)),
        };
        if similarity.is_nan() {
            return 0.0;
        }
        similarity.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub passage_id: String,
    pub proximity: Proximity,
}
