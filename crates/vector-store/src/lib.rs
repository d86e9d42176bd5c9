//! # Regscope Vector Store
//!
//! Embedding and nearest-neighbor capabilities for semantic passage search.
//!
//! ## Architecture
//!
//! ```text
//! Passage[]
//!     │
//!     ├──> EmbeddingProvider
//!     │      └─> Vector[dimension]
//!     │
//!     └──> VectorIndex
//!            └─> nearest(vector, n) -> Neighbor { passage_id, Proximity }
//! ```
//!
//! Both capabilities are traits so callers can inject remote services or test
//! fakes. [`HashEmbedder`] and [`FlatIndex`] are the in-process defaults.
//!
//! ## Example
//!
//! ```no_run
//! use regscope_corpus::Passage;
//! use regscope_vector_store::{EmbeddingProvider, FlatIndex, HashEmbedder, VectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = HashEmbedder::default();
//!     let passages = vec![Passage::new("p1", "Section 16: Input Tax Credit", "cgst.pdf")];
//!     let index = FlatIndex::build(&embedder, &passages).await?;
//!
//!     let query = embedder.embed("input tax credit").await?;
//!     for neighbor in index.nearest(&query, 5).await? {
//!         println!("{}: {:.3}", neighbor.passage_id, neighbor.proximity.to_similarity());
//!     }
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod flat_index;
mod types;

pub use embeddings::{cosine_similarity, EmbeddingProvider, HashEmbedder};
pub use error::{Result, VectorStoreError};
pub use flat_index::{FlatIndex, VectorIndex};
pub use types::{Neighbor, Proximity};
