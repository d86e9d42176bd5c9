//! # Regscope Corpus
//!
//! Passage model and read-only passage lookup for the regulatory text corpus.
//!
//! Passages are produced by an ingestion pipeline that lives outside this
//! workspace. Retrieval code only reads them, either through the
//! [`PassageStore`] capability or from a versioned [`PassageCorpus`] snapshot.
//!
//! ## Example
//!
//! ```rust
//! use regscope_corpus::{InMemoryPassageStore, Passage, PassageStore};
//!
//! let store = InMemoryPassageStore::from_passages(vec![
//!     Passage::new("cgst-16", "Section 16: Input Tax Credit ...", "cgst-act.pdf")
//!         .page(12)
//!         .section_id("16"),
//! ])
//! .unwrap();
//!
//! assert_eq!(store.get("cgst-16").and_then(|p| p.page), Some(12));
//! ```

mod corpus;
mod error;
mod store;
mod types;

pub use corpus::{PassageCorpus, PASSAGE_CORPUS_SCHEMA_VERSION};
pub use error::{CorpusError, Result};
pub use store::{InMemoryPassageStore, PassageStore};
pub use types::Passage;
