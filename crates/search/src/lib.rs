//! Hybrid semantic + lexical retrieval over regulatory passages.
//!
//! ```text
//! query ─┬─> QueryAnalyzer ──────── extracted terms ─┐
//!        ├─> SemanticSearchClient ── semantic list ───┼─> ScoreFusion
//!        └─> LexicalSearchIndex ──── lexical list ────┘       │
//!                                                    ResultAssembler
//! ```

mod assembler;
mod bm25;
mod config;
mod error;
mod fusion;
mod hybrid;
mod lexical;
mod query_analyzer;
mod semantic;
mod tokenizer;

pub use assembler::ResultAssembler;
pub use bm25::{Bm25Index, Bm25Params, LexicalBackend};
pub use config::{
    load_config, RetrievalConfig, ENV_BOOST_FACTOR, ENV_MIN_SIMILARITY, ENV_SEMANTIC_WEIGHT,
    ENV_TOP_K,
};
pub use error::{Backend, Result, SearchError};
pub use fusion::{CandidateScore, ScoreFusion, ScoredResult};
pub use hybrid::{HybridRetriever, IndexSnapshot};
pub use lexical::LexicalSearchIndex;
pub use query_analyzer::{ExtractedTerm, Query, QueryAnalyzer, TermCategory};
pub use semantic::SemanticSearchClient;
pub use tokenizer::tokenize;
