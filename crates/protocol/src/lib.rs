use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const RETRIEVAL_SCHEMA_VERSION: u32 = 1;

/// One grounding passage handed to answer generation or shown to a user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RetrievedPassage {
    pub text: String,
    pub source_document: String,
    pub page: Option<u32>,
    pub section_id: Option<String>,
    pub final_score: f32,
    pub rank: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RetrievalRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f32,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f32,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_top_k(),
            semantic_weight: default_semantic_weight(),
            min_similarity: default_min_similarity(),
            boost_factor: default_boost_factor(),
        }
    }
}

const fn default_top_k() -> usize {
    5
}

const fn default_semantic_weight() -> f32 {
    0.7
}

const fn default_min_similarity() -> f32 {
    0.30
}

const fn default_boost_factor() -> f32 {
    1.2
}

/// Ranked results. An empty list means no grounded context was found.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RetrievalResponse {
    pub schema_version: u32,
    pub results: Vec<RetrievedPassage>,
}

impl RetrievalResponse {
    #[must_use]
    pub const fn new(results: Vec<RetrievedPassage>) -> Self {
        Self {
            schema_version: RETRIEVAL_SCHEMA_VERSION,
            results,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}
