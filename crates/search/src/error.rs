use regscope_protocol::ErrorEnvelope;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Which search backend failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Semantic,
    Lexical,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Lexical => "lexical",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(Backend),

    /// A ranked passage id has no entry in the passage store
    #[error("Passage missing from store: {0}")]
    MissingPassage(String),
}

impl SearchError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::IndexUnavailable(_) => "index_unavailable",
            Self::MissingPassage(_) => "internal",
        }
    }
}

impl From<&SearchError> for ErrorEnvelope {
    fn from(err: &SearchError) -> Self {
        let (details, hint) = match err {
            SearchError::Configuration(_) => (
                None,
                Some(
                    "weights must sum to 1.0, top_k must be > 0 and boost_factor >= 1.0"
                        .to_string(),
                ),
            ),
            SearchError::IndexUnavailable(backend) => (
                Some(serde_json::json!({ "backend": backend.as_str() })),
                Some("retry once the index is reachable".to_string()),
            ),
            SearchError::MissingPassage(id) => {
                (Some(serde_json::json!({ "passage_id": id })), None)
            }
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
            hint,
        }
    }
}
