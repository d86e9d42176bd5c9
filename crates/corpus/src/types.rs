use serde::{Deserialize, Serialize};

/// A retrievable unit of indexed regulatory text with its source metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    /// Corpus-wide unique identifier
    pub id: String,

    /// Passage body
    pub text: String,

    /// Document the passage was cut from (file name, act title, ...)
    pub source_document: String,

    /// Page number within the source document (1-indexed)
    #[serde(default)]
    pub page: Option<u32>,

    /// Section identifier such as "16" or "16(2)(b)"
    #[serde(default)]
    pub section_id: Option<String>,
}

impl Passage {
    /// Create a passage without page or section metadata
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        source_document: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source_document: source_document.into(),
            page: None,
            section_id: None,
        }
    }

    /// Builder: set page
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Builder: set section id
    #[must_use]
    pub fn section_id(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// Case-insensitive substring check against the passage text
    #[must_use]
    pub fn contains_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        self.text.to_lowercase().contains(&term.to_lowercase())
    }
}
