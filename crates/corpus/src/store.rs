use crate::error::{CorpusError, Result};
use crate::types::Passage;
use std::collections::HashMap;

/// Read-only passage lookup, implemented by whatever owns the ingested corpus
pub trait PassageStore: Send + Sync {
    fn get(&self, passage_id: &str) -> Option<&Passage>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Passage store backed by a hash map
#[derive(Debug, Clone, Default)]
pub struct InMemoryPassageStore {
    passages: HashMap<String, Passage>,
}

impl InMemoryPassageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store, rejecting duplicate ids
    pub fn from_passages(passages: impl IntoIterator<Item = Passage>) -> Result<Self> {
        let mut store = Self::new();
        for passage in passages {
            store.insert(passage)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, passage: Passage) -> Result<()> {
        if self.passages.contains_key(&passage.id) {
            return Err(CorpusError::DuplicatePassage(passage.id));
        }
        self.passages.insert(passage.id.clone(), passage);
        Ok(())
    }

    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.passages.values()
    }
}

impl PassageStore for InMemoryPassageStore {
    fn get(&self, passage_id: &str) -> Option<&Passage> {
        self.passages.get(passage_id)
    }

    fn len(&self) -> usize {
        self.passages.len()
    }
}
