use crate::error::{CorpusError, Result};
use crate::store::InMemoryPassageStore;
use crate::types::Passage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const PASSAGE_CORPUS_SCHEMA_VERSION: u32 = 1;

/// Passages grouped by source document, persisted as one JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct PassageCorpus {
    documents: BTreeMap<String, Vec<Passage>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedPassageCorpus {
    schema_version: u32,
    documents: BTreeMap<String, Vec<Passage>>,
}

impl PassageCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedPassageCorpus = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != PASSAGE_CORPUS_SCHEMA_VERSION {
            return Err(CorpusError::SchemaVersion {
                found: persisted.schema_version,
                expected: PASSAGE_CORPUS_SCHEMA_VERSION,
            });
        }
        let corpus = Self {
            documents: persisted.documents,
        };
        log::info!(
            "Loaded passage corpus from {:?}: {} documents, {} passages",
            path,
            corpus.document_count(),
            corpus.passage_count()
        );
        Ok(corpus)
    }

    /// Write to a temp file and rename over the target so readers never see a torn file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedPassageCorpus {
            schema_version: PASSAGE_CORPUS_SCHEMA_VERSION,
            documents: self.documents.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    pub fn set_document_passages(&mut self, source_document: String, passages: Vec<Passage>) {
        self.documents.insert(source_document, passages);
    }

    pub fn remove_document(&mut self, source_document: &str) -> bool {
        self.documents.remove(source_document).is_some()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn passage_count(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }

    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.documents.values().flatten()
    }

    /// Flatten into a lookup store; fails if two documents share a passage id
    pub fn to_store(&self) -> Result<InMemoryPassageStore> {
        InMemoryPassageStore::from_passages(self.passages().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PassageStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn corpus_roundtrip_and_lookup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("corpus.json");

        let mut corpus = PassageCorpus::new();
        corpus.set_document_passages(
            "cgst-act.pdf".to_string(),
            vec![
                Passage::new("cgst-1", "Section 16: eligibility", "cgst-act.pdf")
                    .page(12)
                    .section_id("16"),
                Passage::new("cgst-2", "Section 17: apportionment", "cgst-act.pdf").page(13),
            ],
        );
        corpus.set_document_passages(
            "rules.pdf".to_string(),
            vec![Passage::new("rules-1", "Rule 36: documentary requirements", "rules.pdf")],
        );
        corpus.save(&path).await.unwrap();

        let loaded = PassageCorpus::load(&path).await.unwrap();
        assert_eq!(loaded.document_count(), 2);
        assert_eq!(loaded.passage_count(), 3);

        let store = loaded.to_store().unwrap();
        let passage = store.get("cgst-1").unwrap();
        assert_eq!(passage.page, Some(12));
        assert_eq!(passage.section_id.as_deref(), Some("16"));
        assert!(store.get("missing").is_none());
    }

    #[tokio::test]
    async fn rejects_unknown_schema_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("corpus.json");
        tokio::fs::write(&path, r#"{"schema_version": 99, "documents": {}}"#)
            .await
            .unwrap();

        let err = PassageCorpus::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            CorpusError::SchemaVersion {
                found: 99,
                expected: PASSAGE_CORPUS_SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn duplicate_ids_across_documents_fail_flattening() {
        let mut corpus = PassageCorpus::new();
        corpus.set_document_passages("a.pdf".to_string(), vec![Passage::new("p", "x", "a.pdf")]);
        corpus.set_document_passages("b.pdf".to_string(), vec![Passage::new("p", "y", "b.pdf")]);
        assert!(corpus.to_store().is_err());
        assert!(corpus.remove_document("b.pdf"));
        assert!(corpus.to_store().is_ok());
    }
}
