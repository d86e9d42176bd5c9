//! Okapi BM25 over an in-memory inverted index.

use crate::error::{Backend, Result, SearchError};
use crate::tokenizer::tokenize;
use regscope_corpus::Passage;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Term-frequency ranking backend built by the ingestion side
pub trait LexicalBackend: Send + Sync {
    fn doc_count(&self) -> usize;

    /// Up to `n` `(passage_id, score)` pairs, best first
    fn score(&self, tokens: &[String], n: usize) -> Result<Vec<(String, f32)>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f32,
    /// Length normalization strength
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

#[derive(Debug, Clone)]
struct Posting {
    doc: u32,
    term_frequency: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    postings: HashMap<String, Vec<Posting>>,
    doc_ids: Vec<String>,
    doc_lengths: Vec<u32>,
    known_ids: HashSet<String>,
    total_doc_length: u64,
}

impl Bm25Index {
    #[must_use]
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn from_passages<'a>(
        params: Bm25Params,
        passages: impl IntoIterator<Item = &'a Passage>,
    ) -> Self {
        let mut index = Self::new(params);
        for passage in passages {
            index.add_passage(passage);
        }
        log::info!(
            "Built BM25 index: {} passages, {} terms",
            index.doc_ids.len(),
            index.postings.len()
        );
        index
    }

    /// Index a passage. Returns false if its id is already present.
    pub fn add_passage(&mut self, passage: &Passage) -> bool {
        if !self.known_ids.insert(passage.id.clone()) {
            log::warn!("Skipping duplicate passage id in BM25 index: {}", passage.id);
            return false;
        }

        let tokens = tokenize(&passage.text);
        #[allow(clippy::cast_possible_truncation)]
        let doc = self.doc_ids.len() as u32;
        #[allow(clippy::cast_possible_truncation)]
        let doc_len = tokens.len() as u32;

        self.doc_ids.push(passage.id.clone());
        self.doc_lengths.push(doc_len);
        self.total_doc_length += u64::from(doc_len);

        // Vec keeps first-seen term order so posting lists grow deterministically
        let mut term_frequencies: Vec<(String, u32)> = Vec::new();
        let mut slot_by_term: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            if let Some(&slot) = slot_by_term.get(&token) {
                term_frequencies[slot].1 += 1;
            } else {
                slot_by_term.insert(token.clone(), term_frequencies.len());
                term_frequencies.push((token, 1));
            }
        }

        for (term, term_frequency) in term_frequencies {
            self.postings.entry(term).or_default().push(Posting {
                doc,
                term_frequency,
            });
        }
        true
    }

    fn average_doc_length(&self) -> f32 {
        if self.doc_ids.is_empty() {
            return 0.0;
        }
        self.total_doc_length as f32 / self.doc_ids.len() as f32
    }
}

impl LexicalBackend for Bm25Index {
    fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }

    fn score(&self, tokens: &[String], n: usize) -> Result<Vec<(String, f32)>> {
        if self.doc_ids.is_empty() {
            return Err(SearchError::IndexUnavailable(Backend::Lexical));
        }

        let n_docs = self.doc_ids.len() as f32;
        let avgdl = self.average_doc_length().max(f32::EPSILON);
        let Bm25Params { k1, b } = self.params;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut scores: HashMap<u32, f32> = HashMap::new();

        for token in tokens {
            if !seen.insert(token.as_str()) {
                continue;
            }
            let Some(postings) = self.postings.get(token) else {
                continue;
            };

            let df = postings.len() as f32;
            // IDF: ln((N - df + 0.5) / (df + 0.5) + 1), always positive
            let idf = ((n_docs - df + 0.5) / (df + 0.5) + 1.0).ln();

            for posting in postings {
                let dl = self.doc_lengths[posting.doc as usize] as f32;
                let tf = posting.term_frequency as f32;
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / avgdl));
                *scores.entry(posting.doc).or_insert(0.0) += idf * tf_norm;
            }
        }

        let mut ranked: Vec<(String, f32)> = scores
            .into_iter()
            .map(|(doc, score)| (self.doc_ids[doc as usize].clone(), score))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(n);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_corpus() -> Bm25Index {
        let passages = vec![
            Passage::new("p0", "Section 16 eligibility and conditions for input tax credit", "act"),
            Passage::new("p1", "Section 17 apportionment of credit and blocked credits", "act"),
            Passage::new("p2", "Rule 36 documentary requirements for claiming credit", "rules"),
            Passage::new("p3", "General provisions regarding returns", "act"),
        ];
        Bm25Index::from_passages(Bm25Params::default(), &passages)
    }

    fn tokens(query: &str) -> Vec<String> {
        tokenize(query)
    }

    #[test]
    fn test_bm25_empty_index() {
        let idx = Bm25Index::new(Bm25Params::default());
        let err = idx.score(&tokens("credit"), 10).unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(Backend::Lexical)));
    }

    #[test]
    fn test_bm25_finds_matching_docs() {
        let idx = build_corpus();
        let results = idx.score(&tokens("returns"), 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "p3");
    }

    #[test]
    fn test_bm25_rare_term_outranks_common() {
        let idx = build_corpus();
        let results = idx.score(&tokens("16 credit"), 10).unwrap();
        assert_eq!(results[0].0, "p0", "'16' is rare and only in p0");
        assert!(results.iter().all(|(_, score)| *score > 0.0));
    }

    #[test]
    fn test_bm25_ranking_order() {
        let passages = vec![
            Passage::new("a", "credit credit credit", "x"),
            Passage::new("b", "credit ledger", "x"),
        ];
        let idx = Bm25Index::from_passages(Bm25Params::default(), &passages);
        let results = idx.score(&tokens("credit"), 10).unwrap();
        assert_eq!(results[0].0, "a", "doc with higher TF should rank first");
    }

    #[test]
    fn test_bm25_no_match_and_truncation() {
        let idx = build_corpus();
        assert!(idx.score(&tokens("nonexistent"), 10).unwrap().is_empty());
        assert!(idx.score(&tokens("credit"), 2).unwrap().len() <= 2);
        assert!(idx.score(&tokens("credit"), 0).unwrap().is_empty());
    }

    #[test]
    fn repeated_query_tokens_count_once() {
        let idx = build_corpus();
        let once = idx.score(&tokens("returns"), 10).unwrap();
        let twice = idx.score(&tokens("returns returns"), 10).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_passage_is_skipped() {
        let mut idx = Bm25Index::new(Bm25Params::default());
        assert!(idx.add_passage(&Passage::new("a", "credit", "x")));
        assert!(!idx.add_passage(&Passage::new("a", "other text", "x")));
        assert_eq!(idx.doc_count(), 1);
    }
}
